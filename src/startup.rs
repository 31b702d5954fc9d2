use crate::commands::terminal::{
    TerminalChoicePrompter, TerminalSpeech, TerminalTimePicker, TerminalTranscriptSource,
};
use crate::commands::{self, CommandContext};
use crate::components::{scheduling_service::SchedulingService, ComponentManager};
use crate::config::Config;
use crate::error::{component_error, Error};
use crate::shutdown;
use crate::workflow::ResolutionController;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Builder;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Drive `session` on a new multi-threaded runtime.
///
/// A signal can end the session while a terminal prompt is still parked on a
/// blocking thread, so the runtime is released without waiting for it.
pub fn run_until_done<F>(session: F) -> miette::Result<()>
where
    F: Future<Output = miette::Result<()>>,
{
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::from)?;

    let result = runtime.block_on(session);
    runtime.shutdown_background();
    result
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Start the components and run the terminal assistant
pub async fn start_assistant(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (tz, speak_feedback) = {
        let config_read = config.read().await;
        crate::utils::i18n::set_locale(&config_read.locale);
        info!("Setting locale to {}", config_read.locale);
        (config_read.tz()?, config_read.speak_feedback)
    };

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register scheduling backend component
    component_manager.register(SchedulingService::new());

    component_manager.init_all().await?;

    let service = component_manager
        .scheduling_handle()
        .await
        .ok_or_else(|| component_error("Scheduling service did not start"))?;

    // Create a shared component manager
    let component_manager = Arc::new(component_manager);

    let controller = ResolutionController::with_service(
        Arc::new(service),
        Arc::new(TerminalTimePicker::new(tz)),
        Arc::new(TerminalChoicePrompter),
        Arc::new(TerminalSpeech::new(speak_feedback)),
    );

    let command_context = CommandContext::new(
        Arc::clone(&config),
        controller,
        Arc::new(TerminalTranscriptSource),
        Arc::new(TerminalTimePicker::new(tz)),
    );

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    // Wait for either the menu to end or a shutdown signal
    tokio::select! {
        result = commands::run(&command_context) => {
            info!("Assistant closed");
            if let Err(e) = component_manager.shutdown_all().await {
                error!("Error shutting down components: {:?}", e);
            }
            result.map_err(Into::into)
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, shutting down assistant...");
            Ok(())
        }
    }
}

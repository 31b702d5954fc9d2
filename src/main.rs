use tracing::info;
use voicecal::startup;

fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting voicecal");

    // Run the assistant until the user quits or a signal arrives
    startup::run_until_done(session())
}

async fn session() -> miette::Result<()> {
    // Load configuration
    let config = startup::load_config().await?;

    startup::start_assistant(config).await
}

use async_trait::async_trait;
use std::any::Any;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use voicecal::components::scheduling_service::SchedulingService;
use voicecal::components::{Component, ComponentManager};
use voicecal::config::Config;
use voicecal::error::{component_error, AppResult};

fn test_config() -> Arc<RwLock<Config>> {
    Arc::new(RwLock::new(Config {
        backend_url: "http://127.0.0.1:9/api".to_string(),
        timezone: "Europe/Helsinki".to_string(),
        locale: "en".to_string(),
        request_timeout_secs: None,
        speak_feedback: false,
    }))
}

/// Component that writes its lifecycle into a shared journal
struct JournalComponent {
    name: &'static str,
    fail_init: bool,
    journal: Arc<Mutex<Vec<String>>>,
}

impl JournalComponent {
    fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            fail_init: false,
            journal: Arc::clone(journal),
        }
    }

    fn failing(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

#[async_trait]
impl Component for JournalComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn init(&self, _config: Arc<RwLock<Config>>) -> AppResult<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("init {}", self.name));
        if self.fail_init {
            return Err(component_error("refusing to start"));
        }
        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("shutdown {}", self.name));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Smoke test to verify a config literal is usable
#[test]
fn test_config_accessors() {
    let config = Config {
        backend_url: "http://localhost:8000".to_string(),
        timezone: "Europe/Helsinki".to_string(),
        locale: "en".to_string(),
        request_timeout_secs: Some(15),
        speak_feedback: true,
    };

    assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Helsinki);
    assert_eq!(
        config.backend_base().unwrap().as_str(),
        "http://localhost:8000/"
    );
    assert_eq!(
        config.request_timeout(),
        Some(std::time::Duration::from_secs(15))
    );
    assert!(config.validate().is_ok());
}

/// Components start and stop in registration order, even when one fails
#[tokio::test]
async fn test_component_lifecycle_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut manager = ComponentManager::new(test_config());
    manager.register(JournalComponent::new("first", &journal));
    manager.register(JournalComponent::new("second", &journal).failing());
    manager.register(JournalComponent::new("third", &journal));

    assert!(manager.init_all().await.is_ok());
    assert!(manager.shutdown_all().await.is_ok());

    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "init first",
            "init second",
            "init third",
            "shutdown first",
            "shutdown second",
            "shutdown third",
        ]
    );
}

/// Lookup by name and concrete type
#[tokio::test]
async fn test_component_lookup() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut manager = ComponentManager::new(test_config());
    manager.register(JournalComponent::new("journal", &journal));

    assert!(manager.get_component_by_name("journal").is_some());
    assert!(manager.get_component_by_name("missing").is_none());
    assert!(manager.get::<JournalComponent>("journal").is_some());
    assert!(manager.get::<SchedulingService>("journal").is_none());
}

/// The scheduling handle exists only after initialization
#[tokio::test]
async fn test_scheduling_handle_after_init() {
    let mut manager = ComponentManager::new(test_config());
    manager.register(SchedulingService::new());

    assert!(manager.scheduling_handle().await.is_none());

    manager.init_all().await.unwrap();
    let handle = manager.scheduling_handle().await;
    assert!(handle.is_some());

    assert!(manager.shutdown_all().await.is_ok());
}

/// Without a registered scheduling service there is no handle to give out
#[tokio::test]
async fn test_scheduling_handle_missing() {
    let manager = ComponentManager::new(test_config());
    manager.init_all().await.unwrap();
    assert!(manager.scheduling_handle().await.is_none());
}

use log::{info, warn};

/// Subsystem-tagged logger so dashboard events stay greppable.
#[derive(Debug)]
pub struct EventLog {
    component: &'static str,
}

impl EventLog {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn record_failure(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}

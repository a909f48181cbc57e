use std::sync::Arc;

use crate::config::{Config, RelayPolicy};
use crate::mail::Dispatcher;
use crate::relay::RelayKind;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Pluggable mail transport. SMTP, hosted API, or the unconfigured stand-in.
    pub dispatcher: Arc<dyn Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }

    pub fn policy(&self, kind: RelayKind) -> &RelayPolicy {
        match kind {
            RelayKind::Callback => &self.config.callback,
            RelayKind::Talent => &self.config.talent,
        }
    }
}

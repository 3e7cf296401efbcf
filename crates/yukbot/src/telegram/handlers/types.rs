//! Handler types and dependencies

use std::sync::Arc;

use tokio::sync::Mutex;
use yukcore::{Engine, InboundEvent};

use crate::telegram::transport::TeloxideTransport;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: Arc<Mutex<Engine>>,
    pub transport: Arc<TeloxideTransport>,
}

impl HandlerDeps {
    pub fn new(engine: Engine, transport: TeloxideTransport) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            transport: Arc::new(transport),
        }
    }

    /// Runs one event through the engine
    ///
    /// The engine lock is held for the whole event, broadcasts included, so
    /// updates are applied one at a time.
    pub async fn process(&self, event: InboundEvent) {
        let user = event.user;
        let mut engine = self.engine.lock().await;
        let report = engine.process(event, self.transport.as_ref()).await;
        if report.failed > 0 {
            log::warn!(
                "Event from user {}: {} message(s) delivered, {} failed",
                user,
                report.delivered,
                report.failed
            );
        } else {
            log::debug!("Event from user {}: {} message(s) delivered", user, report.delivered);
        }
    }
}

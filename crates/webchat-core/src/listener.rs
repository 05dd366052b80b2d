//! Lifecycle listeners for the host page.
//!
//! Hosts register any number of `ChatListener`s. Each hook is best-effort:
//! a handler that returns an error or panics is logged and skipped, and the
//! conversation carries on.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::TransportError;

/// Optional hooks into the conversation lifecycle. Every method defaults to
/// a no-op, so implementors only override what they need.
pub trait ChatListener: Send + Sync {
    /// Called before the request is dispatched.
    fn on_message_send(&self, _text: &str, _action: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called with the parsed response body after a successful exchange.
    fn on_message_receive(&self, _response: &Value) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per failed exchange.
    fn on_error(&self, _error: &TransportError) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Listeners {
    handlers: Vec<Arc<dyn ChatListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn ChatListener>) {
        self.handlers.push(listener);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn message_sent(&self, text: &str, action: &str) {
        self.dispatch("on_message_send", |l| l.on_message_send(text, action));
    }

    pub fn message_received(&self, response: &Value) {
        self.dispatch("on_message_receive", |l| l.on_message_receive(response));
    }

    pub fn error(&self, error: &TransportError) {
        self.dispatch("on_error", |l| l.on_error(error));
    }

    fn dispatch<F>(&self, hook: &'static str, call: F)
    where
        F: Fn(&dyn ChatListener) -> anyhow::Result<()>,
    {
        for handler in &self.handlers {
            match catch_unwind(AssertUnwindSafe(|| call(handler.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(hook, error = %e, "Listener failed"),
                Err(_) => warn!(hook, "Listener panicked"),
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

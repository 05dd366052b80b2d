//! Conversation flow.
//!
//! `Conversation` drives one turn at a time through the store, the
//! transport, the renderer and the view, and owns the phase state machine.
//!
//! Per turn the order is fixed: the user message is persisted and drawn,
//! then the transport is called, then the reply (or fallback text) is
//! persisted and drawn. A second turn submitted while one is in flight is
//! dropped, not queued. Clearing and expiry take the same slot, so they
//! never run inside a turn.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use webchat_core::error::TransportError;
use webchat_core::listener::Listeners;
use webchat_core::render::render;
use webchat_core::session::{
    ConversationPhase, ConversationState, ConversationStore, Sender, SessionId,
};
use webchat_core::transport::{
    CONFIG_ERROR_MESSAGE, CONNECTION_FALLBACK_MESSAGE, ChatTransport, DEFAULT_ACTION,
};
use webchat_core::view::ViewSink;

/// Result of restoring persisted state into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing stored; welcome screen shown.
    Fresh,
    /// The stored conversation had expired and was discarded.
    Expired,
    /// This many stored messages were replayed.
    Restored(usize),
}

/// How a turn ended, as seen by the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing to send after trimming.
    Empty,
    /// Another turn is in flight; this one was dropped.
    Busy,
    /// The backend answered; the reply text that was shown.
    Replied(String),
    /// No webhook configured; the configuration notice was shown.
    NotConfigured,
    /// The exchange failed; the connection fallback was shown.
    Failed(TransportError),
}

impl TurnOutcome {
    /// Whether the turn reached the point of showing a bot message.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Empty | Self::Busy)
    }
}

pub struct Conversation {
    store: ConversationStore,
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ViewSink>,
    listeners: Listeners,
    /// Extra payload entries sent with every turn.
    metadata: Map<String, Value>,
    state: Mutex<ConversationState>,
}

impl Conversation {
    pub fn new(
        store: ConversationStore,
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ViewSink>,
        listeners: Listeners,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            store,
            transport,
            view,
            listeners,
            metadata,
            state: Mutex::new(ConversationState::new()),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub async fn phase(&self) -> ConversationPhase {
        self.state.lock().await.phase()
    }

    pub async fn is_sending(&self) -> bool {
        self.state.lock().await.is_sending()
    }

    /// Restores persisted state into the view.
    ///
    /// An expired conversation is discarded and the welcome screen shown.
    /// Otherwise stored messages are replayed without being persisted again.
    pub async fn restore(&self) -> Result<RestoreOutcome> {
        if self.store.expire_if_needed().await? {
            self.show_idle().await;
            return Ok(RestoreOutcome::Expired);
        }

        let messages = self.store.load_messages().await?;
        if messages.is_empty() {
            self.show_idle().await;
            return Ok(RestoreOutcome::Fresh);
        }

        self.view.clear_messages();
        for message in &messages {
            self.view.append_message(message.sender, &render(&message.text));
        }
        self.state.lock().await.activate();
        self.view.show_conversation();
        self.view.scroll_to_latest();

        debug!(count = messages.len(), "Restored conversation");
        Ok(RestoreOutcome::Restored(messages.len()))
    }

    /// Resets the view to the welcome screen if the stored conversation
    /// expired since it was last checked. Skipped while a turn is in flight.
    pub async fn check_expiry(&self) -> Result<bool> {
        if !self.claim().await {
            return Ok(false);
        }
        let result = self.expire_and_show_idle().await;
        self.release().await;
        result
    }

    async fn expire_and_show_idle(&self) -> Result<bool> {
        if !self.store.expire_if_needed().await? {
            return Ok(false);
        }
        self.show_idle().await;
        Ok(true)
    }

    /// Sends one turn: `text` as the visitor's message, tagged with `action`
    /// (the default token when empty).
    ///
    /// Whatever happens, the input is enabled again before this returns.
    /// Only storage failures are returned as errors; transport failures are
    /// turned into fallback text.
    pub async fn submit_turn(&self, text: &str, action: &str) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Empty);
        }
        let action = if action.trim().is_empty() {
            DEFAULT_ACTION
        } else {
            action
        };

        {
            let mut state = self.state.lock().await;
            if !state.begin_send() {
                debug!(action, "Turn dropped, another one is in flight");
                return Ok(TurnOutcome::Busy);
            }
            if state.activate() {
                self.view.show_conversation();
            }
        }
        self.view.set_input_enabled(false);

        let result = self.run_turn(text, action).await;
        if let Err(e) = &result {
            self.view.hide_typing();
            error!(error = %e, "Conversation turn failed");
        }

        self.release().await;
        self.view.set_input_enabled(true);
        self.view.focus_input();
        result
    }

    async fn run_turn(&self, text: &str, action: &str) -> Result<TurnOutcome> {
        if self.store.expire_if_needed().await? {
            self.view.clear_messages();
        }
        let session = self.store.get_or_create_session_id().await?;

        self.store.record_message(text, Sender::User, None).await?;
        self.view.append_message(Sender::User, &render(text));
        self.view.clear_input();
        self.view.scroll_to_latest();

        self.listeners.message_sent(text, action);
        self.view.show_typing();

        let outcome = self.exchange(text, action, &session).await;
        self.view.hide_typing();

        let reply = match &outcome {
            TurnOutcome::Replied(reply) => reply.as_str(),
            TurnOutcome::NotConfigured => CONFIG_ERROR_MESSAGE,
            _ => CONNECTION_FALLBACK_MESSAGE,
        };
        self.store.record_message(reply, Sender::Bot, None).await?;
        self.view.append_message(Sender::Bot, &render(reply));
        self.view.scroll_to_latest();

        Ok(outcome)
    }

    async fn exchange(&self, text: &str, action: &str, session: &SessionId) -> TurnOutcome {
        match self
            .transport
            .send(text, action, session, &self.metadata)
            .await
        {
            Ok(reply) => {
                self.listeners.message_received(&reply.raw);
                TurnOutcome::Replied(reply.text)
            }
            Err(TransportError::NotConfigured) => {
                warn!("Chat webhook URL is not configured");
                TurnOutcome::NotConfigured
            }
            Err(e) => {
                warn!(session_id = %session, error = %e, "Webhook exchange failed");
                self.listeners.error(&e);
                TurnOutcome::Failed(e)
            }
        }
    }

    /// Discards the conversation and starts a new session.
    ///
    /// Returns `None` without touching anything while a turn is in flight.
    /// A turn submitted while the reset runs is dropped as busy.
    pub async fn reset(&self) -> Result<Option<SessionId>> {
        if !self.claim().await {
            debug!("Clear ignored, a turn is in flight");
            return Ok(None);
        }

        let result = self.store.reset().await;
        if let Ok(id) = &result {
            self.show_idle().await;
            info!(session_id = %id, "Conversation reset");
        }
        self.release().await;
        Ok(Some(result?))
    }

    /// Takes the single slot shared by turns, resets and expiry checks.
    async fn claim(&self) -> bool {
        self.state.lock().await.begin_send()
    }

    async fn release(&self) {
        self.state.lock().await.finish_send();
    }

    async fn show_idle(&self) {
        self.state.lock().await.reset();
        self.view.clear_messages();
        self.view.show_welcome();
    }
}

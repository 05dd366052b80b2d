//! Widget controller: maps host UI events onto the conversation.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};
use webchat_core::capability::{Clock, OsRandom, RandomSource, SystemClock};
use webchat_core::config::WidgetConfig;
use webchat_core::listener::{ChatListener, Listeners};
use webchat_core::session::{ConversationPhase, ConversationStore, KeyValueStore, SessionId};
use webchat_core::transport::{CLEAR_CONFIRMATION_MESSAGE, ChatTransport, DEFAULT_ACTION};
use webchat_core::view::ViewSink;
use webchat_infrastructure::open_store;
use webchat_interaction::WebhookTransport;

use crate::conversation::{Conversation, RestoreOutcome, TurnOutcome};

/// A key as reported by the host's keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Key {
    Enter,
    #[default]
    Other,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Enter with no modifier held.
    pub fn is_commit(&self) -> bool {
        self.key == Key::Enter && !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// The widget instance a host page constructs once.
///
/// `WidgetController` is responsible for:
/// - Restoring the conversation when mounted
/// - Opening and closing the panel
/// - Turning button clicks and typed input into conversation turns
/// - The confirmed clear flow
pub struct WidgetController {
    config: WidgetConfig,
    display_config: WidgetConfig,
    conversation: Conversation,
    view: Arc<dyn ViewSink>,
    mounted: AtomicBool,
    open: AtomicBool,
}

impl WidgetController {
    pub fn builder(config: WidgetConfig) -> WidgetBuilder {
        WidgetBuilder::new(config)
    }

    /// Configuration driving behavior (validated endpoint, raw texts).
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Escaped and validated configuration for drawing the widget chrome.
    pub fn display_config(&self) -> &WidgetConfig {
        &self.display_config
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn phase(&self) -> ConversationPhase {
        self.conversation.phase().await
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Restores persisted state into the view. Only the first call does
    /// anything; later calls return `None`.
    pub async fn mount(&self) -> Result<Option<RestoreOutcome>> {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("Widget already mounted");
            return Ok(None);
        }

        self.view.set_panel_open(false);
        let outcome = self.conversation.restore().await?;
        info!(?outcome, "Widget mounted");
        Ok(Some(outcome))
    }

    pub async fn open(&self) -> Result<()> {
        self.open.store(true, Ordering::SeqCst);
        self.view.set_panel_open(true);
        self.conversation.check_expiry().await?;
        self.view.focus_input();
        self.view.scroll_to_latest();
        Ok(())
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.view.set_panel_open(false);
    }

    pub async fn toggle(&self) -> Result<()> {
        if self.is_open() {
            self.close();
            Ok(())
        } else {
            self.open().await
        }
    }

    /// Asks for confirmation, then discards the conversation and starts a
    /// new session. Returns the new id, or `None` if declined or busy.
    pub async fn clear(&self) -> Result<Option<SessionId>> {
        if self.conversation.is_sending().await {
            return Ok(None);
        }
        if !self.view.confirm(CLEAR_CONFIRMATION_MESSAGE) {
            debug!("Clear declined");
            return Ok(None);
        }
        self.conversation.reset().await
    }

    /// Starts (or continues) the conversation from a welcome button.
    pub async fn click_action(&self, label: &str, action: &str) -> Result<TurnOutcome> {
        debug!(action, "Action button clicked");
        self.conversation.submit_turn(label, action).await
    }

    /// Sends typed input with the default action token.
    pub async fn submit(&self, input: &str) -> Result<TurnOutcome> {
        self.conversation.submit_turn(input, DEFAULT_ACTION).await
    }

    /// Handles a keydown in the input. Only a commit gesture submits.
    pub async fn key_down(&self, key: KeyPress, input: &str) -> Result<Option<TurnOutcome>> {
        if !key.is_commit() {
            return Ok(None);
        }
        self.submit(input).await.map(Some)
    }
}

/// Builder for [`WidgetController`].
///
/// Only the view is required. Defaults: the store selected by the storage
/// scope, the webhook transport from the config, the system clock and the
/// OS random source.
pub struct WidgetBuilder {
    config: WidgetConfig,
    view: Option<Arc<dyn ViewSink>>,
    store: Option<Arc<dyn KeyValueStore>>,
    transport: Option<Arc<dyn ChatTransport>>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    listeners: Listeners,
    data_dir: Option<PathBuf>,
}

impl WidgetBuilder {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            view: None,
            store: None,
            transport: None,
            clock: Arc::new(SystemClock),
            random: Arc::new(OsRandom),
            listeners: Listeners::new(),
            data_dir: None,
        }
    }

    pub fn view(mut self, view: Arc<dyn ViewSink>) -> Self {
        self.view = Some(view);
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn ChatListener>) -> Self {
        self.listeners.register(listener);
        self
    }

    /// Directory for the persistent store when no store is given.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<WidgetController> {
        let view = self
            .view
            .ok_or_else(|| anyhow!("A view sink is required to build the widget"))?;

        let display_config = self.config.sanitized();
        let config = WidgetConfig {
            webhook_url: display_config.webhook_url.clone(),
            ..self.config
        };

        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => open_store(config.storage_scope(), self.data_dir.as_deref())
                .context("Failed to open conversation store")?,
        };
        let transport: Arc<dyn ChatTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(WebhookTransport::from_config(&config)),
        };

        let conversation_store = ConversationStore::new(
            store,
            self.clock,
            self.random,
            config.conversation_timeout_minutes,
        );
        let conversation = Conversation::new(
            conversation_store,
            transport,
            view.clone(),
            self.listeners,
            config.outbound_metadata(),
        );

        Ok(WidgetController {
            config,
            display_config,
            conversation,
            view,
            mounted: AtomicBool::new(false),
            open: AtomicBool::new(false),
        })
    }
}

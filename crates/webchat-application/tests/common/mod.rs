#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use webchat_application::WidgetController;
use webchat_core::capability::{ManualClock, OsRandom};
use webchat_core::config::WidgetConfig;
use webchat_core::error::TransportError;
use webchat_core::listener::ChatListener;
use webchat_core::render::SafeMarkup;
use webchat_core::session::{KeyValueStore, MESSAGES_KEY, Sender, SessionId};
use webchat_core::transport::{BotReply, ChatTransport};
use webchat_core::view::ViewSink;
use webchat_infrastructure::MemoryKeyValueStore;

pub const START: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Welcome,
    Conversation,
    Message(Sender, String),
    ClearMessages,
    TypingOn,
    TypingOff,
    InputEnabled(bool),
    ClearInput,
    FocusInput,
    PanelOpen(bool),
    Scroll,
    Confirm(String),
}

/// Records every view call in order.
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        }
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Messages currently on screen, replaying appends and clears.
    pub fn visible_messages(&self) -> Vec<(Sender, String)> {
        let mut visible = Vec::new();
        for event in self.events() {
            match event {
                ViewEvent::Message(sender, markup) => visible.push((sender, markup)),
                ViewEvent::ClearMessages => visible.clear(),
                _ => {}
            }
        }
        visible
    }

    /// Whether the last phase switch showed the welcome screen.
    pub fn welcome_visible(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|event| match event {
                ViewEvent::Welcome => Some(true),
                ViewEvent::Conversation => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn input_enabled(&self) -> Option<bool> {
        self.events().iter().rev().find_map(|event| match event {
            ViewEvent::InputEnabled(enabled) => Some(*enabled),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ViewSink for RecordingView {
    fn show_welcome(&self) {
        self.push(ViewEvent::Welcome);
    }

    fn show_conversation(&self) {
        self.push(ViewEvent::Conversation);
    }

    fn append_message(&self, sender: Sender, markup: &SafeMarkup) {
        self.push(ViewEvent::Message(sender, markup.as_str().to_string()));
    }

    fn clear_messages(&self) {
        self.push(ViewEvent::ClearMessages);
    }

    fn show_typing(&self) {
        self.push(ViewEvent::TypingOn);
    }

    fn hide_typing(&self) {
        self.push(ViewEvent::TypingOff);
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.push(ViewEvent::InputEnabled(enabled));
    }

    fn clear_input(&self) {
        self.push(ViewEvent::ClearInput);
    }

    fn focus_input(&self) {
        self.push(ViewEvent::FocusInput);
    }

    fn set_panel_open(&self, open: bool) {
        self.push(ViewEvent::PanelOpen(open));
    }

    fn scroll_to_latest(&self) {
        self.push(ViewEvent::Scroll);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentTurn {
    pub message: String,
    pub action: String,
    pub session: SessionId,
    /// Number of stored messages at the moment the request went out.
    pub stored_before_send: usize,
}

/// Transport answering from a queue of scripted results.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, TransportError>>>,
    sent: Mutex<Vec<SentTurn>>,
    store: Arc<dyn KeyValueStore>,
}

impl ScriptedTransport {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            store,
        }
    }

    pub fn reply(&self, body: Value) {
        self.replies.lock().unwrap().push_back(Ok(body));
    }

    pub fn fail(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<SentTurn> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        message: &str,
        action: &str,
        session: &SessionId,
        _metadata: &Map<String, Value>,
    ) -> Result<BotReply, TransportError> {
        let stored: Vec<Value> = match self.store.get_item(MESSAGES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            _ => Vec::new(),
        };
        self.sent.lock().unwrap().push(SentTurn {
            message: message.to_string(),
            action: action.to_string(),
            session: session.clone(),
            stored_before_send: stored.len(),
        });

        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"output": "ok"})));
        next.map(|raw| {
            let text = webchat_interaction::extract_reply(&raw)
                .unwrap_or_else(|| webchat_core::transport::REPLY_FALLBACK_MESSAGE.to_string());
            BotReply::new(text, raw)
        })
    }
}

/// Listener counting hook invocations.
#[derive(Default)]
pub struct CountingListener {
    pub sent: Mutex<Vec<(String, String)>>,
    pub received: Mutex<Vec<Value>>,
    pub errors: Mutex<Vec<TransportError>>,
}

impl ChatListener for CountingListener {
    fn on_message_send(&self, text: &str, action: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), action.to_string()));
        Ok(())
    }

    fn on_message_receive(&self, response: &Value) -> anyhow::Result<()> {
        self.received.lock().unwrap().push(response.clone());
        Ok(())
    }

    fn on_error(&self, error: &TransportError) -> anyhow::Result<()> {
        self.errors.lock().unwrap().push(error.clone());
        Ok(())
    }
}

pub struct Harness {
    pub widget: WidgetController,
    pub view: Arc<RecordingView>,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryKeyValueStore>,
    pub clock: Arc<ManualClock>,
    pub listener: Arc<CountingListener>,
}

pub fn harness(config: WidgetConfig) -> Harness {
    harness_with_store(config, Arc::new(MemoryKeyValueStore::new()), Arc::new(ManualClock::new(START)))
}

pub fn harness_with_store(
    config: WidgetConfig,
    store: Arc<MemoryKeyValueStore>,
    clock: Arc<ManualClock>,
) -> Harness {
    let view = Arc::new(RecordingView::new());
    let transport = Arc::new(ScriptedTransport::new(store.clone()));
    let listener = Arc::new(CountingListener::default());

    let widget = WidgetController::builder(config)
        .view(view.clone())
        .store(store.clone())
        .transport(transport.clone())
        .clock(clock.clone())
        .random(Arc::new(OsRandom))
        .listener(listener.clone())
        .build()
        .unwrap();

    Harness {
        widget,
        view,
        transport,
        store,
        clock,
        listener,
    }
}

pub fn configured() -> WidgetConfig {
    WidgetConfig {
        webhook_url: Some("https://hooks.example.com/chat".to_string()),
        ..WidgetConfig::default()
    }
}

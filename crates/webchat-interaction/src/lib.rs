//! Network side of the widget: the HTTP webhook transport.

pub mod webhook;

pub use webhook::{REPLY_KEYS, WebhookTransport, extract_reply};

//! Application layer for the chat widget.
//!
//! This crate wires the domain (`webchat-core`) to its infrastructure
//! (stores, config) and interaction (webhook) layers, and exposes the widget
//! instance a host drives.

pub mod conversation;
pub mod controller;

pub use conversation::{Conversation, RestoreOutcome, TurnOutcome};
pub use controller::{Key, KeyPress, WidgetBuilder, WidgetController};

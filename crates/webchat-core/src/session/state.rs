//! Conversation state machine.
//!
//! ```text
//! Idle ──first send──▶ Active
//!   ▲                    │
//!   └── clear / expiry ──┘
//! ```
//!
//! `sending` is orthogonal to the phase. It marks the single in-flight
//! slot, held by a webhook round trip or by a clear or expiry check.

use serde::{Deserialize, Serialize};

/// Visible phase of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Welcome screen with action buttons.
    #[default]
    Idle,
    /// Message list with the input bar.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversationState {
    phase: ConversationPhase,
    sending: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ConversationPhase::Active
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Moves Idle to Active. Returns `true` if the phase changed.
    pub fn activate(&mut self) -> bool {
        let changed = self.phase == ConversationPhase::Idle;
        self.phase = ConversationPhase::Active;
        changed
    }

    /// Back to the welcome screen. Does not touch an in-flight send.
    pub fn reset(&mut self) {
        self.phase = ConversationPhase::Idle;
    }

    /// Claims the in-flight slot. Returns `false` if it is already held,
    /// in which case the caller must drop the request.
    pub fn begin_send(&mut self) -> bool {
        if self.sending {
            return false;
        }
        self.sending = true;
        true
    }

    pub fn finish_send(&mut self) {
        self.sending = false;
    }
}

//! DOM-mutation sink.
//!
//! Every observable side effect of the widget goes through `ViewSink`, so a
//! host (browser bridge, terminal, test recorder) decides how to draw it.

use crate::render::SafeMarkup;
use crate::session::Sender;

/// Receives the widget's UI mutations.
///
/// Calls arrive on the widget's single event loop and in the order they must
/// be applied. Implementations should not block.
pub trait ViewSink: Send + Sync {
    /// Shows the welcome screen with the action buttons, hiding the message
    /// list and input bar.
    fn show_welcome(&self);

    /// Shows the message list and input bar, hiding the welcome screen.
    fn show_conversation(&self);

    /// Appends one rendered message to the list.
    fn append_message(&self, sender: Sender, markup: &SafeMarkup);

    fn clear_messages(&self);

    fn show_typing(&self);

    fn hide_typing(&self);

    /// Enables or disables the text input and the send control together.
    fn set_input_enabled(&self, enabled: bool);

    fn clear_input(&self);

    fn focus_input(&self);

    fn set_panel_open(&self, open: bool);

    fn scroll_to_latest(&self);

    /// Asks the visitor to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
}

//! Result of user interactions routed through the table.

/// Result of handling an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Nothing to do: unknown target, boundary reached, or feature disabled.
    Ignored,
    /// State changed or a change was forwarded to its owner.
    Consumed,
}

impl EventResult {
    /// Check if the interaction was handled.
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Consumed)
    }
}

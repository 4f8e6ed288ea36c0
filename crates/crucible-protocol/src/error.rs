//! Error type for the protocol layer.

/// Errors raised while translating or enumerating protocol events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A raw transition label cannot be expressed as a domain event.
    #[error("transition label '{name}' cannot be translated: {reason}")]
    Untranslatable {
        /// The channel name of the offending label.
        name: String,
        /// Why the label has no domain reading.
        reason: String,
    },

    /// The underlying transition source failed to enumerate successors.
    #[error("transition source error: {reason}")]
    Source {
        /// Description of the failure, as reported by the source.
        reason: String,
    },
}

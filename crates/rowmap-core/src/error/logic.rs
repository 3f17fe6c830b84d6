use super::Error;

/// Error when the caller drives the unit of work in an order it cannot
/// honor, e.g. flushing an update for an entity that was never captured or
/// persisting a relation whose target has no id yet.
#[derive(Debug)]
pub(super) struct LogicError {
    message: Box<str>,
}

impl std::error::Error for LogicError {}

impl core::fmt::Display for LogicError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "logic error: {}", self.message)
    }
}

impl Error {
    /// Creates a logic error.
    pub fn logic(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Logic(LogicError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a logic error.
    pub fn is_logic(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Logic(_)))
    }
}

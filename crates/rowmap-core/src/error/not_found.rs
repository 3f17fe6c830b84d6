use super::Error;

/// Error when a lazy relation resolves to zero rows.
#[derive(Debug)]
pub(super) struct NotFoundError {
    context: Option<Box<str>>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("record not found")?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a record-not-found error.
    pub fn not_found(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NotFound(NotFoundError {
            context: Some(context.into().into()),
        }))
    }

    /// Returns `true` if this error is a record-not-found error.
    pub fn is_not_found(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::NotFound(_)))
    }
}

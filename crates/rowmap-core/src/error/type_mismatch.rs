use super::Error;

/// Error when one persister call receives entities of different concrete
/// types.
#[derive(Debug)]
pub(super) struct TypeMismatchError {
    expected: &'static str,
    found: &'static str,
}

impl std::error::Error for TypeMismatchError {}

impl core::fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "entity type mismatch: expected `{}`, found `{}`",
            self.expected, self.found
        )
    }
}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Error {
        Error::from(super::ErrorKind::TypeMismatch(TypeMismatchError {
            expected,
            found,
        }))
    }

    /// Returns `true` if this error is a type mismatch error.
    pub fn is_type_mismatch(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::TypeMismatch(_)))
    }
}

use thiserror::Error;

use crate::models::{BackendVariant, Operation};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    InvalidInput,
    Unauthenticated,
    Transport,
    Backend,
    ParseFailure,
    Cancelled,
    Timeout,
    Internal,
}

/// Error shared by every core seam.
///
/// `message` is the human-readable text shown to the user verbatim; the
/// remaining fields only exist for logs and tests.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub backend: Option<BackendVariant>,
    pub operation: Option<Operation>,
    pub kind: CoreErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            backend: None,
            operation: None,
            kind,
            message: message.into(),
        }
    }

    pub fn backend(mut self, backend: BackendVariant) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Fills in attribution the error does not already carry.
    pub fn attribute(self, backend: Option<BackendVariant>, operation: Operation) -> Self {
        Self {
            backend: self.backend.or(backend),
            operation: self.operation.or(Some(operation)),
            kind: self.kind,
            message: self.message,
        }
    }
}

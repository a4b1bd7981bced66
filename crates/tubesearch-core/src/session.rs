use std::sync::{Mutex, MutexGuard};

use crate::models::{CoreError, CoreErrorKind, Session};

/// Holder for the current session, shared by the view and the runtime.
#[derive(Default)]
pub struct SessionContext {
    current: Mutex<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: Mutex::new(Some(session)),
        }
    }

    pub fn get(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.lock()?.clone())
    }

    pub fn set(&self, session: Session) -> Result<(), CoreError> {
        *self.lock()? = Some(session);
        Ok(())
    }

    /// Removes and returns the current session, if any.
    pub fn clear(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.lock()?.take())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Session>>, CoreError> {
        self.current.lock().map_err(|_| CoreError {
            backend: None,
            operation: None,
            kind: CoreErrorKind::Internal,
            message: "session context mutex poisoned".to_string(),
        })
    }
}

use std::time::SystemTime;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionUser {
    pub name: String,
    pub image: Option<String>,
}

/// Authenticated user context, created when the identity provider confirms login.
#[derive(Clone, Eq, PartialEq)]
pub struct Session {
    pub provider: String,
    pub user: SessionUser,
    pub access_token: Option<String>,
    pub established_at: SystemTime,
}

impl Session {
    pub fn new(provider: impl Into<String>, user: SessionUser, access_token: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            user,
            access_token,
            established_at: SystemTime::now(),
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .field("user", &self.user)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("established_at", &self.established_at)
            .finish()
    }
}

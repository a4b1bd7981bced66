use crate::adapters::AdapterResult;
use crate::identity::{IdentityProvider, SignInPrompt};
use crate::models::{Session, SessionUser};
use crate::orchestration::CancellationToken;

pub const STATIC_PROVIDER_ID: &str = "static";

/// Identity fixed by configuration, for backends that accept any or no token.
pub struct StaticIdentity {
    user: SessionUser,
    access_token: Option<String>,
}

impl StaticIdentity {
    pub fn new(
        user_name: impl Into<String>,
        image: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            user: SessionUser {
                name: user_name.into(),
                image,
            },
            access_token,
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn provider_id(&self) -> &str {
        STATIC_PROVIDER_ID
    }

    fn begin_sign_in(&self) -> AdapterResult<SignInPrompt> {
        Ok(SignInPrompt::Ready)
    }

    fn complete_sign_in(
        &self,
        _prompt: &SignInPrompt,
        _cancel: &CancellationToken,
    ) -> AdapterResult<Session> {
        Ok(Session::new(
            STATIC_PROVIDER_ID,
            self.user.clone(),
            self.access_token.clone(),
        ))
    }

    fn sign_out(&self, _session: &Session) -> AdapterResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_yields_configured_session() {
        let identity = StaticIdentity::new("Ada", None, Some("dev-token".to_string()));
        let prompt = identity.begin_sign_in().unwrap();
        assert_eq!(prompt, SignInPrompt::Ready);

        let session = identity
            .complete_sign_in(&prompt, &CancellationToken::new())
            .unwrap();
        assert_eq!(session.provider, "static");
        assert_eq!(session.user.name, "Ada");
        assert_eq!(session.bearer_token(), Some("dev-token"));
    }
}

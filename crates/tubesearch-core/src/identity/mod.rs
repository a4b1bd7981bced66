pub mod google;
pub mod static_identity;

pub use google::{GOOGLE_PROVIDER_ID, GoogleDeviceIdentity, GoogleEndpoints};
pub use static_identity::{STATIC_PROVIDER_ID, StaticIdentity};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adapters::AdapterResult;
use crate::config::IdentityConfig;
use crate::models::Session;
use crate::orchestration::CancellationToken;
use crate::transport::HttpTransport;

/// What the user has to do on the provider's site before sign-in can finish.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignInPrompt {
    /// No user step needed; `complete_sign_in` returns straight away.
    Ready,
    Device(DeviceAuthorization),
}

#[derive(Clone, Eq, PartialEq)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: Duration,
    pub interval: Duration,
    pub issued_at: Instant,
}

/// Upper bound on how long a device code is honoured, whatever the provider says.
pub const MAX_DEVICE_CODE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on the wait between token polls.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

impl DeviceAuthorization {
    pub fn expires_at(&self) -> Instant {
        self.issued_at
            .checked_add(self.expires_in.min(MAX_DEVICE_CODE_LIFETIME))
            .unwrap_or(self.issued_at)
    }
}

impl std::fmt::Debug for DeviceAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAuthorization")
            .field("user_code", &self.user_code)
            .field("verification_url", &self.verification_url)
            .field("expires_in", &self.expires_in)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Provider-hosted authentication. Implementations never see user passwords.
pub trait IdentityProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    fn begin_sign_in(&self) -> AdapterResult<SignInPrompt>;

    /// Blocks until the provider confirms or rejects the prompt, or `cancel` fires.
    fn complete_sign_in(
        &self,
        prompt: &SignInPrompt,
        cancel: &CancellationToken,
    ) -> AdapterResult<Session>;

    /// Provider-side revocation. Callers drop the local session whatever this returns.
    fn sign_out(&self, session: &Session) -> AdapterResult<()>;
}

pub fn build_identity_provider(
    config: &IdentityConfig,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn IdentityProvider> {
    match config {
        IdentityConfig::Google {
            client_id,
            client_secret,
        } => Arc::new(GoogleDeviceIdentity::new(
            transport,
            client_id.clone(),
            client_secret.clone(),
        )),
        IdentityConfig::Static {
            user_name,
            image,
            access_token,
        } => Arc::new(StaticIdentity::new(
            user_name.clone(),
            image.clone(),
            access_token.clone(),
        )),
    }
}

//! Google sign-in through the OAuth 2.0 device authorization grant.
//!
//! The user confirms on Google's own page (`verification_url` + `user_code`),
//! so no credential ever passes through this process except the resulting
//! access token.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::adapters::{AdapterResult, error_message_from_response};
use crate::identity::{
    DeviceAuthorization, IdentityProvider, MAX_DEVICE_CODE_LIFETIME, MAX_POLL_INTERVAL,
    SignInPrompt,
};
use crate::models::{CoreError, CoreErrorKind, Operation, Session, SessionUser};
use crate::orchestration::CancellationToken;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, send_validated};

pub const GOOGLE_PROVIDER_ID: &str = "google";

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SIGN_IN_SCOPES: &str = "openid email profile";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const FALLBACK_USER_NAME: &str = "Google user";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoogleEndpoints {
    pub device_code: String,
    pub token: String,
    pub userinfo: String,
    pub revoke: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            device_code: "https://oauth2.googleapis.com/device/code".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            revoke: "https://oauth2.googleapis.com/revoke".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_uri")]
    verification_url: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Deserialize)]
struct TokenPollResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct UserInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

pub struct GoogleDeviceIdentity<T: HttpTransport> {
    transport: T,
    client_id: String,
    client_secret: Option<String>,
    endpoints: GoogleEndpoints,
    slow_down_step: Duration,
}

impl<T: HttpTransport> GoogleDeviceIdentity<T> {
    pub fn new(transport: T, client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            transport,
            client_id: client_id.into(),
            client_secret,
            endpoints: GoogleEndpoints::default(),
            slow_down_step: SLOW_DOWN_STEP,
        }
    }

    pub fn endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn slow_down_step(mut self, step: Duration) -> Self {
        self.slow_down_step = step;
        self
    }

    fn request_device_code(&self) -> AdapterResult<DeviceAuthorization> {
        let request = HttpRequest::post(&self.endpoints.device_code, Operation::SignIn)
            .form([
                ("client_id", self.client_id.as_str()),
                ("scope", SIGN_IN_SCOPES),
            ])
            .timeout(Some(REQUEST_TIMEOUT));
        let response = send_validated(&self.transport, request)?;
        if !response.is_success() {
            return Err(sign_in_error(
                CoreErrorKind::Backend,
                error_message_from_response(&response),
            ));
        }

        let issued_at = Instant::now();
        let body: DeviceCodeResponse = parse_json(&response, "device code response")?;
        Ok(DeviceAuthorization {
            device_code: body.device_code,
            user_code: body.user_code,
            verification_url: body.verification_url,
            expires_in: Duration::from_secs(body.expires_in).min(MAX_DEVICE_CODE_LIFETIME),
            interval: body
                .interval
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL)
                .min(MAX_POLL_INTERVAL),
            issued_at,
        })
    }

    fn poll_for_token(
        &self,
        authorization: &DeviceAuthorization,
        cancel: &CancellationToken,
    ) -> AdapterResult<String> {
        let deadline = authorization.expires_at();
        let mut interval = authorization.interval;

        loop {
            if cancel.wait_timeout(interval) {
                return Err(sign_in_error(
                    CoreErrorKind::Cancelled,
                    "sign-in cancelled",
                ));
            }
            if Instant::now() >= deadline {
                return Err(expired());
            }

            let response = send_validated(&self.transport, self.token_request(authorization))?;
            let body: TokenPollResponse = parse_json(&response, "token response")?;

            if response.is_success()
                && let Some(token) = body.access_token.filter(|token| !token.is_empty())
            {
                return Ok(token);
            }

            match body.error.as_deref() {
                Some("authorization_pending") => {}
                Some("slow_down") => {
                    interval = interval
                        .saturating_add(self.slow_down_step)
                        .min(MAX_POLL_INTERVAL);
                    tracing::debug!(?interval, "google asked to slow down device polling");
                }
                Some("access_denied") => {
                    return Err(sign_in_error(
                        CoreErrorKind::Unauthenticated,
                        "sign-in was denied",
                    ));
                }
                Some("expired_token") => return Err(expired()),
                Some(other) => {
                    let message = body
                        .error_description
                        .unwrap_or_else(|| other.to_string());
                    return Err(sign_in_error(CoreErrorKind::Backend, message));
                }
                None => {
                    return Err(sign_in_error(
                        CoreErrorKind::ParseFailure,
                        format!(
                            "token response (status {}) carried neither access_token nor error",
                            response.status
                        ),
                    ));
                }
            }
        }
    }

    fn token_request(&self, authorization: &DeviceAuthorization) -> HttpRequest {
        let mut fields = vec![
            ("client_id", self.client_id.as_str()),
            ("device_code", authorization.device_code.as_str()),
            ("grant_type", DEVICE_GRANT_TYPE),
        ];
        if let Some(secret) = &self.client_secret {
            fields.push(("client_secret", secret.as_str()));
        }

        HttpRequest::post(&self.endpoints.token, Operation::SignIn)
            .form(fields)
            .timeout(Some(REQUEST_TIMEOUT))
    }

    fn fetch_user(&self, token: &str) -> AdapterResult<SessionUser> {
        let request = HttpRequest::get(&self.endpoints.userinfo, Operation::SignIn)
            .bearer_auth(token)
            .timeout(Some(REQUEST_TIMEOUT));
        let response = send_validated(&self.transport, request)?;
        if !response.is_success() {
            return Err(sign_in_error(
                CoreErrorKind::Backend,
                error_message_from_response(&response),
            ));
        }

        let info: UserInfo = parse_json(&response, "userinfo response")?;
        Ok(SessionUser {
            name: info
                .name
                .or(info.email)
                .unwrap_or_else(|| FALLBACK_USER_NAME.to_string()),
            image: info.picture,
        })
    }
}

impl<T: HttpTransport> IdentityProvider for GoogleDeviceIdentity<T> {
    fn provider_id(&self) -> &str {
        GOOGLE_PROVIDER_ID
    }

    fn begin_sign_in(&self) -> AdapterResult<SignInPrompt> {
        let authorization = self.request_device_code()?;
        tracing::info!(
            verification_url = %authorization.verification_url,
            expires_in = ?authorization.expires_in,
            "google device authorization issued"
        );
        Ok(SignInPrompt::Device(authorization))
    }

    fn complete_sign_in(
        &self,
        prompt: &SignInPrompt,
        cancel: &CancellationToken,
    ) -> AdapterResult<Session> {
        let SignInPrompt::Device(authorization) = prompt else {
            return Err(sign_in_error(
                CoreErrorKind::InvalidInput,
                "google sign-in requires a device authorization prompt",
            ));
        };

        let token = self.poll_for_token(authorization, cancel)?;
        let user = self.fetch_user(&token)?;
        tracing::info!(user = %user.name, "google sign-in confirmed");
        Ok(Session::new(GOOGLE_PROVIDER_ID, user, Some(token)))
    }

    fn sign_out(&self, session: &Session) -> AdapterResult<()> {
        let Some(token) = session.bearer_token() else {
            return Ok(());
        };

        let request = HttpRequest::post(&self.endpoints.revoke, Operation::SignOut)
            .form([("token", token)])
            .timeout(Some(REQUEST_TIMEOUT));
        let response = send_validated(&self.transport, request)?;
        if response.is_success() {
            Ok(())
        } else {
            Err(CoreError {
                backend: None,
                operation: Some(Operation::SignOut),
                kind: CoreErrorKind::Backend,
                message: error_message_from_response(&response),
            })
        }
    }
}

fn parse_json<R: serde::de::DeserializeOwned>(
    response: &HttpResponse,
    what: &str,
) -> AdapterResult<R> {
    response.json().map_err(|error| {
        sign_in_error(
            CoreErrorKind::ParseFailure,
            format!("malformed {what}: {error}"),
        )
    })
}

fn expired() -> CoreError {
    sign_in_error(
        CoreErrorKind::Timeout,
        "device code expired before sign-in was confirmed",
    )
}

fn sign_in_error(kind: CoreErrorKind, message: impl Into<String>) -> CoreError {
    CoreError {
        backend: None,
        operation: Some(Operation::SignIn),
        kind,
        message: message.into(),
    }
}

//! Environment-driven configuration.
//!
//! Every setting comes from the process environment; [`AppConfig::from_lookup`]
//! takes the lookup as a closure so tests can supply a map instead.

use std::path::PathBuf;
use std::time::Duration;

use crate::models::{BackendVariant, CoreError, CoreErrorKind, Operation};
use crate::registry::{AGENT_URL_ENV, BACKEND_URL_ENV, backend_descriptor};

pub const BACKEND_VARIANT_ENV: &str = "TUBESEARCH_BACKEND";
pub const IDENTITY_ENV: &str = "TUBESEARCH_IDENTITY";
pub const GOOGLE_CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET_ENV: &str = "GOOGLE_CLIENT_SECRET";
pub const STATIC_USER_NAME_ENV: &str = "TUBESEARCH_USER_NAME";
pub const STATIC_USER_IMAGE_ENV: &str = "TUBESEARCH_USER_IMAGE";
pub const STATIC_ACCESS_TOKEN_ENV: &str = "TUBESEARCH_ACCESS_TOKEN";
pub const HTTP_TIMEOUT_ENV: &str = "TUBESEARCH_HTTP_TIMEOUT_SECS";
pub const LOG_FILE_ENV: &str = "TUBESEARCH_LOG_FILE";

const DEFAULT_LOG_FILE_NAME: &str = "tubesearch.log";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchBackendConfig {
    pub variant: BackendVariant,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Eq, PartialEq)]
pub enum IdentityConfig {
    Google {
        client_id: String,
        client_secret: Option<String>,
    },
    Static {
        user_name: String,
        image: Option<String>,
        access_token: Option<String>,
    },
}

impl IdentityConfig {
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::Google { .. } => "google",
            Self::Static { .. } => "static",
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google { client_id, .. } => f
                .debug_struct("Google")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::Static {
                user_name, image, ..
            } => f
                .debug_struct("Static")
                .field("user_name", user_name)
                .field("image", image)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub backend: SearchBackendConfig,
    pub identity: IdentityConfig,
    pub log_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let backend = load_backend(&value)?;
        let identity = load_identity(&value)?;
        let log_file = value(LOG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE_NAME));

        Ok(Self {
            backend,
            identity,
            log_file,
        })
    }
}

fn load_backend(value: &impl Fn(&str) -> Option<String>) -> Result<SearchBackendConfig, CoreError> {
    let agent_url = value(AGENT_URL_ENV);
    let backend_url = value(BACKEND_URL_ENV);

    let variant = match value(BACKEND_VARIANT_ENV) {
        Some(raw) => BackendVariant::parse(&raw).ok_or_else(|| {
            invalid(format!(
                "{BACKEND_VARIANT_ENV} must be 'agent' or 'tool', got '{raw}'"
            ))
        })?,
        None if agent_url.is_some() => BackendVariant::Agent,
        None if backend_url.is_some() => BackendVariant::ToolInvoke,
        None => {
            return Err(invalid(format!(
                "set {AGENT_URL_ENV} or {BACKEND_URL_ENV} to the search backend base url"
            )));
        }
    };

    let descriptor = backend_descriptor(variant);
    let env_name = descriptor.base_url_env;
    let base_url = match variant {
        BackendVariant::Agent => agent_url,
        BackendVariant::ToolInvoke => backend_url,
    }
    .ok_or_else(|| {
        invalid(format!(
            "{env_name} is required to reach the {} ({BACKEND_VARIANT_ENV}='{}')",
            descriptor.display_name,
            variant.as_str()
        ))
    })?;

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(format!(
            "{env_name} must be an http(s) url, got '{base_url}'"
        )));
    }

    let timeout = match value(HTTP_TIMEOUT_ENV) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(seconds) if seconds > 0 => Some(Duration::from_secs(seconds)),
            _ => {
                return Err(invalid(format!(
                    "{HTTP_TIMEOUT_ENV} must be a positive number of seconds, got '{raw}'"
                )));
            }
        },
        None => None,
    };

    Ok(SearchBackendConfig {
        variant,
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout,
    })
}

fn load_identity(value: &impl Fn(&str) -> Option<String>) -> Result<IdentityConfig, CoreError> {
    let provider = value(IDENTITY_ENV).unwrap_or_else(|| "google".to_string());

    match provider.to_ascii_lowercase().as_str() {
        "google" => {
            let client_id = value(GOOGLE_CLIENT_ID_ENV).ok_or_else(|| {
                invalid(format!(
                    "{GOOGLE_CLIENT_ID_ENV} is required for Google sign-in (or set {IDENTITY_ENV}=static)"
                ))
            })?;
            Ok(IdentityConfig::Google {
                client_id,
                client_secret: value(GOOGLE_CLIENT_SECRET_ENV),
            })
        }
        "static" => Ok(IdentityConfig::Static {
            user_name: value(STATIC_USER_NAME_ENV).unwrap_or_else(|| "Guest".to_string()),
            image: value(STATIC_USER_IMAGE_ENV),
            access_token: value(STATIC_ACCESS_TOKEN_ENV),
        }),
        other => Err(invalid(format!(
            "{IDENTITY_ENV} must be 'google' or 'static', got '{other}'"
        ))),
    }
}

fn invalid(message: String) -> CoreError {
    CoreError {
        backend: None,
        operation: Some(Operation::LoadConfig),
        kind: CoreErrorKind::InvalidInput,
        message,
    }
}

pub mod agent;
pub(crate) mod payload;
pub mod service;
pub mod tool_invoke;

pub use agent::AgentSearchAdapter;
pub use payload::{error_message_from_response, normalize_payload};
pub use service::{AdapterResult, SearchService, ensure_searchable, search_with_validation};
pub use tool_invoke::ToolInvokeSearchAdapter;

use std::sync::Arc;

use crate::config::SearchBackendConfig;
use crate::models::BackendVariant;
use crate::transport::HttpTransport;

/// Builds the adapter selected by configuration on top of a shared transport.
pub fn build_search_service(
    config: &SearchBackendConfig,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn SearchService> {
    match config.variant {
        BackendVariant::Agent => Arc::new(
            AgentSearchAdapter::new(transport, config.base_url.clone()).timeout(config.timeout),
        ),
        BackendVariant::ToolInvoke => Arc::new(
            ToolInvokeSearchAdapter::new(transport, config.base_url.clone())
                .timeout(config.timeout),
        ),
    }
}

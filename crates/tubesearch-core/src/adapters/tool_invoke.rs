use std::time::Duration;

use serde::Serialize;

use crate::adapters::payload::interpret_search_response;
use crate::adapters::service::{AdapterResult, SearchService};
use crate::models::{
    BackendDescriptor, BackendVariant, CoreError, CoreErrorKind, Operation, ResultList,
    SearchRequest,
};
use crate::registry::backend_descriptor;
use crate::transport::{HttpRequest, HttpTransport, send_validated};

#[derive(Serialize)]
struct ToolInput<'a> {
    q: &'a str,
    max: u32,
}

#[derive(Serialize)]
struct ToolInvokeBody<'a> {
    input: ToolInput<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

/// Variant B: invokes the `youtube.search` tool directly on the tool server,
/// which wraps its payload as `{ "result": ... }`.
pub struct ToolInvokeSearchAdapter<T: HttpTransport> {
    transport: T,
    base_url: String,
    timeout: Option<Duration>,
}

impl<T: HttpTransport> ToolInvokeSearchAdapter<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        self.descriptor().endpoint(&self.base_url)
    }

    fn build_request(&self, request: &SearchRequest) -> AdapterResult<HttpRequest> {
        let token = request.bearer_token();
        let body = serde_json::to_value(ToolInvokeBody {
            input: ToolInput {
                q: &request.query,
                max: request.max_results,
            },
            token,
        })
        .map_err(|error| CoreError {
            backend: Some(BackendVariant::ToolInvoke),
            operation: Some(Operation::Search),
            kind: CoreErrorKind::Internal,
            message: format!("failed to encode tool invocation: {error}"),
        })?;

        let mut http = HttpRequest::post(self.endpoint(), Operation::Search)
            .backend(BackendVariant::ToolInvoke)
            .json(body)
            .timeout(self.timeout);
        if let Some(token) = token {
            http = http.bearer_auth(token);
        }
        Ok(http)
    }
}

impl<T: HttpTransport> SearchService for ToolInvokeSearchAdapter<T> {
    fn descriptor(&self) -> &BackendDescriptor {
        backend_descriptor(BackendVariant::ToolInvoke)
    }

    fn search(&self, request: &SearchRequest) -> AdapterResult<ResultList> {
        let http = self.build_request(request)?;
        let response = send_validated(&self.transport, http)?;
        interpret_search_response(&response)
            .map_err(|error| error.attribute(Some(BackendVariant::ToolInvoke), Operation::Search))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::{HttpResponse, TransportResult};

    struct UnreachableTransport;

    impl HttpTransport for UnreachableTransport {
        fn send(&self, _request: HttpRequest) -> TransportResult<HttpResponse> {
            panic!("no request expected");
        }
    }

    #[test]
    fn body_nests_input_and_includes_token() {
        let adapter = ToolInvokeSearchAdapter::new(UnreachableTransport, "https://mcp.example.com");
        let http = adapter
            .build_request(&SearchRequest::new("cats", Some("abc".to_string())))
            .unwrap();

        assert_eq!(http.url, "https://mcp.example.com/tools/youtube.search/invoke");
        assert_eq!(
            http.json_body(),
            Some(&json!({"input": {"q": "cats", "max": 5}, "token": "abc"}))
        );
        assert_eq!(http.header_value("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn missing_token_omits_field_and_header() {
        let adapter = ToolInvokeSearchAdapter::new(UnreachableTransport, "https://mcp.example.com");
        let http = adapter
            .build_request(&SearchRequest::new("cats", None))
            .unwrap();

        assert_eq!(http.json_body(), Some(&json!({"input": {"q": "cats", "max": 5}})));
        assert_eq!(http.header_value("Authorization"), None);
    }
}

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

const SEARCH_ACTION: &str = "search";

#[derive(Serialize)]
struct AgentSearchBody<'a> {
    action: &'static str,
    query: &'a str,
    max_results: u32,
}

/// Variant A: `POST {base}/agent` with an action envelope; the agent replies
/// with the item array directly.
pub struct AgentSearchAdapter<T: HttpTransport> {
    transport: T,
    base_url: String,
    timeout: Option<Duration>,
}

impl<T: HttpTransport> AgentSearchAdapter<T> {
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
        let body = serde_json::to_value(AgentSearchBody {
            action: SEARCH_ACTION,
            query: &request.query,
            max_results: request.max_results,
        })
        .map_err(|error| CoreError {
            backend: Some(BackendVariant::Agent),
            operation: Some(Operation::Search),
            kind: CoreErrorKind::Internal,
            message: format!("failed to encode agent request: {error}"),
        })?;

        let mut http = HttpRequest::post(self.endpoint(), Operation::Search)
            .backend(BackendVariant::Agent)
            .json(body)
            .timeout(self.timeout);
        if let Some(token) = request.bearer_token() {
            http = http.bearer_auth(token);
        }
        Ok(http)
    }
}

impl<T: HttpTransport> SearchService for AgentSearchAdapter<T> {
    fn descriptor(&self) -> &BackendDescriptor {
        backend_descriptor(BackendVariant::Agent)
    }

    fn search(&self, request: &SearchRequest) -> AdapterResult<ResultList> {
        let http = self.build_request(request)?;
        let response = send_validated(&self.transport, http)?;
        interpret_search_response(&response)
            .map_err(|error| error.attribute(Some(BackendVariant::Agent), Operation::Search))
    }
}

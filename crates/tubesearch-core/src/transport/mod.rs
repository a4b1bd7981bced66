pub mod ureq_http;

pub use ureq_http::UreqTransport;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::models::{BackendVariant, CoreError, CoreErrorKind, Operation};
use crate::request_context::current_request_seq;

pub type TransportResult<T> = Result<T, CoreError>;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
    pub operation: Operation,
    pub backend: Option<BackendVariant>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, operation: Operation) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
            operation,
            backend: None,
        }
    }

    pub fn get(url: impl Into<String>, operation: Operation) -> Self {
        Self::new(HttpMethod::Get, url, operation)
    }

    pub fn post(url: impl Into<String>, operation: Operation) -> Self {
        Self::new(HttpMethod::Post, url, operation)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {token}"))
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(mut self, backend: BackendVariant) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Form(fields)) => fields
                .iter()
                .find(|(field, _)| field == key)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.url.trim().is_empty() {
            return Err(self.invalid_input("request url must not be empty"));
        }

        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(self.invalid_input(format!(
                "request url '{}' must use http or https",
                self.url
            )));
        }

        if self.headers.iter().any(|(name, value)| {
            name.is_empty() || has_line_break(name) || has_line_break(value)
        }) {
            return Err(self.invalid_input(
                "header names must be non-empty and headers must not contain line breaks",
            ));
        }

        if let Some(timeout) = self.timeout
            && timeout.is_zero()
        {
            return Err(self.invalid_input("timeout must be greater than zero when provided"));
        }

        Ok(())
    }

    fn invalid_input(&self, message: impl Into<String>) -> CoreError {
        CoreError {
            backend: self.backend,
            operation: Some(self.operation),
            kind: CoreErrorKind::InvalidInput,
            message: message.into(),
        }
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        let body = match &self.body {
            Some(RequestBody::Json(_)) => "json",
            Some(RequestBody::Form(_)) => "form",
            None => "none",
        };
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &body)
            .field("timeout", &self.timeout)
            .field("operation", &self.operation)
            .field("backend", &self.backend)
            .finish()
    }
}

fn has_line_break(value: &str) -> bool {
    value.contains('\r') || value.contains('\n')
}

/// Status and body of a completed exchange. Non-2xx statuses are not transport errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

pub trait HttpTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        self.as_ref().send(request)
    }
}

pub fn send_validated(
    transport: &dyn HttpTransport,
    request: HttpRequest,
) -> TransportResult<HttpResponse> {
    request.validate()?;

    let seq = current_request_seq().map(|seq| seq.0);
    tracing::debug!(
        method = ?request.method,
        url = %request.url,
        operation = ?request.operation,
        backend = ?request.backend,
        request_seq = ?seq,
        authorized = request.header_value(AUTHORIZATION).is_some(),
        "sending http request"
    );

    let response = transport.send(request)?;
    tracing::debug!(
        status = response.status,
        request_seq = ?seq,
        "received http response"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_http_urls() {
        let error = HttpRequest::post("ftp://example.com", Operation::Search)
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
        assert_eq!(error.operation, Some(Operation::Search));
    }

    #[test]
    fn validate_rejects_header_injection() {
        let error = HttpRequest::post("http://localhost/agent", Operation::Search)
            .bearer_auth("abc\r\nX-Evil: 1")
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let error = HttpRequest::get("https://example.com", Operation::SignIn)
            .timeout(Some(Duration::ZERO))
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request =
            HttpRequest::post("http://localhost/agent", Operation::Search).bearer_auth("t0k");
        assert_eq!(request.header_value("authorization"), Some("Bearer t0k"));
    }

    #[test]
    fn debug_output_hides_header_values() {
        let request =
            HttpRequest::post("http://localhost/agent", Operation::Search).bearer_auth("t0k");
        let rendered = format!("{request:?}");
        assert!(rendered.contains("Authorization"));
        assert!(!rendered.contains("t0k"));
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}

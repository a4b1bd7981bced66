use std::error::Error;
use std::io;

use crate::models::{CoreError, CoreErrorKind};
use crate::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportResult,
};

/// Blocking HTTP transport backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_agent(ureq::AgentBuilder::new().build())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let mut call = match request.method {
            HttpMethod::Get => self.agent.get(&request.url),
            HttpMethod::Post => self.agent.post(&request.url),
        };

        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        if let Some(timeout) = request.timeout {
            call = call.timeout(timeout);
        }

        let result = match &request.body {
            Some(RequestBody::Json(value)) => call.send_json(value),
            Some(RequestBody::Form(fields)) => {
                let borrowed: Vec<(&str, &str)> = fields
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect();
                call.send_form(&borrowed)
            }
            None => call.call(),
        };

        match result {
            Ok(response) => read_response(response, &request),
            Err(ureq::Error::Status(_, response)) => read_response(response, &request),
            Err(ureq::Error::Transport(transport)) => {
                let kind = if is_timeout(&transport) {
                    CoreErrorKind::Timeout
                } else {
                    CoreErrorKind::Transport
                };
                Err(CoreError {
                    backend: request.backend,
                    operation: Some(request.operation),
                    kind,
                    message: transport.to_string(),
                })
            }
        }
    }
}

fn read_response(response: ureq::Response, request: &HttpRequest) -> TransportResult<HttpResponse> {
    let status = response.status();
    let body = response.into_string().map_err(|error| CoreError {
        backend: request.backend,
        operation: Some(request.operation),
        kind: CoreErrorKind::Transport,
        message: format!("failed to read response body: {error}"),
    })?;
    Ok(HttpResponse { status, body })
}

fn is_timeout(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(io_error) = error.downcast_ref::<io::Error>()
            && matches!(
                io_error.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        {
            return true;
        }
        current = error.source();
    }
    false
}

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::AdapterResult;
use crate::models::{CoreError, CoreErrorKind, Operation, ResultList, SearchResultItem};
use crate::transport::HttpResponse;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
struct WireItem {
    id: WireId,
    title: String,
    description: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

impl From<WireItem> for SearchResultItem {
    fn from(item: WireItem) -> Self {
        let id = match item.id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        };
        Self {
            id,
            title: item.title,
            description: item.description,
            channel: item.channel,
            channel_id: item.channel_id,
        }
    }
}

pub(crate) fn interpret_search_response(response: &HttpResponse) -> AdapterResult<ResultList> {
    if !response.is_success() {
        return Err(backend_error(error_message_from_response(response)));
    }

    let value: Value = response.json().map_err(|error| CoreError {
        backend: None,
        operation: Some(Operation::Search),
        kind: CoreErrorKind::ParseFailure,
        message: format!("response body is not valid JSON: {error}"),
    })?;

    normalize_payload(value)
}

/// Normalizes a bare item array or a `{ "result": ... }` envelope into a `ResultList`.
///
/// Items that do not carry `id`, `title` and `description` are dropped. An
/// object carrying an `error` string at either level is reported as a backend
/// error with that text.
pub fn normalize_payload(value: Value) -> AdapterResult<ResultList> {
    if let Some(message) = embedded_error(&value) {
        return Err(backend_error(message));
    }

    let payload = match value {
        Value::Object(mut envelope) if envelope.contains_key("result") => envelope
            .remove("result")
            .unwrap_or(Value::Null),
        other => other,
    };

    if let Some(message) = embedded_error(&payload) {
        return Err(backend_error(message));
    }

    let raw_items = match payload {
        Value::Array(raw_items) => raw_items,
        other => {
            return Err(CoreError {
                backend: None,
                operation: Some(Operation::Search),
                kind: CoreErrorKind::ParseFailure,
                message: format!("unexpected response shape: {}", shape_name(&other)),
            });
        }
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.into_iter().enumerate() {
        match serde_json::from_value::<WireItem>(raw) {
            Ok(item) => items.push(SearchResultItem::from(item)),
            Err(error) => {
                tracing::warn!(index, error = %error, "dropping malformed search result item");
            }
        }
    }

    Ok(ResultList::new(items))
}

/// Text to show for a non-2xx response: the server's `error` or `detail`
/// string when present, otherwise the raw body.
pub fn error_message_from_response(response: &HttpResponse) -> String {
    let trimmed = response.body.trim();
    if trimmed.is_empty() {
        return format!("request failed with status code {}", response.status);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(fields)) => ["error", "detail"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| response.body.clone()),
        _ => response.body.clone(),
    }
}

fn embedded_error(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|fields| fields.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn backend_error(message: String) -> CoreError {
    CoreError {
        backend: None,
        operation: Some(Operation::Search),
        kind: CoreErrorKind::Backend,
        message,
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

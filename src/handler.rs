//! Response handlers, applied in order to a raw response until one of them
//! reports the response as handled (`Ok(true)`) or fails.
//!
//! The usual chain is [`DEFAULT_HANDLERS`]: the [`ErrorHandler`] turns every
//! non 2xx response into an error and otherwise falls through to the
//! [`JsonHandler`]. Every handler that reads the body also releases it,
//! whatever the outcome.

use crate::error::{codes, BceError, BceServerError};
use crate::transport::HttpResponse;
use crate::types::BceResponse;
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

#[async_trait]
pub trait ResponseHandler: Send + Sync {
    /// Returns `Ok(true)` when the response is fully handled and the chain
    /// must stop.
    async fn handle(
        &self,
        http_response: &mut HttpResponse,
        response: &mut BceResponse,
    ) -> Result<bool, BceError>;
}

pub const DEFAULT_HANDLERS: [&dyn ResponseHandler; 2] = [&ErrorHandler, &JsonHandler];

/// Reads the whole body and releases the response, on success or failure.
async fn read_and_close(http_response: &mut HttpResponse) -> Result<bytes::Bytes, BceError> {
    let body = http_response.read().await;
    http_response.close();
    body
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler;

#[async_trait]
impl ResponseHandler for ErrorHandler {
    async fn handle(
        &self,
        http_response: &mut HttpResponse,
        response: &mut BceResponse,
    ) -> Result<bool, BceError> {
        let status_code = http_response.status_code();
        if status_code / 100 == 2 {
            return Ok(false);
        }
        if status_code / 100 == 1 {
            http_response.close();
            return Err(BceError::UnsupportedStatus(status_code));
        }

        let body = read_and_close(http_response).await?;
        let fallback_request_id = response.metadata.bce_request_id.clone();

        let err = if body.is_empty() {
            BceServerError {
                status_code,
                code: codes::EXCEPTION.to_string(),
                message: http_response.reason.clone(),
                request_id: fallback_request_id,
            }
        } else {
            match serde_json::from_slice::<Value>(&body) {
                Ok(Value::Object(map)) => {
                    let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                    BceServerError {
                        status_code,
                        code: field("code").unwrap_or_else(|| codes::EXCEPTION.to_string()),
                        message: field("message")
                            .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
                        request_id: field("requestId").or(fallback_request_id),
                    }
                }
                _ => BceServerError {
                    status_code,
                    code: codes::EXCEPTION.to_string(),
                    message: String::from_utf8_lossy(&body).to_string(),
                    request_id: fallback_request_id,
                },
            }
        };
        debug!("server error: {}", err);

        Err(BceError::Server(err))
    }
}

/// Flattens a JSON object body into [`BceResponse::fields`]. Any other JSON
/// payload ends up in [`BceResponse::result`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHandler;

#[async_trait]
impl ResponseHandler for JsonHandler {
    async fn handle(
        &self,
        http_response: &mut HttpResponse,
        response: &mut BceResponse,
    ) -> Result<bool, BceError> {
        let body = read_and_close(http_response).await?;
        if !body.is_empty() {
            match snake_case_keys(serde_json::from_slice(&body)?) {
                Value::Object(map) => response.fields.extend(map),
                other => response.result = Some(other),
            }
        }
        Ok(true)
    }
}

/// For endpoints answering with a JSON array: the decoded payload is stored
/// as a whole in [`BceResponse::result`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListHandler;

#[async_trait]
impl ResponseHandler for ListHandler {
    async fn handle(
        &self,
        http_response: &mut HttpResponse,
        response: &mut BceResponse,
    ) -> Result<bool, BceError> {
        let body = read_and_close(http_response).await?;
        if !body.is_empty() {
            response.result = Some(snake_case_keys(serde_json::from_slice(&body)?));
        }
        Ok(true)
    }
}

/// Keeps the raw payload, e.g. for object downloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBodyHandler;

#[async_trait]
impl ResponseHandler for RawBodyHandler {
    async fn handle(
        &self,
        http_response: &mut HttpResponse,
        response: &mut BceResponse,
    ) -> Result<bool, BceError> {
        response.body = Some(read_and_close(http_response).await?);
        Ok(true)
    }
}

/// Converts every object key, at any depth, to snake_case.
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (snake_case(&key), snake_case_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static MULTI_DIGIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([0-9]{2,})").expect("valid regex"));
static LOWER_TO_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// camelCase to snake_case: `requestId` -> `request_id`,
/// `HTTPResponse` -> `http_response`, `key10` -> `key_10`.
pub fn snake_case(name: &str) -> String {
    let name = CAPITALIZED_WORD.replace_all(name, "${1}_${2}");
    let name = MULTI_DIGIT_NUMBER.replace_all(&name, "${1}_${2}");
    LOWER_TO_UPPER.replace_all(&name, "${1}_${2}").to_lowercase()
}

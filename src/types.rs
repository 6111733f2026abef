use crate::constants::{BCE_PREFIX, X_BCE_DEBUG_ID, X_BCE_REQUEST_ID};
use crate::error::BceError;
use crate::handler::snake_case;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Query parameters of a request. A `None` value is sent as `key=`.
pub type QueryParams = BTreeMap<String, Option<String>>;

/// Response metadata copied from the response headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub bce_request_id: Option<String>,
    pub bce_debug_id: Option<String>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub content_md5: Option<String>,
    pub content_range: Option<String>,
    pub date: Option<String>,
    /// ETag with the surrounding quotes stripped
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub server: Option<String>,
    /// Every other header, keyed by its snake_case name with the `x-bce-`
    /// prefix replaced by `bce_`.
    pub extra: BTreeMap<String, String>,
}

impl ResponseMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

trait GetAndConvertHeaders {
    fn get_and_convert<T: FromStr>(&self, header: &str) -> Option<T>;
    fn get_string(&self, header: &str) -> Option<String>;
}

impl GetAndConvertHeaders for http::header::HeaderMap {
    fn get_and_convert<T: FromStr>(&self, header: &str) -> Option<T> {
        self.get(header)?.to_str().ok()?.parse::<T>().ok()
    }
    fn get_string(&self, header: &str) -> Option<String> {
        Some(self.get(header)?.to_str().ok()?.to_owned())
    }
}

const KNOWN_HEADERS: [&str; 10] = [
    X_BCE_REQUEST_ID,
    X_BCE_DEBUG_ID,
    "content-length",
    "content-type",
    "content-md5",
    "content-range",
    "date",
    "etag",
    "last-modified",
    "server",
];

impl From<&http::HeaderMap> for ResponseMetadata {
    fn from(headers: &http::HeaderMap) -> Self {
        let mut extra = BTreeMap::new();
        for (key, value) in headers.iter() {
            let key = key.as_str();
            if KNOWN_HEADERS.contains(&key) {
                continue;
            }
            let Ok(value) = value.to_str() else {
                continue;
            };
            let name = match key.strip_prefix(BCE_PREFIX) {
                Some(rest) => format!("bce_{}", rest),
                None => key.to_string(),
            };
            extra.insert(snake_case(&name.replace('-', "_")), value.to_string());
        }

        Self {
            bce_request_id: headers.get_string(X_BCE_REQUEST_ID),
            bce_debug_id: headers.get_string(X_BCE_DEBUG_ID),
            content_length: headers.get_and_convert("content-length"),
            content_type: headers.get_string("content-type"),
            content_md5: headers.get_string("content-md5"),
            content_range: headers.get_string("content-range"),
            date: headers.get_string("date"),
            etag: headers
                .get_string("etag")
                .map(|etag| etag.trim_matches('"').to_string()),
            last_modified: headers.get_string("last-modified"),
            server: headers.get_string("server"),
            extra,
        }
    }
}

/// Parsed response handed back to the caller.
///
/// JSON object bodies are flattened into `fields` with snake_case keys, JSON
/// array bodies land in `result`, raw downloads in `body`. Lookups are
/// explicit: a missing key is `None`, never a silent default.
#[derive(Debug, Default, Clone)]
pub struct BceResponse {
    pub metadata: ResponseMetadata,
    pub fields: Map<String, Value>,
    pub result: Option<Value>,
    pub body: Option<Bytes>,
}

impl BceResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key)?.as_str()
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.fields.get(key).unwrap_or(default)
    }

    /// Converts the flattened fields into a typed, per endpoint response.
    /// Field names of `T` are expected in snake_case.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, BceError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// Typed access to a list payload stored by the list handler.
    pub fn deserialize_result<T: DeserializeOwned>(&self) -> Result<T, BceError> {
        let value = self.result.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

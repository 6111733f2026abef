// Copyright 2026 The bce-simple Authors

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

/// Request pipeline, your main entrypoint
pub use crate::client::{content_md5, BceHttpClient};
/// Client configuration and per call overrides
pub use crate::config::{BceClientConfig, ConfigOverride, Endpoint, Protocol};
/// BCE Credentials
pub use crate::credentials::{AccessKeyId, Credentials, SecretAccessKey};
/// Specialized BCE Error type which wraps errors from different sources
pub use crate::error::{codes, BceError, BceServerError};
/// Response handler chain
pub use crate::handler::{
    ErrorHandler, JsonHandler, ListHandler, RawBodyHandler, ResponseHandler, DEFAULT_HANDLERS,
};
/// Retry policies
pub use crate::retry::{BackOffRetryPolicy, NoRetryPolicy, RetryPolicy};
/// Request signing
pub use crate::signature::{BceV1Signer, Sign};
/// Pluggable HTTP layer
pub use crate::transport::{
    collect_body, HttpRequest, HttpResponse, RequestBody, ResponseBody, ReqwestTransport, SeekRead,
    Transport,
};
/// Specialized Response objects
pub use crate::types::{BceResponse, QueryParams, ResponseMetadata};
pub use http::Method as BceMethod;
pub use http::StatusCode as BceStatusCode;

pub mod canonical;
mod client;
mod config;
pub mod constants;
mod credentials;
mod error;
mod handler;
pub mod prelude;
mod retry;
pub mod signature;
mod transport;
mod types;

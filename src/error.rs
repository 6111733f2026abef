use std::fmt;
use thiserror::Error;

/// Well known `code` values returned in BCE error bodies.
pub mod codes {
    pub const ACCESS_DENIED: &str = "AccessDenied";
    pub const INAPPROPRIATE_JSON: &str = "InappropriateJSON";
    pub const INTERNAL_ERROR: &str = "InternalError";
    pub const INVALID_ACCESS_KEY_ID: &str = "InvalidAccessKeyId";
    pub const INVALID_HTTP_AUTH_HEADER: &str = "InvalidHTTPAuthHeader";
    pub const INVALID_HTTP_REQUEST: &str = "InvalidHTTPRequest";
    pub const INVALID_URI: &str = "InvalidURI";
    pub const MALFORMED_JSON: &str = "MalformedJSON";
    pub const INVALID_VERSION: &str = "InvalidVersion";
    pub const OPT_IN_REQUIRED: &str = "OptInRequired";
    pub const PRECONDITION_FAILED: &str = "PreconditionFailed";
    pub const REQUEST_EXPIRED: &str = "RequestExpired";
    pub const SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

    /// Used when an error body does not carry a `code`.
    pub const EXCEPTION: &str = "Exception";
}

/// Error reported by the remote service for any non 2xx (and non 1xx) status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BceServerError {
    pub status_code: u16,
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl fmt::Display for BceServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} {}: {} (request id: {})",
            self.status_code,
            self.code,
            self.message,
            self.request_id.as_deref().unwrap_or("-")
        )
    }
}

impl std::error::Error for BceServerError {}

#[derive(Error, Debug)]
pub enum BceError {
    /// Local validation failure, raised before any network I/O.
    #[error("client: {0}")]
    Client(String),
    #[error("Can not handle 1xx http status code: {0}")]
    UnsupportedStatus(u16),
    #[error("server: {0}")]
    Server(BceServerError),
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unable to execute HTTP request. Retried {retries} times. Last error: {last_error}")]
    Http {
        retries: u32,
        #[source]
        last_error: Box<BceError>,
    },

    #[error("env var missing: {0}")]
    EnvVarMissing(#[from] std::env::VarError),
    #[error("header to string: {0}")]
    HeaderToStr(#[from] http::header::ToStrError),
    #[error("hmac invalid length: {0}")]
    HmacInvalidLength(#[from] sha2::digest::InvalidLength),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    #[error("serde json: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Time format error: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("Invalid unix timestamp: {0}")]
    TimeRange(#[from] time::error::ComponentRange),
    #[error("url parse: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<BceServerError> for BceError {
    fn from(value: BceServerError) -> Self {
        Self::Server(value)
    }
}

impl BceError {
    /// The server error behind this error, looking through the retry wrapper.
    pub fn server_error(&self) -> Option<&BceServerError> {
        match self {
            Self::Server(err) => Some(err),
            Self::Http { last_error, .. } => last_error.server_error(),
            _ => None,
        }
    }

    /// `true` for failures of the socket layer before any response arrived.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Io(_) => true,
            Self::Http { last_error, .. } => last_error.is_transport(),
            _ => false,
        }
    }
}

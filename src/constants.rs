use std::time::Duration;

pub const AUTH_VERSION: &str = "bce-auth-v1";
pub const BCE_PREFIX: &str = "x-bce-";

pub const X_BCE_DATE: &str = "x-bce-date";
pub const X_BCE_REQUEST_ID: &str = "x-bce-request-id";
pub const X_BCE_DEBUG_ID: &str = "x-bce-debug-id";
pub const X_BCE_SECURITY_TOKEN: &str = "x-bce-security-token";

/// Headers which are signed when the caller does not pick a set explicitly.
/// `x-bce-*` headers are always signed on top of these.
pub const DEFAULT_HEADERS_TO_SIGN: [&str; 4] =
    ["host", "content-md5", "content-length", "content-type"];

pub const DEFAULT_EXPIRATION_SECONDS: u32 = 1800;

pub const DEFAULT_REGION: &str = "bj";
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(50);
pub const DEFAULT_SEND_BUF_SIZE: usize = 1024 * 1024;
pub const DEFAULT_RECV_BUF_SIZE: usize = 10 * 1024 * 1024;

pub const CANONICAL_TIME: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

pub fn user_agent() -> String {
    format!(
        "bce-sdk-rust/{}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

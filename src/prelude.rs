pub use crate::client::BceHttpClient;
pub use crate::config::{BceClientConfig, ConfigOverride};
pub use crate::credentials::Credentials;
pub use crate::error::BceError;
pub use crate::handler::DEFAULT_HANDLERS;
pub use crate::signature::BceV1Signer;
pub use crate::transport::RequestBody;
pub use crate::types::{BceResponse, QueryParams};

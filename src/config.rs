use crate::constants::{
    user_agent, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_RECV_BUF_SIZE, DEFAULT_REGION,
    DEFAULT_SEND_BUF_SIZE,
};
use crate::credentials::Credentials;
use crate::error::BceError;
use crate::retry::{BackOffRetryPolicy, RetryPolicy};
use std::env;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved endpoint: where to connect and what to put into `Host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parses `host`, `host:port` or `scheme://host[:port]`. A scheme inside
    /// the endpoint wins over `protocol`. IPv6 hosts keep their brackets.
    pub fn parse(endpoint: &str, protocol: Protocol) -> Result<Self, BceError> {
        let endpoint = endpoint.trim();
        let url = if endpoint.contains("://") {
            Url::parse(endpoint)?
        } else {
            Url::parse(&format!("{}://{}", protocol, endpoint))?
        };

        let protocol = match url.scheme() {
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            scheme => {
                return Err(BceError::Client(format!(
                    "unsupported protocol '{}' in endpoint '{}'",
                    scheme, endpoint
                )))
            }
        };
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(BceError::Client(format!(
                "endpoint '{}' must not contain a path or query",
                endpoint
            )));
        }

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| BceError::Client(format!("endpoint '{}' has no host", endpoint)))?;

        Ok(Self {
            protocol,
            host: host.to_string(),
            port: url.port_or_known_default().unwrap_or(protocol.default_port()),
        })
    }

    /// Value of the `Host` header; the port only shows up when it is not the
    /// default one of the protocol.
    pub fn host_header(&self) -> String {
        if self.port == self.protocol.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.host_header())
    }
}

/// Client configuration. Every field has a default; per call changes go
/// through [`ConfigOverride`] and [`BceClientConfig::merge`].
#[derive(Clone)]
pub struct BceClientConfig {
    pub credentials: Option<Credentials>,
    pub endpoint: Option<String>,
    pub protocol: Protocol,
    pub region: String,
    pub connection_timeout: Duration,
    pub send_buf_size: usize,
    pub recv_buf_size: usize,
    pub retry_policy: Arc<dyn RetryPolicy>,
    pub security_token: Option<String>,
    pub user_agent: String,
}

impl fmt::Debug for BceClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BceClientConfig")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("protocol", &self.protocol)
            .field("region", &self.region)
            .field("connection_timeout", &self.connection_timeout)
            .field("send_buf_size", &self.send_buf_size)
            .field("recv_buf_size", &self.recv_buf_size)
            .field("retry_policy", &self.retry_policy)
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "<hidden>"),
            )
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for BceClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            endpoint: None,
            protocol: Protocol::default(),
            region: DEFAULT_REGION.to_string(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            send_buf_size: DEFAULT_SEND_BUF_SIZE,
            recv_buf_size: DEFAULT_RECV_BUF_SIZE,
            retry_policy: Arc::new(BackOffRetryPolicy::default()),
            security_token: None,
            user_agent: user_agent(),
        }
    }
}

impl BceClientConfig {
    pub fn new<S>(credentials: Credentials, endpoint: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            credentials: Some(credentials),
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn try_from_env() -> Result<Self, BceError> {
        let credentials = Credentials::try_from_env()?;
        let endpoint = env::var("BCE_ENDPOINT")?;

        let mut config = Self::new(credentials, endpoint);
        if let Ok(region) = env::var("BCE_REGION") {
            config.region = region;
        }
        config.security_token = env::var("BCE_SECURITY_TOKEN").ok();
        Ok(config)
    }

    /// Returns a copy of `self` with every field set in `overrides` replaced.
    /// `self` is never touched, so a shared client config stays read only.
    pub fn merge(&self, overrides: &ConfigOverride) -> Self {
        let mut config = self.clone();
        if let Some(credentials) = &overrides.credentials {
            config.credentials = Some(credentials.clone());
        }
        if let Some(endpoint) = &overrides.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(protocol) = overrides.protocol {
            config.protocol = protocol;
        }
        if let Some(region) = &overrides.region {
            config.region = region.clone();
        }
        if let Some(timeout) = overrides.connection_timeout {
            config.connection_timeout = timeout;
        }
        if let Some(size) = overrides.send_buf_size {
            config.send_buf_size = size;
        }
        if let Some(size) = overrides.recv_buf_size {
            config.recv_buf_size = size;
        }
        if let Some(policy) = &overrides.retry_policy {
            config.retry_policy = policy.clone();
        }
        if let Some(token) = &overrides.security_token {
            config.security_token = Some(token.clone());
        }
        if let Some(user_agent) = &overrides.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    pub fn endpoint(&self) -> Result<Endpoint, BceError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| BceError::Client("no endpoint configured".to_string()))?;
        Endpoint::parse(endpoint, self.protocol)
    }

    pub fn credentials(&self) -> Result<&Credentials, BceError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| BceError::Client("no credentials configured".to_string()))
    }
}

/// Partial configuration. Only fields which are `Some` are applied.
#[derive(Clone, Default)]
pub struct ConfigOverride {
    pub credentials: Option<Credentials>,
    pub endpoint: Option<String>,
    pub protocol: Option<Protocol>,
    pub region: Option<String>,
    pub connection_timeout: Option<Duration>,
    pub send_buf_size: Option<usize>,
    pub recv_buf_size: Option<usize>,
    pub retry_policy: Option<Arc<dyn RetryPolicy>>,
    pub security_token: Option<String>,
    pub user_agent: Option<String>,
}

impl fmt::Debug for ConfigOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOverride")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("protocol", &self.protocol)
            .field("region", &self.region)
            .field("connection_timeout", &self.connection_timeout)
            .field("send_buf_size", &self.send_buf_size)
            .field("recv_buf_size", &self.recv_buf_size)
            .field("retry_policy", &self.retry_policy)
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "<hidden>"),
            )
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

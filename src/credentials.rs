use crate::error::BceError;
use std::env;
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyId(pub String);

impl AsRef<str> for AccessKeyId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl AccessKeyId {
    pub fn new(access_key_id: String) -> Self {
        Self(access_key_id)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SecretAccessKey(pub String);

impl Debug for SecretAccessKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretAccessKey(<hidden>)")
    }
}

impl AsRef<str> for SecretAccessKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl SecretAccessKey {
    pub fn new(secret_access_key: String) -> Self {
        Self(secret_access_key)
    }
}

/// Access key pair used to sign every request. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: AccessKeyId,
    pub secret_access_key: SecretAccessKey,
}

impl Credentials {
    pub fn new<S>(access_key_id: S, secret_access_key: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            access_key_id: AccessKeyId(access_key_id.into()),
            secret_access_key: SecretAccessKey(secret_access_key.into()),
        }
    }

    pub fn try_from_env() -> Result<Self, BceError> {
        let access_key_id = env::var("BCE_ACCESS_KEY_ID")?;
        let secret_access_key = env::var("BCE_SECRET_ACCESS_KEY")?;

        Ok(Self {
            access_key_id: AccessKeyId(access_key_id),
            secret_access_key: SecretAccessKey(secret_access_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_hidden() {
        let credentials = Credentials::new("my_ak", "my_sk");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("my_ak"));
        assert!(!debug.contains("my_sk"));
    }
}

use crate::canonical::{self, CanonicalHeaders};
use crate::constants::{AUTH_VERSION, CANONICAL_TIME, DEFAULT_EXPIRATION_SECONDS};
use crate::credentials::{Credentials, SecretAccessKey};
use crate::error::BceError;
use crate::types::QueryParams;
use hmac::Hmac;
use http::{HeaderMap, Method};
use sha2::digest::Mac;
use sha2::Sha256;
use std::collections::BTreeSet;
use time::OffsetDateTime;
use tracing::debug;

/// `YYYY-MM-DDTHH:MM:SSZ` in UTC. `0` means the current wall clock time.
pub fn canonical_time(timestamp: i64) -> Result<String, BceError> {
    let datetime = if timestamp == 0 {
        OffsetDateTime::now_utc()
    } else {
        OffsetDateTime::from_unix_timestamp(timestamp)?
    };
    Ok(datetime.format(CANONICAL_TIME)?)
}

fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> Result<String, BceError> {
    let mut hmac = Hmac::<Sha256>::new_from_slice(key)?;
    hmac.update(content);
    Ok(hex::encode(hmac.finalize().into_bytes()))
}

/// Hex encoded signing key, derived from the secret and the key info
/// `bce-auth-v1/{ak}/{time}/{expiration}`.
pub fn signing_key(secret: &SecretAccessKey, sign_key_info: &str) -> Result<String, BceError> {
    hex_hmac_sha256(secret.as_ref().as_bytes(), sign_key_info.as_bytes())
}

/// Builds `METHOD\nURI\nQUERY\nHEADERS` and returns it together with the
/// header selection it was built from.
pub fn canonical_request(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    params: &QueryParams,
    headers_to_sign: Option<&BTreeSet<String>>,
) -> Result<(String, CanonicalHeaders), BceError> {
    let canonical_headers = canonical::canonical_headers(headers, headers_to_sign)?;
    let request = format!(
        "{}\n{}\n{}\n{}",
        method.as_str(),
        canonical::canonical_uri(path, &[]),
        canonical::canonical_query_string(params, true),
        canonical_headers.canonical,
    );
    Ok((request, canonical_headers))
}

/// Computes the `bce-auth-v1` authorization value.
///
/// `path` must already be in its canonical form (see
/// [`canonical::canonical_uri`]), it is hashed verbatim.
///
/// The signed header segment is empty unless `headers_to_sign` was given. In
/// that case it lists the headers that were really hashed, which includes the
/// `x-bce-*` headers added on top of the caller's set.
#[allow(clippy::too_many_arguments)]
pub fn sign(
    credentials: &Credentials,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    params: &QueryParams,
    timestamp: i64,
    expiration_seconds: u32,
    headers_to_sign: Option<&BTreeSet<String>>,
) -> Result<String, BceError> {
    let sign_key_info = format!(
        "{}/{}/{}/{}",
        AUTH_VERSION,
        credentials.access_key_id.as_ref(),
        canonical_time(timestamp)?,
        expiration_seconds,
    );
    let sign_key = signing_key(&credentials.secret_access_key, &sign_key_info)?;

    let (canonical_request, selected) =
        canonical_request(method, path, headers, params, headers_to_sign)?;
    debug!("canonical request:\n{}", canonical_request);

    let signature = hex_hmac_sha256(sign_key.as_bytes(), canonical_request.as_bytes())?;

    let signed_headers = match headers_to_sign {
        Some(set) if !set.is_empty() => selected.signed_headers.join(";"),
        _ => String::new(),
    };

    Ok(format!("{}/{}/{}", sign_key_info, signed_headers, signature))
}

/// Produces the `Authorization` value of a request. This is the callback the
/// dispatcher invokes before every attempt.
pub trait Sign: Send + Sync {
    fn sign(
        &self,
        credentials: &Credentials,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        params: &QueryParams,
    ) -> Result<String, BceError>;
}

impl<F> Sign for F
where
    F: Fn(&Credentials, &Method, &str, &HeaderMap, &QueryParams) -> Result<String, BceError>
        + Send
        + Sync,
{
    fn sign(
        &self,
        credentials: &Credentials,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        params: &QueryParams,
    ) -> Result<String, BceError> {
        self(credentials, method, path, headers, params)
    }
}

/// The standard signer, always signing with the current time.
#[derive(Debug, Clone)]
pub struct BceV1Signer {
    pub expiration_seconds: u32,
    pub headers_to_sign: Option<BTreeSet<String>>,
}

impl Default for BceV1Signer {
    fn default() -> Self {
        Self {
            expiration_seconds: DEFAULT_EXPIRATION_SECONDS,
            headers_to_sign: None,
        }
    }
}

impl BceV1Signer {
    pub fn new(expiration_seconds: u32) -> Self {
        Self {
            expiration_seconds,
            headers_to_sign: None,
        }
    }

    pub fn with_headers_to_sign<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers_to_sign = Some(headers.into_iter().map(Into::into).collect());
        self
    }
}

impl Sign for BceV1Signer {
    fn sign(
        &self,
        credentials: &Credentials,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        params: &QueryParams,
    ) -> Result<String, BceError> {
        sign(
            credentials,
            method,
            path,
            headers,
            params,
            0,
            self.expiration_seconds,
            self.headers_to_sign.as_ref(),
        )
    }
}

//! Canonical request construction for BCE signature version 1.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders
//! ```
//!
//! Every piece goes through [`normalize_string`], so two implementations
//! encoding the same input must agree byte for byte.

use crate::constants::{BCE_PREFIX, DEFAULT_HEADERS_TO_SIGN};
use crate::error::BceError;
use crate::types::QueryParams;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeSet;

/// Everything outside of the RFC 3986 unreserved set `A-Za-z0-9.~_-`.
/// Bytes above 0x7F are always encoded.
const BCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const BCE_ENCODE_SET_KEEP_SLASH: &AsciiSet = &BCE_ENCODE_SET.remove(b'/');

/// Percent-encodes every byte of `value` outside the unreserved set as `%XX`
/// (uppercase). `/` is only kept as is when `encode_slash` is `false`.
pub fn normalize_string(value: &str, encode_slash: bool) -> String {
    if encode_slash {
        utf8_percent_encode(value, BCE_ENCODE_SET).to_string()
    } else {
        utf8_percent_encode(value, BCE_ENCODE_SET_KEEP_SLASH).to_string()
    }
}

/// Appends path components to `base`.
///
/// `base` is taken verbatim, empty components are skipped and each remaining
/// one is normalized without encoding `/`. Redundant slashes at the joints are
/// trimmed, so `canonical_uri("/v1/", &["/bucket/", "/key"])` is
/// `/v1/bucket/key`.
pub fn canonical_uri(base: &str, components: &[&str]) -> String {
    let mut parts = Vec::with_capacity(components.len() + 1);
    parts.push(base.to_string());
    parts.extend(
        components
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| normalize_string(c, false)),
    );

    let last = parts.len() - 1;
    if last > 0 {
        for (i, part) in parts.iter_mut().enumerate() {
            let trimmed = if i == 0 {
                part.trim_end_matches('/')
            } else if i == last {
                part.trim_start_matches('/')
            } else {
                part.trim_matches('/')
            };
            *part = trimmed.to_string();
        }
    }

    let uri = parts.join("/");
    if uri.is_empty() {
        "/".to_string()
    } else {
        uri
    }
}

/// Sorted `key=value` pairs joined with `&`.
///
/// Sorting happens on the encoded pairs, so the result does not depend on the
/// order the params were inserted in. With `for_signature` the
/// `authorization` param of a pre-signed URL is left out.
pub fn canonical_query_string(params: &QueryParams, for_signature: bool) -> String {
    let mut pairs = params
        .iter()
        .filter(|(key, _)| {
            !(for_signature && key.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
        })
        .map(|(key, value)| {
            format!(
                "{}={}",
                normalize_string(key, true),
                normalize_string(value.as_deref().unwrap_or_default(), true)
            )
        })
        .collect::<Vec<String>>();
    pairs.sort();
    pairs.join("&")
}

/// Result of the header selection step. `signed_headers` lists exactly the
/// (lowercase, sorted, deduplicated) names that made it into `canonical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    pub canonical: String,
    pub signed_headers: Vec<String>,
}

/// Selects, normalizes and sorts the headers taking part in the signature.
///
/// Without an explicit (non empty) `headers_to_sign` the default set
/// `host, content-md5, content-length, content-type` is used. Headers starting
/// with `x-bce-` are always included.
pub fn canonical_headers(
    headers: &HeaderMap,
    headers_to_sign: Option<&BTreeSet<String>>,
) -> Result<CanonicalHeaders, BceError> {
    let explicit = headers_to_sign
        .filter(|set| !set.is_empty())
        .map(|set| {
            set.iter()
                .map(|name| name.trim().to_lowercase())
                .collect::<BTreeSet<String>>()
        });

    let mut lines = Vec::with_capacity(headers.len());
    let mut signed = BTreeSet::new();
    for (name, value) in headers.iter() {
        // `HeaderName` is always lowercase already
        let name = name.as_str();
        let selected = name.starts_with(BCE_PREFIX)
            || match &explicit {
                Some(set) => set.contains(name),
                None => DEFAULT_HEADERS_TO_SIGN.contains(&name),
            };
        if !selected {
            continue;
        }

        lines.push(format!(
            "{}:{}",
            normalize_string(name, true),
            normalize_string(value.to_str()?.trim(), true)
        ));
        signed.insert(name.to_string());
    }
    lines.sort();

    Ok(CanonicalHeaders {
        canonical: lines.join("\n"),
        signed_headers: signed.into_iter().collect(),
    })
}

//! `Authorization: Bearer <token>` extraction.
//!
//! Pure string handling, no I/O. The caller decides what a failure means.

use axum::http::{HeaderMap, header};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("authorization header is absent")]
    Missing,
    #[error("authorization header is not a Bearer credential")]
    Malformed,
    #[error("bearer token is empty")]
    Empty,
}

/// Pull the raw token out of an `authorization` header value.
///
/// The prefix is case-sensitive with exactly one space. The token is the
/// first space-delimited segment after it, so `"Bearer a b"` yields `"a"`
/// and `"Bearer  a"` (two spaces) yields an empty token.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, BearerError> {
    let header = header.ok_or(BearerError::Missing)?;
    let rest = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BearerError::Malformed)?;

    match rest.split(' ').next() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(BearerError::Empty),
    }
}

/// Same as [`extract_bearer`], reading from a header map. Non UTF-8 values
/// are treated as malformed.
pub fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> {
    match headers.get(header::AUTHORIZATION) {
        None => Err(BearerError::Missing),
        Some(value) => {
            let value = value.to_str().map_err(|_| BearerError::Malformed)?;
            extract_bearer(Some(value))
        }
    }
}

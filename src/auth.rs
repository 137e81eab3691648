use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ApiError;

/// Resolves the caller identity from the `Authorization` header.
///
/// Token verification happens at the fronting gateway; by the time a request
/// reaches this service the bearer value is the authenticated subject.
pub fn authenticate(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers.get(AUTHORIZATION).ok_or(ApiError::Unauthenticated)?;
    let value = value.to_str().map_err(|_| ApiError::Unauthenticated)?;
    let subject = value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?
        .trim();
    if subject.is_empty() {
        return Err(ApiError::Unauthenticated);
    }
    Ok(subject.to_string())
}

//! # Custom Extractors & Validation
//!
//! Helpers to extract JSON bodies and identity ids, and the [`Caller`]
//! extractor that reads the invoking principal from the request.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::Json;

use idreg_core::{IdentityId, Principal};

use crate::error::AppError;

/// Header carrying the calling principal.
pub const CALLER_HEADER: &str = "x-idreg-principal";

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract an identity id from the path.
///
/// A non-numeric segment is a bad request; `0` is a validation error,
/// since no identity can ever hold it.
pub fn extract_identity_id(result: Result<Path<u64>, PathRejection>) -> Result<IdentityId, AppError> {
    let Path(raw) = result.map_err(|err| AppError::BadRequest(err.body_text()))?;
    Ok(IdentityId::new(raw)?)
}

/// The principal invoking a request, taken from [`CALLER_HEADER`].
///
/// Missing header is 401; a header that is not a valid principal is 422.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {CALLER_HEADER} header")))?;
        let text = value
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("{CALLER_HEADER} is not visible ASCII")))?;
        Ok(Self(Principal::new(text)?))
    }
}

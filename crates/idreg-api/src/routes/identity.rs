//! # Identity Registry Routes
//!
//! HTTP surface over the registry operations. Mutations are attributed to
//! the principal in the `x-idreg-principal` header and run at the next
//! host clock height. Reads need no caller.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use idreg_core::{IdentityId, KycLevel, Principal};
use idreg_state::{IdentityData, IdentityStatus, RegistryEvent};

use crate::error::AppError;
use crate::extractors::{extract_identity_id, extract_json, Caller};
use crate::state::AppState;

// -- Request DTOs -------------------------------------------------------------

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct HashRequest {
    /// Document hash. Only the registry's hash format judges it, so a
    /// malformed hash of any length is an `INVALID_HASH_FORMAT` rejection.
    pub hash: String,
}

/// Body of a verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub kyc_level: KycLevel,
}

// -- Response DTOs ------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: IdentityId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// `identity` is `null` when no record has the id.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub identity: Option<IdentityData>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<IdentityStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifiedResponse {
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KycLevelResponse {
    pub kyc_level: KycLevel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub id: IdentityId,
    pub events: Vec<RegistryEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerResponse {
    pub owner: Principal,
    pub id: Option<IdentityId>,
}

/// Build the identity registry router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/identities", post(create_identity))
        .route("/v1/identities/{id}", get(get_identity_data))
        .route("/v1/identities/{id}/hash", put(update_identity_data))
        .route("/v1/identities/{id}/verification", post(verify_identity))
        .route("/v1/identities/{id}/verified", get(is_identity_verified))
        .route("/v1/identities/{id}/kyc-level", get(get_kyc_level))
        .route("/v1/identities/{id}/history", get(history))
        .route("/v1/owners/{principal}", get(identity_of))
}

// -- Mutations ----------------------------------------------------------------

/// POST /v1/identities
async fn create_identity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<HashRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let req = extract_json(body)?;
    let id = state.mutate(caller, |reg, ctx| reg.create_identity(ctx, &req.hash))?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /v1/identities/{id}/hash
async fn update_identity_data(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    Caller(caller): Caller,
    body: Result<Json<HashRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let req = extract_json(body)?;
    let ok = state.mutate(caller, |reg, ctx| {
        reg.update_identity_data(ctx, id, &req.hash)
    })?;
    Ok(Json(OkResponse { ok }))
}

/// POST /v1/identities/{id}/verification
async fn verify_identity(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    Caller(caller): Caller,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let req = extract_json(body)?;
    let ok = state.mutate(caller, |reg, ctx| reg.verify_identity(ctx, id, req.kyc_level))?;
    Ok(Json(OkResponse { ok }))
}

// -- Reads --------------------------------------------------------------------

/// GET /v1/identities/{id}
async fn get_identity_data(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<IdentityResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let (identity, status) = state.read(|reg| {
        let q = reg.query();
        (q.get_identity_data(id), q.status(id).ok())
    });
    Ok(Json(IdentityResponse { identity, status }))
}

/// GET /v1/identities/{id}/verified
async fn is_identity_verified(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<VerifiedResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let verified = state.read(|reg| reg.is_identity_verified(id))?;
    Ok(Json(VerifiedResponse { verified }))
}

/// GET /v1/identities/{id}/kyc-level
async fn get_kyc_level(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<KycLevelResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let kyc_level = state.read(|reg| reg.get_kyc_level(id))?;
    Ok(Json(KycLevelResponse { kyc_level }))
}

/// GET /v1/identities/{id}/history
async fn history(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let id = extract_identity_id(path)?;
    let events = state.read(|reg| reg.query().history(id));
    Ok(Json(HistoryResponse { id, events }))
}

/// GET /v1/owners/{principal}
async fn identity_of(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<OwnerResponse>, AppError> {
    let owner = Principal::new(raw)?;
    let id = state.read(|reg| reg.query().identity_of(&owner));
    Ok(Json(OwnerResponse { owner, id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_identity_serializes_as_null() {
        let body = IdentityResponse {
            identity: None,
            status: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "identity": null })
        );
    }
}

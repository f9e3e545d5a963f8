//! Admin bearer-token authentication.
//!
//! Identity management (Cognito or similar) fronts the deployed API; this
//! layer only gates the privileged endpoints behind a single service token,
//! compared in constant time. When no token is configured, every privileged
//! request is rejected.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use jobtrack_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Extractor for privileged endpoints: rejects with 401 unless a valid admin
/// bearer token is present.
#[derive(Debug)]
pub struct Admin;

/// Extractor for endpoints whose response varies by privilege: never rejects,
/// reports whether a valid admin token was presented.
pub struct MaybeAdmin(pub bool);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn is_authorized(parts: &Parts, state: &AppState) -> bool {
    let Some(expected) = state.config.admin_api_token.as_deref() else {
        return false;
    };
    let Some(provided) = bearer_token(parts) else {
        return false;
    };
    // Slice ct_eq already returns false for length mismatches without
    // short-circuiting on content.
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.config.admin_api_token.is_none() {
            return Err(HttpAppError(AppError::Unauthorized(
                "Admin access is not configured".to_string(),
            )));
        }
        if is_authorized(parts, state) {
            Ok(Admin)
        } else {
            Err(HttpAppError(AppError::Unauthorized(
                "Missing or invalid admin token".to_string(),
            )))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeAdmin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAdmin(is_authorized(parts, state)))
    }
}

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use super::auth::authenticate;
use crate::config::AdminGate;
use crate::database::models::{Role, User};
use crate::error::{ApiError, ADMINS_ONLY, TOKEN_INVALID};
use crate::state::AppState;

/// Admin-only routes. The configured `AdminGate` decides how the caller
/// proves the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request = match state.config.security.admin_gate {
        AdminGate::StoredRole => validate_stored_role(&state, request).await?,
        AdminGate::BodyRole => validate_body_role(&state, request).await?,
    };
    Ok(next.run(request).await)
}

/// Verified token, then the role on the user's current record.
async fn validate_stored_role(state: &AppState, mut request: Request) -> Result<Request, ApiError> {
    let auth_user = authenticate(state, request.headers())?;

    let user = state
        .repository::<User>()
        .select_one(auth_user.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token names user {} which no longer exists", auth_user.id);
            ApiError::unauthorized(TOKEN_INVALID)
        })?;

    if user.data.role != Role::Admin {
        tracing::warn!("User {} with role '{}' denied admin route", user.id, user.data.role.as_str());
        return Err(ApiError::forbidden(ADMINS_ONLY));
    }

    tracing::debug!("Admin {} validated", user.id);
    request.extensions_mut().insert(auth_user);
    Ok(request)
}

/// Legacy gate: the request body itself claims `"role": "admin"`. The body
/// is buffered and handed on unchanged.
async fn validate_body_role(state: &AppState, request: Request) -> Result<Request, ApiError> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, state.config.api.max_request_size_bytes)
        .await
        .map_err(|_| ApiError::bad_request("Request body too large"))?;

    let claimed_role = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|body| body.get("role").and_then(Value::as_str).map(str::to_owned));

    if claimed_role.as_deref() != Some(Role::Admin.as_str()) {
        return Err(ApiError::forbidden(ADMINS_ONLY));
    }
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

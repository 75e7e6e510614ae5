use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::{ApiError, TOKEN_MISSING};
use crate::state::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated user context extracted from the token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

/// Rejects requests without a valid token and makes the caller available
/// to handlers as an `AuthUser` extension.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_token(headers)?;
    let claims = state.tokens.verify(token)?;
    Ok(AuthUser::from(claims))
}

/// Token from the `x-auth-token` header
pub fn extract_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let token = headers
        .get(TOKEN_HEADER)
        .ok_or_else(|| ApiError::unauthorized(TOKEN_MISSING))?
        .to_str()
        .map_err(|_| ApiError::unauthorized(TOKEN_MISSING))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::unauthorized(TOKEN_MISSING));
    }
    Ok(token)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(TOKEN_MISSING))
    }
}

// handlers/public/auth/login.rs - POST /api/users/login

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::database::models::{normalize_email, User};
use crate::database::record::{non_blank, RecordError};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
}

/// Exchanges email and password for a 24 hour token. Unknown emails and
/// wrong passwords get the same answer.
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = non_blank(input.email).map(|e| normalize_email(&e));
    let password = input.password.filter(|p| !p.is_empty());
    let present = [("email", email.is_some()), ("password", password.is_some())];
    let (Some(email), Some(password)) = (email, password) else {
        return Err(RecordError::missing(&present).into());
    };

    let user = state
        .repository::<User>()
        .select_any(&Filter::by("email", email.clone()))
        .await?
        .into_iter()
        .next();

    let Some(user) = user else {
        warn!("Login for unknown email {}", email);
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.data.password_hash.clone()).await? {
        warn!("Wrong password for user {}", user.id);
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(user.id, user.data.role)?;
    info!("User {} logged in", user.id);
    Ok(ApiResponse::success(LoginResponse {
        message: "Login successful",
        token,
    }))
}

// handlers/public/auth/register.rs - POST /api/users/register

use axum::extract::State;
use tracing::info;

use crate::api::UserView;
use crate::auth::password::hash_password;
use crate::database::models::{NewUser, User};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub const USER_EXISTS: &str = "User already exists.";

/// Creates an account. The password is stored only as a bcrypt hash and
/// the response never carries it.
pub async fn register_post(State(state): State<AppState>, JsonBody(input): JsonBody<NewUser>) -> ApiResult<UserView> {
    let registration = input.validate()?;
    let users = state.repository::<User>();

    // Checked before hashing so a duplicate costs no bcrypt round
    if users.count(&Filter::by("email", registration.email.clone())).await? > 0 {
        return Err(ApiError::conflict(USER_EXISTS));
    }

    let password = registration.password.clone();
    let hash = hash_password(password).await?;
    let record = users.create(registration.into_user(hash)).await?;

    info!("Registered user {} as {}", record.id, record.data.role.as_str());
    Ok(ApiResponse::created(UserView::from(record)))
}

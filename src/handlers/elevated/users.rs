// handlers/elevated/users.rs - Admin user management

use axum::extract::{Path, State};

use crate::api::UserView;
use crate::database::models::User;
use crate::handlers::data::delete_record;
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::state::AppState;

/// GET /api/users
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<UserView>> {
    let records = state.repository::<User>().select_all().await?;
    Ok(ApiResponse::success(records.into_iter().map(UserView::from).collect()))
}

/// DELETE /api/users/:id
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<User>(&state, &id).await
}

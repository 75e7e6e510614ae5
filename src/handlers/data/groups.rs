// handlers/data/groups.rs - /api/groups handlers

use axum::extract::{Path, State};

use super::{create_record, delete_record, find_record, single, update_record};
use crate::api::GroupView;
use crate::database::models::{Group, GroupPatch, NewGroup};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// POST /api/groups
pub async fn group_create(State(state): State<AppState>, JsonBody(draft): JsonBody<NewGroup>) -> ApiResult<GroupView> {
    let record = create_record(&state, draft).await?;
    let view = single(state.populator().groups(vec![record]).await?)?;
    Ok(ApiResponse::created(view))
}

/// GET /api/groups
pub async fn group_list(State(state): State<AppState>) -> ApiResult<Vec<GroupView>> {
    let records = state.repository::<Group>().select_all().await?;
    Ok(ApiResponse::success(state.populator().groups(records).await?))
}

/// GET /api/groups/:id
pub async fn group_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<GroupView> {
    let record = find_record::<Group>(&state, &id).await?;
    Ok(ApiResponse::success(single(state.populator().groups(vec![record]).await?)?))
}

/// PUT /api/groups/:id
pub async fn group_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<GroupPatch>,
) -> ApiResult<GroupView> {
    let record = update_record::<Group>(&state, &id, patch).await?;
    Ok(ApiResponse::success(single(state.populator().groups(vec![record]).await?)?))
}

/// DELETE /api/groups/:id
pub async fn group_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<Group>(&state, &id).await
}

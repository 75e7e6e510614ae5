// handlers/data/children.rs - /api/children handlers

use axum::extract::{Path, State};

use super::{create_record, delete_record, find_record, single, update_record};
use crate::api::ChildView;
use crate::database::models::{Child, ChildPatch, NewChild};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// POST /api/children
pub async fn child_create(State(state): State<AppState>, JsonBody(draft): JsonBody<NewChild>) -> ApiResult<ChildView> {
    let record = create_record(&state, draft).await?;
    let view = single(state.populator().children(vec![record]).await?)?;
    Ok(ApiResponse::created(view))
}

/// GET /api/children
pub async fn child_list(State(state): State<AppState>) -> ApiResult<Vec<ChildView>> {
    let records = state.repository::<Child>().select_all().await?;
    Ok(ApiResponse::success(state.populator().children(records).await?))
}

/// GET /api/children/:id
pub async fn child_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ChildView> {
    let record = find_record::<Child>(&state, &id).await?;
    Ok(ApiResponse::success(single(state.populator().children(vec![record]).await?)?))
}

/// PUT /api/children/:id
pub async fn child_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ChildPatch>,
) -> ApiResult<ChildView> {
    let record = update_record::<Child>(&state, &id, patch).await?;
    Ok(ApiResponse::success(single(state.populator().children(vec![record]).await?)?))
}

/// DELETE /api/children/:id
pub async fn child_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<Child>(&state, &id).await
}

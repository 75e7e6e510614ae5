// handlers/data/programs.rs - /api/programs handlers

use axum::extract::{Path, State};

use super::{create_record, delete_record, find_record, single, update_record};
use crate::api::ProgramView;
use crate::database::models::{NewProgram, Program, ProgramPatch};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// POST /api/programs
pub async fn program_create(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<NewProgram>,
) -> ApiResult<ProgramView> {
    let record = create_record(&state, draft).await?;
    let view = single(state.populator().programs(vec![record]).await?)?;
    Ok(ApiResponse::created(view))
}

/// GET /api/programs
pub async fn program_list(State(state): State<AppState>) -> ApiResult<Vec<ProgramView>> {
    let records = state.repository::<Program>().select_all().await?;
    Ok(ApiResponse::success(state.populator().programs(records).await?))
}

/// GET /api/programs/:id
pub async fn program_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProgramView> {
    let record = find_record::<Program>(&state, &id).await?;
    Ok(ApiResponse::success(single(state.populator().programs(vec![record]).await?)?))
}

/// PUT /api/programs/:id
pub async fn program_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ProgramPatch>,
) -> ApiResult<ProgramView> {
    let record = update_record::<Program>(&state, &id, patch).await?;
    Ok(ApiResponse::success(single(state.populator().programs(vec![record]).await?)?))
}

/// DELETE /api/programs/:id
pub async fn program_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<Program>(&state, &id).await
}

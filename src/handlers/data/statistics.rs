// handlers/data/statistics.rs - GET /api/statistics handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::statistics::{self, Statistics};
use crate::state::AppState;

pub async fn statistics_get(State(state): State<AppState>) -> ApiResult<Statistics> {
    Ok(ApiResponse::success(statistics::collect(state.store.as_ref()).await?))
}

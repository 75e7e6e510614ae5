// handlers/data/payments.rs - /api/payments handlers

use axum::extract::{Path, State};

use super::{create_record, delete_record, find_record, single, update_record};
use crate::api::PaymentView;
use crate::database::models::{NewPayment, Payment, PaymentPatch};
use crate::database::record::{dates, parse_id};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// POST /api/payments
pub async fn payment_create(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<NewPayment>,
) -> ApiResult<PaymentView> {
    let record = create_record(&state, draft).await?;
    let view = single(state.populator().payments(vec![record]).await?)?;
    Ok(ApiResponse::created(view))
}

/// GET /api/payments
pub async fn payment_list(State(state): State<AppState>) -> ApiResult<Vec<PaymentView>> {
    let records = state.repository::<Payment>().select_all().await?;
    Ok(ApiResponse::success(state.populator().payments(records).await?))
}

/// GET /api/payments/child/:childId
pub async fn payment_by_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> ApiResult<Vec<PaymentView>> {
    let child_id = parse_id(&child_id)?;
    let records = state
        .repository::<Payment>()
        .select_any(&Filter::by("childId", child_id.to_string()))
        .await?;
    Ok(ApiResponse::success(state.populator().payments(records).await?))
}

/// GET /api/payments/date/:date - every payment on that UTC calendar day
pub async fn payment_by_date(State(state): State<AppState>, Path(date): Path<String>) -> ApiResult<Vec<PaymentView>> {
    let (start, end) = dates::day_bounds(&date)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid date '{}'", date)))?;
    let records = state
        .repository::<Payment>()
        .select_any(&Filter::new().within("date", start, end))
        .await?;
    Ok(ApiResponse::success(state.populator().payments(records).await?))
}

/// GET /api/payments/:id
pub async fn payment_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PaymentView> {
    let record = find_record::<Payment>(&state, &id).await?;
    Ok(ApiResponse::success(single(state.populator().payments(vec![record]).await?)?))
}

/// PUT /api/payments/:id
pub async fn payment_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PaymentPatch>,
) -> ApiResult<PaymentView> {
    let record = update_record::<Payment>(&state, &id, patch).await?;
    Ok(ApiResponse::success(single(state.populator().payments(vec![record]).await?)?))
}

/// DELETE /api/payments/:id
pub async fn payment_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    delete_record::<Payment>(&state, &id).await
}

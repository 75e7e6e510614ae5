// handlers/data/mod.rs - Shared CRUD helpers for the record handlers

use tracing::info;

use crate::database::models::{Draft, Entity, Patchable};
use crate::database::record::parse_id;
use crate::database::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::state::AppState;

pub mod attendance;
pub mod children;
pub mod groups;
pub mod payments;
pub mod programs;
pub mod statistics;

/// Validates the draft and stores it with reference and uniqueness checks.
pub(crate) async fn create_record<D: Draft>(state: &AppState, draft: D) -> Result<Record<D::Entity>, ApiError> {
    let entity = draft.validate()?;
    let record = state.repository::<D::Entity>().create(entity).await?;
    info!("Created {} {}", D::Entity::LABEL, record.id);
    Ok(record)
}

pub(crate) async fn find_record<T: Entity>(state: &AppState, id: &str) -> Result<Record<T>, ApiError> {
    let id = parse_id(id)?;
    Ok(state.repository::<T>().select_404(id).await?)
}

/// Applies only the supplied fields, then re-validates the whole record.
/// References the patch leaves alone are not looked up again.
pub(crate) async fn update_record<T: Patchable>(
    state: &AppState,
    id: &str,
    patch: T::Patch,
) -> Result<Record<T>, ApiError> {
    let id = parse_id(id)?;
    let repository = state.repository::<T>();
    let mut current = repository.select_404(id).await?;
    let previous = current.data.clone();
    current.data.apply(patch)?;
    let record = repository.replace_404(id, &previous, current.data).await?;
    info!("Updated {} {}", T::LABEL, record.id);
    Ok(record)
}

pub(crate) async fn delete_record<T: Entity>(state: &AppState, id: &str) -> ApiResult<Message> {
    let id = parse_id(id)?;
    state.repository::<T>().delete_404(id, &state.policies).await?;
    info!("Deleted {} {}", T::LABEL, id);
    Ok(ApiResponse::message(format!("{} deleted successfully", T::LABEL)))
}

/// The single view produced for a single record.
pub(crate) fn single<V>(views: Vec<V>) -> Result<V, ApiError> {
    views
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::internal_server_error(crate::error::SERVER_ERROR))
}

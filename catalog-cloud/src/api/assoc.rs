use axum::{
    Json,
    extract::{Query, State},
};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{AssocEntry, AssocKey, AssocMapping};

use super::ApiResult;
use crate::auth::Identity;
use crate::state::AppState;

pub async fn get_associations(State(state): State<AppState>) -> ApiResult<Vec<AssocEntry>> {
    let entries = state
        .service
        .get_associations(&state.op_context())
        .await?;
    Ok(Json(entries))
}

pub async fn publish_associations(
    State(state): State<AppState>,
    identity: Identity,
    Json(mapping): Json<AssocMapping>,
) -> ApiResult<serde_json::Value> {
    tracing::info!(subject = %identity.subject, paths = mapping.len(), "Publishing associations");
    let rows = state
        .service
        .publish_associations(&state.op_context(), &mapping)
        .await?;
    Ok(Json(serde_json::json!({ "rows": rows })))
}

pub async fn batch_update_associations(
    State(state): State<AppState>,
    identity: Identity,
    Json(entries): Json<Vec<AssocEntry>>,
) -> ApiResult<Vec<AssocEntry>> {
    tracing::info!(subject = %identity.subject, rows = entries.len(), "Batch-updating associations");
    let stored = state
        .service
        .batch_update_associations(&state.op_context(), entries)
        .await?;
    Ok(Json(stored))
}

pub async fn purge_associations(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<StatusCode, AppError> {
    tracing::info!(subject = %identity.subject, "Purging associations");
    state
        .service
        .purge_associations(&state.op_context())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_association(
    State(state): State<AppState>,
    identity: Identity,
    Json(key): Json<AssocKey>,
) -> ApiResult<AssocEntry> {
    tracing::info!(subject = %identity.subject, path = %key.path, sku = %key.sku, "Creating association");
    let entry = state
        .service
        .create_association(&state.op_context(), &key.path, &key.sku)
        .await?;
    Ok(Json(entry))
}

pub async fn delete_association(
    State(state): State<AppState>,
    identity: Identity,
    Query(key): Query<AssocKey>,
) -> Result<StatusCode, AppError> {
    tracing::info!(subject = %identity.subject, path = %key.path, sku = %key.sku, "Deleting association");
    state
        .service
        .delete_association(&state.op_context(), &key.path, &key.sku)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{CatalogNodeInput, CatalogNodeView, CategoryProduct, NestedSetEntry};

use super::ApiResult;
use crate::auth::Identity;
use crate::state::AppState;

pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<CatalogNodeView> {
    let tree = state.service.get_catalog(&state.op_context()).await?;
    Ok(Json(tree))
}

pub async fn publish_catalog(
    State(state): State<AppState>,
    identity: Identity,
    Json(input): Json<CatalogNodeInput>,
) -> ApiResult<CatalogNodeView> {
    tracing::info!(subject = %identity.subject, root = %input.segment, "Publishing catalog");
    let tree = state
        .service
        .publish_catalog(&state.op_context(), &input)
        .await?;
    Ok(Json(tree))
}

pub async fn purge_catalog(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<StatusCode, AppError> {
    tracing::info!(subject = %identity.subject, "Purging catalog");
    state.service.purge_catalog(&state.op_context()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_subtree(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<CatalogNodeView> {
    let tree = state
        .service
        .get_subtree(&state.op_context(), &path)
        .await?;
    Ok(Json(tree))
}

pub async fn get_breadcrumbs(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Vec<NestedSetEntry>> {
    let chain = state
        .service
        .get_breadcrumbs(&state.op_context(), &path)
        .await?;
    Ok(Json(chain))
}

pub async fn list_category_products(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Vec<CategoryProduct>> {
    let products = state
        .service
        .list_category_products(&state.op_context(), &path)
        .await?;
    Ok(Json(products))
}

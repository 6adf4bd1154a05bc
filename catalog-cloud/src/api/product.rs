use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{Product, ProductUpsert};

use super::ApiResult;
use crate::auth::Identity;
use crate::state::AppState;

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.service.list_products(&state.op_context()).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> ApiResult<Product> {
    let product = state
        .service
        .get_product(&state.op_context(), &sku)
        .await?;
    Ok(Json(product))
}

pub async fn upsert_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(sku): Path<String>,
    Json(data): Json<ProductUpsert>,
) -> ApiResult<Product> {
    tracing::info!(subject = %identity.subject, sku = %sku, "Upserting product");
    let product = state
        .service
        .upsert_product(&state.op_context(), &sku, &data)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(sku): Path<String>,
) -> Result<StatusCode, AppError> {
    tracing::info!(subject = %identity.subject, sku = %sku, "Deleting product");
    state
        .service
        .delete_product(&state.op_context(), &sku)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! API routes for catalog-cloud
//!
//! Reads are public. Writes require a bearer token (see [`crate::auth`]).

pub mod assoc;
pub mod catalog;
pub mod health;
pub mod product;

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use shared::error::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        .route(
            "/catalog",
            get(catalog::get_catalog)
                .put(catalog::publish_catalog)
                .delete(catalog::purge_catalog),
        )
        .route("/catalog/nodes/{*path}", get(catalog::get_subtree))
        .route("/catalog/breadcrumbs/{*path}", get(catalog::get_breadcrumbs))
        .route(
            "/catalog/products/{*path}",
            get(catalog::list_category_products),
        );

    let assocs = Router::new()
        .route(
            "/assocs",
            get(assoc::get_associations)
                .put(assoc::publish_associations)
                .patch(assoc::batch_update_associations)
                .delete(assoc::purge_associations),
        )
        .route(
            "/assocs/entry",
            post(assoc::create_association).delete(assoc::delete_association),
        );

    let products = Router::new()
        .route("/products", get(product::list_products))
        .route(
            "/products/{sku}",
            get(product::get_product)
                .put(product::upsert_product)
                .delete(product::delete_product),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(catalog)
        .merge(assocs)
        .merge(products)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

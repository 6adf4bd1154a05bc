//! Catalog service
//!
//! Orchestrates validation, nested-set encoding and the storage ports.
//! Every method takes an [`OpContext`]; each store call runs under it.

mod assoc;
mod catalog;
pub mod context;
mod product;

use std::sync::Arc;

use crate::db::{AssocStore, CatalogStore, ProductStore};

pub use context::OpContext;

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    assocs: Arc<dyn AssocStore>,
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        assocs: Arc<dyn AssocStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            catalog,
            assocs,
            products,
        }
    }

    /// Use one adapter for every port
    pub fn from_store<S>(store: S) -> Self
    where
        S: CatalogStore + AssocStore + ProductStore + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store)
    }
}

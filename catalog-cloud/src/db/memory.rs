//! In-process adapter
//!
//! Holds the whole dataset behind one mutex. Every write works on a copy of
//! the state and swaps it in only after all rows check out, so a failed write
//! leaves the previous state untouched. The lock is never held across an
//! await point.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{
    AssocEntry, AssocMapping, AssocRecord, CatalogRecord, CategoryProduct, NestedSetEntry,
    PRI_STEP, Product, ProductUpsert,
};
use uuid::Uuid;

use super::{AssocStore, CatalogStore, ProductStore, StoreError, StoreResult};

#[derive(Debug, Default, Clone)]
struct State {
    /// Ordered by `lft`
    catalog: Vec<CatalogRecord>,
    /// Ordered by `(path, pri)`
    assocs: Vec<AssocRecord>,
    products: BTreeMap<String, Product>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn node(&self, path: &str) -> Option<&CatalogRecord> {
        self.catalog.iter().find(|c| c.entry.path == path)
    }

    fn leaf(&self, path: &str) -> StoreResult<&CatalogRecord> {
        self.node(path)
            .filter(|c| c.entry.is_leaf())
            .ok_or_else(|| StoreError::NotFound(format!("leaf category '{path}'")))
    }

    fn product(&self, sku: &str) -> StoreResult<&Product> {
        self.products
            .get(sku)
            .ok_or_else(|| StoreError::NotFound(format!("product '{sku}'")))
    }

    fn sort_assocs(&mut self) {
        self.assocs
            .sort_by(|a, b| a.path.cmp(&b.path).then(a.pri.cmp(&b.pri)));
    }

    /// Resolve `(path, sku, pri)` triples into rows, rejecting unknown leaves,
    /// unknown SKUs and repeated pairs.
    fn build_assocs<'a>(
        &mut self,
        rows: impl IntoIterator<Item = (&'a str, &'a str, i32)>,
    ) -> StoreResult<Vec<AssocRecord>> {
        let now = shared::util::now_millis();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (path, sku, pri) in rows {
            if !seen.insert((path, sku)) {
                return Err(StoreError::Conflict(format!(
                    "duplicate association '{path}' / '{sku}'"
                )));
            }
            let catalog_id = self.leaf(path)?.id;
            let product_id = self.product(sku)?.id;
            out.push(AssocRecord {
                id: self.next_id(),
                catalog_id,
                product_id,
                path: path.to_string(),
                sku: sku.to_string(),
                pri,
                created_at: now,
                updated_at: now,
            });
        }
        Ok(out)
    }
}

/// Mutex-guarded in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every write by `latency` before it touches the state
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Apply `f` to a copy of the state; commit the copy only on success
    fn write<T>(&self, f: impl FnOnce(&mut State) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.state.lock();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn has_catalog(&self) -> StoreResult<bool> {
        Ok(!self.state.lock().catalog.is_empty())
    }

    async fn get_catalog(&self) -> StoreResult<Vec<CatalogRecord>> {
        Ok(self.state.lock().catalog.clone())
    }

    async fn get_by_path(&self, path: &str) -> StoreResult<Option<CatalogRecord>> {
        Ok(self.state.lock().node(path).cloned())
    }

    async fn get_subtree(&self, path: &str) -> StoreResult<Vec<CatalogRecord>> {
        let state = self.state.lock();
        let Some(n) = state.node(path) else {
            return Ok(Vec::new());
        };
        let (lft, rgt) = (n.entry.lft, n.entry.rgt);
        Ok(state
            .catalog
            .iter()
            .filter(|c| c.entry.lft >= lft && c.entry.lft <= rgt)
            .cloned()
            .collect())
    }

    async fn get_ancestors(&self, path: &str) -> StoreResult<Vec<CatalogRecord>> {
        let state = self.state.lock();
        let Some(n) = state.node(path) else {
            return Ok(Vec::new());
        };
        Ok(state
            .catalog
            .iter()
            .filter(|c| c.entry.is_ancestor_of(&n.entry))
            .cloned()
            .collect())
    }

    async fn replace_catalog(&self, listing: &[NestedSetEntry]) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            let now = shared::util::now_millis();
            let mut paths = HashSet::new();
            let mut catalog = Vec::with_capacity(listing.len());
            for entry in listing {
                if !paths.insert(entry.path.as_str()) {
                    return Err(StoreError::Conflict(format!(
                        "duplicate category path '{}'",
                        entry.path
                    )));
                }
                catalog.push(CatalogRecord {
                    id: state.next_id(),
                    uuid: Uuid::new_v4(),
                    entry: entry.clone(),
                    created_at: now,
                    updated_at: now,
                });
            }
            catalog.sort_by_key(|c| c.entry.lft);
            state.catalog = catalog;

            let mut relinked = Vec::with_capacity(state.assocs.len());
            for assoc in &state.assocs {
                let Some(node) = state.node(&assoc.path) else {
                    return Err(StoreError::InUse(format!(
                        "category '{}' still has associations",
                        assoc.path
                    )));
                };
                if !node.entry.is_leaf() {
                    return Err(StoreError::InUse(format!(
                        "category '{}' has associations and is no longer a leaf",
                        assoc.path
                    )));
                }
                relinked.push(AssocRecord {
                    catalog_id: node.id,
                    ..assoc.clone()
                });
            }
            state.assocs = relinked;
            Ok(())
        })
    }

    async fn purge_catalog(&self) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            if !state.assocs.is_empty() {
                return Err(StoreError::InUse(
                    "associations reference catalog categories".to_string(),
                ));
            }
            state.catalog.clear();
            Ok(())
        })
    }
}

#[async_trait]
impl AssocStore for MemoryStore {
    async fn has_assocs(&self) -> StoreResult<bool> {
        Ok(!self.state.lock().assocs.is_empty())
    }

    async fn get_assocs(&self) -> StoreResult<Vec<AssocRecord>> {
        Ok(self.state.lock().assocs.clone())
    }

    async fn associated_paths(&self) -> StoreResult<Vec<String>> {
        let state = self.state.lock();
        let mut paths: Vec<String> = state.assocs.iter().map(|a| a.path.clone()).collect();
        paths.dedup();
        Ok(paths)
    }

    async fn create_assoc(&self, path: &str, sku: &str) -> StoreResult<AssocRecord> {
        self.delay().await;
        self.write(|state| {
            if let Some(existing) = state.assocs.iter().find(|a| a.path == path && a.sku == sku) {
                return Ok(existing.clone());
            }
            let pri = state
                .assocs
                .iter()
                .filter(|a| a.path == path)
                .map(|a| a.pri)
                .max()
                .unwrap_or(0)
                + PRI_STEP;
            let mut rows = state.build_assocs([(path, sku, pri)])?;
            let record = rows.remove(0);
            state.assocs.push(record.clone());
            state.sort_assocs();
            Ok(record)
        })
    }

    async fn delete_assoc(&self, path: &str, sku: &str) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            state.assocs.retain(|a| !(a.path == path && a.sku == sku));
            Ok(())
        })
    }

    async fn replace_assocs(&self, mapping: &AssocMapping) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            let rows = mapping.iter().flat_map(|(path, skus)| {
                skus.iter()
                    .enumerate()
                    .map(move |(i, sku)| (path.as_str(), sku.as_str(), (i as i32 + 1) * PRI_STEP))
            });
            state.assocs = state.build_assocs(rows)?;
            state.sort_assocs();
            Ok(())
        })
    }

    async fn batch_update_assocs(&self, entries: &[AssocEntry]) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            let rows = entries
                .iter()
                .map(|e| (e.path.as_str(), e.sku.as_str(), e.pri));
            state.assocs = state.build_assocs(rows)?;
            state.sort_assocs();
            Ok(())
        })
    }

    async fn purge_assocs(&self) -> StoreResult<()> {
        self.delay().await;
        self.write(|state| {
            state.assocs.clear();
            Ok(())
        })
    }

    async fn products_in_subtree(&self, path: &str) -> StoreResult<Vec<CategoryProduct>> {
        let state = self.state.lock();
        let Some(n) = state.node(path) else {
            return Ok(Vec::new());
        };
        let (lft, rgt) = (n.entry.lft, n.entry.rgt);

        let mut out = Vec::new();
        for node in state
            .catalog
            .iter()
            .filter(|c| c.entry.lft >= lft && c.entry.lft <= rgt)
        {
            for assoc in state.assocs.iter().filter(|a| a.path == node.entry.path) {
                let name = state
                    .products
                    .get(&assoc.sku)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                out.push(CategoryProduct {
                    path: assoc.path.clone(),
                    sku: assoc.sku.clone(),
                    name,
                    pri: assoc.pri,
                });
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.state.lock().products.values().cloned().collect())
    }

    async fn get_product(&self, sku: &str) -> StoreResult<Option<Product>> {
        Ok(self.state.lock().products.get(sku).cloned())
    }

    async fn upsert_product(&self, sku: &str, data: &ProductUpsert) -> StoreResult<Product> {
        self.delay().await;
        self.write(|state| {
            let now = shared::util::now_millis();
            let product = match state.products.get(sku) {
                Some(existing) => Product {
                    name: data.name.clone(),
                    updated_at: now,
                    ..existing.clone()
                },
                None => Product {
                    id: state.next_id(),
                    sku: sku.to_string(),
                    name: data.name.clone(),
                    created_at: now,
                    updated_at: now,
                },
            };
            state.products.insert(sku.to_string(), product.clone());
            Ok(product)
        })
    }

    async fn delete_product(&self, sku: &str) -> StoreResult<bool> {
        self.delay().await;
        self.write(|state| {
            if state.assocs.iter().any(|a| a.sku == sku) {
                return Err(StoreError::InUse(format!(
                    "product '{sku}' is associated with categories"
                )));
            }
            Ok(state.products.remove(sku).is_some())
        })
    }

    async fn missing_skus(&self, skus: &[String]) -> StoreResult<Vec<String>> {
        let state = self.state.lock();
        Ok(skus
            .iter()
            .filter(|s| !state.products.contains_key(s.as_str()))
            .cloned()
            .collect())
    }
}

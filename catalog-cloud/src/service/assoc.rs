use std::collections::{BTreeSet, HashSet};

use shared::models::{AssocEntry, AssocMapping, CatalogRecord};

use super::{CatalogService, OpContext};
use crate::error::{CatalogError, CatalogResult};

impl CatalogService {
    async fn require_leaf(&self, ctx: &OpContext, path: &str) -> CatalogResult<CatalogRecord> {
        let node = ctx
            .run("get_by_path", self.catalog.get_by_path(path))
            .await?
            .ok_or_else(|| CatalogError::CategoryNotFound(path.to_string()))?;
        if !node.entry.is_leaf() {
            return Err(CatalogError::NotLeaf(path.to_string()));
        }
        Ok(node)
    }

    async fn require_skus<'a>(
        &self,
        ctx: &OpContext,
        skus: impl IntoIterator<Item = &'a str>,
    ) -> CatalogResult<()> {
        // Deduplicated, deterministic order for the error message
        let skus: Vec<String> = skus
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let missing = ctx
            .run("missing_skus", self.products.missing_skus(&skus))
            .await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::ProductNotFound(missing.join(", ")))
        }
    }

    /// Replace every association with `mapping`; array order sets `pri`.
    ///
    /// The first non-leaf or unknown path rejects the whole publish.
    pub async fn publish_associations(
        &self,
        ctx: &OpContext,
        mapping: &AssocMapping,
    ) -> CatalogResult<usize> {
        for (path, skus) in mapping {
            self.require_leaf(ctx, path).await?;
            let mut seen = HashSet::new();
            if let Some(dup) = skus.iter().find(|s| !seen.insert(s.as_str())) {
                return Err(CatalogError::Malformed(format!(
                    "sku '{dup}' listed twice under '{path}'"
                )));
            }
        }
        self.require_skus(ctx, mapping.values().flatten().map(String::as_str))
            .await?;

        ctx.run("replace_assocs", self.assocs.replace_assocs(mapping))
            .await?;

        let rows: usize = mapping.values().map(Vec::len).sum();
        tracing::info!(paths = mapping.len(), rows, "Associations published");
        Ok(rows)
    }

    /// All associations sorted by `(path, pri)`
    pub async fn get_associations(&self, ctx: &OpContext) -> CatalogResult<Vec<AssocEntry>> {
        let rows = ctx.run("get_assocs", self.assocs.get_assocs()).await?;
        Ok(rows.into_iter().map(AssocEntry::from).collect())
    }

    /// Append one product to a leaf; existing pairs are returned unchanged
    pub async fn create_association(
        &self,
        ctx: &OpContext,
        path: &str,
        sku: &str,
    ) -> CatalogResult<AssocEntry> {
        self.require_leaf(ctx, path).await?;
        self.require_skus(ctx, [sku]).await?;
        let record = ctx
            .run("create_assoc", self.assocs.create_assoc(path, sku))
            .await?;
        tracing::debug!(path, sku, pri = record.pri, "Association created");
        Ok(record.into())
    }

    pub async fn delete_association(
        &self,
        ctx: &OpContext,
        path: &str,
        sku: &str,
    ) -> CatalogResult<()> {
        ctx.run("delete_assoc", self.assocs.delete_assoc(path, sku))
            .await
    }

    /// Replace every association with explicit priorities.
    ///
    /// Returns the stored entries ordered by `(path, pri)`.
    pub async fn batch_update_associations(
        &self,
        ctx: &OpContext,
        mut entries: Vec<AssocEntry>,
    ) -> CatalogResult<Vec<AssocEntry>> {
        check_batch(&entries)?;

        let paths: BTreeSet<String> = entries.iter().map(|e| e.path.clone()).collect();
        for path in &paths {
            self.require_leaf(ctx, path).await?;
        }
        self.require_skus(ctx, entries.iter().map(|e| e.sku.as_str()))
            .await?;

        entries.sort_by(|a, b| a.path.cmp(&b.path).then(a.pri.cmp(&b.pri)));
        ctx.run(
            "batch_update_assocs",
            self.assocs.batch_update_assocs(&entries),
        )
        .await?;

        tracing::info!(rows = entries.len(), "Associations batch-updated");
        Ok(entries)
    }

    pub async fn purge_associations(&self, ctx: &OpContext) -> CatalogResult<()> {
        ctx.run("purge_assocs", self.assocs.purge_assocs()).await?;
        tracing::info!("Associations purged");
        Ok(())
    }
}

/// Positive priorities, unique `(path, sku)` and unique `(path, pri)`
fn check_batch(entries: &[AssocEntry]) -> CatalogResult<()> {
    let mut pairs = HashSet::new();
    let mut slots = HashSet::new();
    for e in entries {
        if e.pri <= 0 {
            return Err(CatalogError::Malformed(format!(
                "pri must be positive, got {} for '{}' / '{}'",
                e.pri, e.path, e.sku
            )));
        }
        if !pairs.insert((e.path.as_str(), e.sku.as_str())) {
            return Err(CatalogError::Malformed(format!(
                "association '{}' / '{}' listed twice",
                e.path, e.sku
            )));
        }
        if !slots.insert((e.path.as_str(), e.pri)) {
            return Err(CatalogError::Malformed(format!(
                "pri {} used twice under '{}'",
                e.pri, e.path
            )));
        }
    }
    Ok(())
}

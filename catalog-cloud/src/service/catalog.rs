use std::collections::HashMap;

use shared::models::{CatalogNodeInput, CatalogNodeView, CategoryProduct, NestedSetEntry};

use super::{CatalogService, OpContext};
use crate::catalog::{CategoryTree, build_subtree, build_tree, validate_tree};
use crate::error::{CatalogError, CatalogResult};

impl CatalogService {
    /// Validate, encode and replace the whole catalog.
    ///
    /// Fails with `CategoriesInUse` when an associated path would disappear or
    /// stop being a leaf.
    pub async fn publish_catalog(
        &self,
        ctx: &OpContext,
        input: &CatalogNodeInput,
    ) -> CatalogResult<CatalogNodeView> {
        validate_tree(input)?;

        let mut tree = CategoryTree::from_input(input);
        let listing = tree.encode();

        self.guard_republish(ctx, &listing).await?;
        ctx.run("replace_catalog", self.catalog.replace_catalog(&listing))
            .await?;

        tracing::info!(nodes = listing.len(), "Catalog published");
        Ok(tree.view(tree.root()))
    }

    async fn guard_republish(&self, ctx: &OpContext, listing: &[NestedSetEntry]) -> CatalogResult<()> {
        let paths = ctx
            .run("associated_paths", self.assocs.associated_paths())
            .await?;
        if paths.is_empty() {
            return Ok(());
        }

        let by_path: HashMap<&str, &NestedSetEntry> =
            listing.iter().map(|e| (e.path.as_str(), e)).collect();
        let offenders: Vec<&str> = paths
            .iter()
            .map(String::as_str)
            .filter(|p| !by_path.get(p).is_some_and(|e| e.is_leaf()))
            .collect();

        if offenders.is_empty() {
            Ok(())
        } else {
            tracing::warn!(?offenders, "Catalog publish would orphan associations");
            Err(CatalogError::CategoriesInUse(offenders.join(", ")))
        }
    }

    /// Whole tree; `CatalogNotFound` while nothing is published
    pub async fn get_catalog(&self, ctx: &OpContext) -> CatalogResult<CatalogNodeView> {
        let records = ctx.run("get_catalog", self.catalog.get_catalog()).await?;
        if records.is_empty() {
            return Err(CatalogError::CatalogNotFound);
        }
        let tree = build_tree(records.into_iter().map(|r| r.entry).collect())?;
        Ok(tree.view(tree.root()))
    }

    pub async fn purge_catalog(&self, ctx: &OpContext) -> CatalogResult<()> {
        if ctx.run("has_assocs", self.assocs.has_assocs()).await? {
            return Err(CatalogError::CategoriesInUse(
                "associations exist; purge them first".to_string(),
            ));
        }
        ctx.run("purge_catalog", self.catalog.purge_catalog()).await?;
        tracing::info!("Catalog purged");
        Ok(())
    }

    /// The category at `path` with its descendants
    pub async fn get_subtree(&self, ctx: &OpContext, path: &str) -> CatalogResult<CatalogNodeView> {
        let records = ctx.run("get_subtree", self.catalog.get_subtree(path)).await?;
        if records.is_empty() {
            return Err(CatalogError::CategoryNotFound(path.to_string()));
        }
        let tree = build_subtree(records.into_iter().map(|r| r.entry).collect())?;
        Ok(tree.view(tree.root()))
    }

    /// Root-first chain ending with the category at `path`
    pub async fn get_breadcrumbs(
        &self,
        ctx: &OpContext,
        path: &str,
    ) -> CatalogResult<Vec<NestedSetEntry>> {
        let node = ctx
            .run("get_by_path", self.catalog.get_by_path(path))
            .await?
            .ok_or_else(|| CatalogError::CategoryNotFound(path.to_string()))?;
        let mut chain: Vec<NestedSetEntry> = ctx
            .run("get_ancestors", self.catalog.get_ancestors(path))
            .await?
            .into_iter()
            .map(|r| r.entry)
            .collect();
        chain.push(node.entry);
        Ok(chain)
    }

    /// Products bound to any leaf under `path`
    pub async fn list_category_products(
        &self,
        ctx: &OpContext,
        path: &str,
    ) -> CatalogResult<Vec<CategoryProduct>> {
        if ctx
            .run("get_by_path", self.catalog.get_by_path(path))
            .await?
            .is_none()
        {
            return Err(CatalogError::CategoryNotFound(path.to_string()));
        }
        ctx.run("products_in_subtree", self.assocs.products_in_subtree(path))
            .await
    }
}

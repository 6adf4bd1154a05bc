use shared::models::{Product, ProductUpsert};

use super::{CatalogService, OpContext};
use crate::db::StoreError;
use crate::error::{CatalogError, CatalogResult};

impl CatalogService {
    pub async fn list_products(&self, ctx: &OpContext) -> CatalogResult<Vec<Product>> {
        ctx.run("list_products", self.products.list_products()).await
    }

    pub async fn get_product(&self, ctx: &OpContext, sku: &str) -> CatalogResult<Product> {
        ctx.run("get_product", self.products.get_product(sku))
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(sku.to_string()))
    }

    pub async fn upsert_product(
        &self,
        ctx: &OpContext,
        sku: &str,
        data: &ProductUpsert,
    ) -> CatalogResult<Product> {
        if sku.trim().is_empty() {
            return Err(CatalogError::Malformed("sku must not be empty".to_string()));
        }
        if data.name.trim().is_empty() {
            return Err(CatalogError::Malformed(format!(
                "product '{sku}' needs a name"
            )));
        }
        ctx.run("upsert_product", self.products.upsert_product(sku, data))
            .await
    }

    /// Fails with `ProductInUse` while the product sits in any category
    pub async fn delete_product(&self, ctx: &OpContext, sku: &str) -> CatalogResult<()> {
        match ctx
            .run("delete_product", self.products.delete_product(sku))
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(CatalogError::ProductNotFound(sku.to_string())),
            Err(CatalogError::Store {
                source: StoreError::InUse(_),
                ..
            }) => Err(CatalogError::ProductInUse(sku.to_string())),
            Err(e) => Err(e),
        }
    }
}

use std::collections::HashSet;

use async_trait::async_trait;
use shared::models::{Product, ProductUpsert};

use super::PgStore;
use crate::db::{ProductStore, StoreError, StoreResult};

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<Product> = sqlx::query_as(
            "SELECT id, sku, name, created_at, updated_at FROM products ORDER BY sku",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_product(&self, sku: &str) -> StoreResult<Option<Product>> {
        let row: Option<Product> = sqlx::query_as(
            "SELECT id, sku, name, created_at, updated_at FROM products WHERE sku = $1",
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_product(&self, sku: &str, data: &ProductUpsert) -> StoreResult<Product> {
        let now = shared::util::now_millis();
        let row: Product = sqlx::query_as(
            r#"
            INSERT INTO products (sku, name, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (sku) DO UPDATE
            SET name = EXCLUDED.name, updated_at = EXCLUDED.updated_at
            RETURNING id, sku, name, created_at, updated_at
            "#,
        )
        .bind(sku)
        .bind(&data.name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_product(&self, sku: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE sku = $1")
            .bind(sku)
            .execute(&self.pool)
            .await
            .map_err(|e| match StoreError::from(e) {
                StoreError::InUse(_) => {
                    StoreError::InUse(format!("product '{sku}' is associated with categories"))
                }
                other => other,
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn missing_skus(&self, skus: &[String]) -> StoreResult<Vec<String>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }
        let known: Vec<String> = sqlx::query_scalar("SELECT sku FROM products WHERE sku = ANY($1)")
            .bind(skus)
            .fetch_all(&self.pool)
            .await?;
        let known: HashSet<String> = known.into_iter().collect();
        Ok(skus.iter().filter(|s| !known.contains(*s)).cloned().collect())
    }
}

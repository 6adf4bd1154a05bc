//! Catalog-product association queries

use async_trait::async_trait;
use shared::models::{AssocEntry, AssocMapping, AssocRecord, CategoryProduct, PRI_STEP};
use sqlx::{Postgres, Transaction};

use super::PgStore;
use crate::db::{AssocStore, StoreError, StoreResult};

#[async_trait]
impl AssocStore for PgStore {
    async fn has_assocs(&self) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM catalog_products)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_assocs(&self) -> StoreResult<Vec<AssocRecord>> {
        let rows: Vec<AssocRecord> = sqlx::query_as(
            r#"
            SELECT id, catalog_id, product_id, path, sku, pri, created_at, updated_at
            FROM catalog_products
            ORDER BY path, pri
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn associated_paths(&self) -> StoreResult<Vec<String>> {
        let paths: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT path FROM catalog_products ORDER BY path")
                .fetch_all(&self.pool)
                .await?;
        Ok(paths)
    }

    async fn create_assoc(&self, path: &str, sku: &str) -> StoreResult<AssocRecord> {
        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;

        // Serialize priority allocation per path
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(path)
            .execute(&mut *tx)
            .await?;

        let existing: Option<AssocRecord> = sqlx::query_as(
            r#"
            SELECT id, catalog_id, product_id, path, sku, pri, created_at, updated_at
            FROM catalog_products
            WHERE path = $1 AND sku = $2
            "#,
        )
        .bind(path)
        .bind(sku)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(record) = existing {
            tx.commit().await?;
            return Ok(record);
        }

        let created: Option<AssocRecord> = sqlx::query_as(
            r#"
            INSERT INTO catalog_products (catalog_id, product_id, path, sku, pri, created_at, updated_at)
            SELECT c.id, p.id, c.path, p.sku,
                   COALESCE((SELECT MAX(pri) FROM catalog_products WHERE path = $1), 0) + $3,
                   $4, $4
            FROM catalog c, products p
            WHERE c.path = $1 AND c.rgt = c.lft + 1 AND p.sku = $2
            RETURNING id, catalog_id, product_id, path, sku, pri, created_at, updated_at
            "#,
        )
        .bind(path)
        .bind(sku)
        .bind(PRI_STEP)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = created else {
            return Err(StoreError::NotFound(format!(
                "leaf category '{path}' or product '{sku}'"
            )));
        };

        tx.commit().await?;
        Ok(record)
    }

    async fn delete_assoc(&self, path: &str, sku: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM catalog_products WHERE path = $1 AND sku = $2")
            .bind(path)
            .bind(sku)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_assocs(&self, mapping: &AssocMapping) -> StoreResult<()> {
        let mut paths = Vec::new();
        let mut skus = Vec::new();
        let mut pris = Vec::new();
        for (path, list) in mapping {
            for (i, sku) in list.iter().enumerate() {
                paths.push(path.as_str());
                skus.push(sku.as_str());
                pris.push((i as i32 + 1) * PRI_STEP);
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM catalog_products")
            .execute(&mut *tx)
            .await?;
        insert_rows(&mut tx, &paths, &skus, &pris).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn batch_update_assocs(&self, entries: &[AssocEntry]) -> StoreResult<()> {
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        let skus: Vec<&str> = entries.iter().map(|e| e.sku.as_str()).collect();
        let pris: Vec<i32> = entries.iter().map(|e| e.pri).collect();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM catalog_products")
            .execute(&mut *tx)
            .await?;
        insert_rows(&mut tx, &paths, &skus, &pris).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn purge_assocs(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM catalog_products")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn products_in_subtree(&self, path: &str) -> StoreResult<Vec<CategoryProduct>> {
        let rows: Vec<CategoryProduct> = sqlx::query_as(
            r#"
            SELECT cp.path, cp.sku, p.name, cp.pri
            FROM catalog n
            JOIN catalog c ON c.lft BETWEEN n.lft AND n.rgt
            JOIN catalog_products cp ON cp.path = c.path
            JOIN products p ON p.id = cp.product_id
            WHERE n.path = $1
            ORDER BY c.lft, cp.pri
            "#,
        )
        .bind(path)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Batch insert via UNNEST, resolving node and product ids by join.
///
/// Rows whose path is not a leaf or whose SKU is unknown drop out of the join;
/// a short insert count is reported as `NotFound` and the caller's transaction
/// rolls back on drop.
async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    paths: &[&str],
    skus: &[&str],
    pris: &[i32],
) -> StoreResult<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let now = shared::util::now_millis();

    let result = sqlx::query(
        r#"
        INSERT INTO catalog_products (catalog_id, product_id, path, sku, pri, created_at, updated_at)
        SELECT c.id, p.id, u.path, u.sku, u.pri, $4, $4
        FROM UNNEST($1::text[], $2::text[], $3::integer[])
             WITH ORDINALITY AS u(path, sku, pri, ord)
        JOIN catalog c ON c.path = u.path AND c.rgt = c.lft + 1
        JOIN products p ON p.sku = u.sku
        ORDER BY u.ord
        "#,
    )
    .bind(paths)
    .bind(skus)
    .bind(pris)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    let expected = paths.len() as u64;
    if result.rows_affected() != expected {
        return Err(StoreError::NotFound(format!(
            "{} of {} associations reference an unknown leaf or SKU",
            expected - result.rows_affected(),
            expected
        )));
    }
    Ok(())
}

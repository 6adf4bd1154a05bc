//! Catalog node queries

use async_trait::async_trait;
use shared::models::{CatalogRecord, NestedSetEntry};
use uuid::Uuid;

use super::PgStore;
use crate::db::{CatalogStore, StoreError, StoreResult};

#[async_trait]
impl CatalogStore for PgStore {
    async fn has_catalog(&self) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM catalog)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_catalog(&self) -> StoreResult<Vec<CatalogRecord>> {
        let rows: Vec<CatalogRecord> = sqlx::query_as(
            r#"
            SELECT id, uuid, segment, path, name, lft, rgt, depth, created_at, updated_at
            FROM catalog
            ORDER BY lft
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_path(&self, path: &str) -> StoreResult<Option<CatalogRecord>> {
        let row: Option<CatalogRecord> = sqlx::query_as(
            r#"
            SELECT id, uuid, segment, path, name, lft, rgt, depth, created_at, updated_at
            FROM catalog
            WHERE path = $1
            "#,
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_subtree(&self, path: &str) -> StoreResult<Vec<CatalogRecord>> {
        let rows: Vec<CatalogRecord> = sqlx::query_as(
            r#"
            SELECT c.id, c.uuid, c.segment, c.path, c.name, c.lft, c.rgt, c.depth,
                   c.created_at, c.updated_at
            FROM catalog n
            JOIN catalog c ON c.lft BETWEEN n.lft AND n.rgt
            WHERE n.path = $1
            ORDER BY c.lft
            "#,
        )
        .bind(path)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_ancestors(&self, path: &str) -> StoreResult<Vec<CatalogRecord>> {
        let rows: Vec<CatalogRecord> = sqlx::query_as(
            r#"
            SELECT c.id, c.uuid, c.segment, c.path, c.name, c.lft, c.rgt, c.depth,
                   c.created_at, c.updated_at
            FROM catalog n
            JOIN catalog c ON c.lft < n.lft AND c.rgt > n.rgt
            WHERE n.path = $1
            ORDER BY c.lft
            "#,
        )
        .bind(path)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn replace_catalog(&self, listing: &[NestedSetEntry]) -> StoreResult<()> {
        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;

        // Holds off concurrent association writes and other publishes until commit
        sqlx::query("LOCK TABLE catalog_products IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM catalog").execute(&mut *tx).await?;

        if !listing.is_empty() {
            let uuids: Vec<Uuid> = listing.iter().map(|_| Uuid::new_v4()).collect();
            let segments: Vec<&str> = listing.iter().map(|e| e.segment.as_str()).collect();
            let paths: Vec<&str> = listing.iter().map(|e| e.path.as_str()).collect();
            let names: Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
            let lfts: Vec<i32> = listing.iter().map(|e| e.lft).collect();
            let rgts: Vec<i32> = listing.iter().map(|e| e.rgt).collect();
            let depths: Vec<i32> = listing.iter().map(|e| e.depth).collect();

            sqlx::query(
                r#"
                INSERT INTO catalog (uuid, segment, path, name, lft, rgt, depth, created_at, updated_at)
                SELECT u.uuid, u.segment, u.path, u.name, u.lft, u.rgt, u.depth, $8, $8
                FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::text[],
                            $5::integer[], $6::integer[], $7::integer[])
                     WITH ORDINALITY AS u(uuid, segment, path, name, lft, rgt, depth, ord)
                ORDER BY u.ord
                "#,
            )
            .bind(&uuids)
            .bind(&segments)
            .bind(&paths)
            .bind(&names)
            .bind(&lfts)
            .bind(&rgts)
            .bind(&depths)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // Surviving associations follow their path to the new node ids
        sqlx::query(
            r#"
            UPDATE catalog_products cp
            SET catalog_id = c.id
            FROM catalog c
            WHERE c.path = cp.path
            "#,
        )
        .execute(&mut *tx)
        .await?;

        // Associations may only sit on leaves of the new tree
        let inner: Option<String> = sqlx::query_scalar(
            r#"
            SELECT cp.path
            FROM catalog_products cp
            JOIN catalog c ON c.path = cp.path
            WHERE c.rgt <> c.lft + 1
            ORDER BY cp.path
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(path) = inner {
            return Err(StoreError::InUse(format!(
                "category '{path}' has associations and is no longer a leaf"
            )));
        }

        // Deferred path references are checked here
        tx.commit().await?;
        Ok(())
    }

    async fn purge_catalog(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let in_use: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM catalog_products)")
            .fetch_one(&mut *tx)
            .await?;
        if in_use {
            return Err(StoreError::InUse(
                "associations reference catalog categories".to_string(),
            ));
        }

        sqlx::query("DELETE FROM catalog").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

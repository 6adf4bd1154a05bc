//! Shared fixtures for integration tests
#![allow(dead_code)]

use catalog_cloud::db::MemoryStore;
use catalog_cloud::{CatalogService, OpContext};
use shared::models::{CatalogNodeInput, ProductUpsert};

fn leaf(segment: &str) -> CatalogNodeInput {
    CatalogNodeInput::new(segment, segment.to_uppercase())
}

/// a(b(e), c(f(i, j(m, n)), g), d(h(k, l)))
pub fn sample_tree() -> CatalogNodeInput {
    CatalogNodeInput::new("a", "A")
        .with_child(CatalogNodeInput::new("b", "B").with_child(leaf("e")))
        .with_child(
            CatalogNodeInput::new("c", "C")
                .with_child(
                    CatalogNodeInput::new("f", "F")
                        .with_child(leaf("i"))
                        .with_child(
                            CatalogNodeInput::new("j", "J")
                                .with_child(leaf("m"))
                                .with_child(leaf("n")),
                        ),
                )
                .with_child(leaf("g")),
        )
        .with_child(
            CatalogNodeInput::new("d", "D").with_child(
                CatalogNodeInput::new("h", "H")
                    .with_child(leaf("k"))
                    .with_child(leaf("l")),
            ),
        )
}

/// Expected listing for [`sample_tree`]: (path, lft, rgt, depth)
pub const SAMPLE_LISTING: [(&str, i32, i32, i32); 14] = [
    ("a", 1, 28, 0),
    ("a/b", 2, 5, 1),
    ("a/b/e", 3, 4, 2),
    ("a/c", 6, 19, 1),
    ("a/c/f", 7, 16, 2),
    ("a/c/f/i", 8, 9, 3),
    ("a/c/f/j", 10, 15, 3),
    ("a/c/f/j/m", 11, 12, 4),
    ("a/c/f/j/n", 13, 14, 4),
    ("a/c/g", 17, 18, 2),
    ("a/d", 20, 27, 1),
    ("a/d/h", 21, 26, 2),
    ("a/d/h/k", 22, 23, 3),
    ("a/d/h/l", 24, 25, 3),
];

pub const SKUS: [&str; 5] = ["WATER", "SOIL", "SAND", "X", "Y"];

/// Service over `store` with the sample catalog published and [`SKUS`] known
pub async fn seeded_with(store: MemoryStore) -> CatalogService {
    let service = CatalogService::from_store(store);
    let ctx = OpContext::new();
    service
        .publish_catalog(&ctx, &sample_tree())
        .await
        .expect("publish sample catalog");
    for sku in SKUS {
        service
            .upsert_product(
                &ctx,
                sku,
                &ProductUpsert {
                    name: sku.to_lowercase(),
                },
            )
            .await
            .expect("seed product");
    }
    service
}

pub async fn seeded() -> CatalogService {
    seeded_with(MemoryStore::new()).await
}

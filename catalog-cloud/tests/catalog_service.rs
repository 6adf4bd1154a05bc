//! Catalog service scenarios against the in-memory store

mod common;

use std::time::Duration;

use catalog_cloud::db::{CatalogStore, MemoryStore};
use catalog_cloud::{CatalogError, ErrorKind, OpContext};
use common::{SAMPLE_LISTING, sample_tree, seeded, seeded_with};
use shared::models::{AssocEntry, AssocMapping, CatalogNodeInput, CatalogNodeView, NestedSetEntry};

fn flatten(view: &CatalogNodeView) -> Vec<(String, i32, i32, i32)> {
    let mut out = vec![(view.path.clone(), view.lft, view.rgt, view.depth)];
    for child in &view.nodes {
        out.extend(flatten(child));
    }
    out
}

fn expected_listing() -> Vec<(String, i32, i32, i32)> {
    SAMPLE_LISTING
        .iter()
        .map(|&(p, l, r, d)| (p.to_string(), l, r, d))
        .collect()
}

fn strip(view: &CatalogNodeView) -> CatalogNodeInput {
    CatalogNodeInput {
        segment: view.segment.clone(),
        name: view.name.clone(),
        nodes: view.nodes.iter().map(strip).collect(),
    }
}

fn entry(path: &str, sku: &str, pri: i32) -> AssocEntry {
    AssocEntry {
        path: path.to_string(),
        sku: sku.to_string(),
        pri,
    }
}

fn mapping(rows: &[(&str, &[&str])]) -> AssocMapping {
    rows.iter()
        .map(|(path, skus)| {
            (
                path.to_string(),
                skus.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

const M: &str = "a/c/f/j/m";
const N: &str = "a/c/f/j/n";

// ========== S1 / S2 ==========

#[tokio::test]
async fn test_publish_encodes_sample_tree() {
    let service = catalog_cloud::CatalogService::from_store(MemoryStore::new());
    let ctx = OpContext::new();

    let published = service.publish_catalog(&ctx, &sample_tree()).await.unwrap();
    assert_eq!(flatten(&published), expected_listing());

    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(fetched, published);
}

#[tokio::test]
async fn test_fetch_round_trips_structure() {
    let service = seeded().await;
    let ctx = OpContext::new();

    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(strip(&fetched), sample_tree());

    // Republishing the fetched shape reproduces the same listing
    let again = service.publish_catalog(&ctx, &strip(&fetched)).await.unwrap();
    assert_eq!(flatten(&again), expected_listing());
}

#[tokio::test]
async fn test_get_catalog_empty_is_not_found() {
    let service = catalog_cloud::CatalogService::from_store(MemoryStore::new());
    let err = service.get_catalog(&OpContext::new()).await.unwrap_err();
    assert!(matches!(err, CatalogError::CatalogNotFound));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_publish_implicit_root() {
    let service = catalog_cloud::CatalogService::from_store(MemoryStore::new());
    let ctx = OpContext::new();
    let input = CatalogNodeInput::new("", "")
        .with_child(CatalogNodeInput::new("shoes", "Shoes"))
        .with_child(CatalogNodeInput::new("hats", "Hats"));

    let view = service.publish_catalog(&ctx, &input).await.unwrap();
    let rows = flatten(&view);
    assert_eq!(rows[0], (String::new(), 1, 6, 0));
    assert_eq!(rows[1], ("shoes".to_string(), 2, 3, 1));
    assert_eq!(rows[2], ("hats".to_string(), 4, 5, 1));
}

#[tokio::test]
async fn test_publish_rejects_invalid_trees() {
    let service = seeded().await;
    let ctx = OpContext::new();

    let slash = CatalogNodeInput::new("a", "A").with_child(CatalogNodeInput::new("b/c", "BC"));
    let err = service.publish_catalog(&ctx, &slash).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    let twins = CatalogNodeInput::new("a", "A")
        .with_child(CatalogNodeInput::new("b", "B1"))
        .with_child(CatalogNodeInput::new("b", "B2"));
    let err = service.publish_catalog(&ctx, &twins).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    // Previous catalog untouched
    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(flatten(&fetched), expected_listing());
}

// ========== S3 / S4 / S5 / S6 ==========

#[tokio::test]
async fn test_create_assoc_priorities() {
    let service = seeded().await;
    let ctx = OpContext::new();

    for sku in ["WATER", "SOIL", "SAND"] {
        service.create_association(&ctx, M, sku).await.unwrap();
    }

    let assocs = service.get_associations(&ctx).await.unwrap();
    assert_eq!(
        assocs,
        vec![entry(M, "WATER", 10), entry(M, "SOIL", 20), entry(M, "SAND", 30)]
    );
}

#[tokio::test]
async fn test_priorities_step_by_ten() {
    let service = seeded().await;
    let ctx = OpContext::new();

    for sku in common::SKUS {
        service.create_association(&ctx, "a/d/h/k", sku).await.unwrap();
    }
    let pris: Vec<i32> = service
        .get_associations(&ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.pri)
        .collect();
    assert_eq!(pris, vec![10, 20, 30, 40, 50]);
}

#[tokio::test]
async fn test_create_assoc_on_inner_node_is_not_leaf() {
    let service = seeded().await;
    let ctx = OpContext::new();

    let err = service.create_association(&ctx, "a/c", "X").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotLeaf(ref p) if p == "a/c"));
    assert_eq!(err.kind(), ErrorKind::NotLeaf);
    assert!(service.get_associations(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_assoc_unknown_targets() {
    let service = seeded().await;
    let ctx = OpContext::new();

    let err = service.create_association(&ctx, "a/zz", "X").await.unwrap_err();
    assert!(matches!(err, CatalogError::CategoryNotFound(_)));

    let err = service.create_association(&ctx, M, "GHOST").await.unwrap_err();
    assert!(matches!(err, CatalogError::ProductNotFound(_)));
}

#[tokio::test]
async fn test_create_existing_pair_is_idempotent() {
    let service = seeded().await;
    let ctx = OpContext::new();

    service.create_association(&ctx, M, "WATER").await.unwrap();
    service.create_association(&ctx, M, "SOIL").await.unwrap();
    let again = service.create_association(&ctx, M, "WATER").await.unwrap();

    assert_eq!(again, entry(M, "WATER", 10));
    assert_eq!(service.get_associations(&ctx).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_publish_associations_replaces_everything() {
    let service = seeded().await;
    let ctx = OpContext::new();
    for sku in ["WATER", "SOIL", "SAND"] {
        service.create_association(&ctx, M, sku).await.unwrap();
    }

    let rows = service
        .publish_associations(&ctx, &mapping(&[(N, &["X", "Y"])]))
        .await
        .unwrap();
    assert_eq!(rows, 2);
    assert_eq!(
        service.get_associations(&ctx).await.unwrap(),
        vec![entry(N, "X", 10), entry(N, "Y", 20)]
    );
}

#[tokio::test]
async fn test_purge_catalog_blocked_by_assocs() {
    let service = seeded().await;
    let ctx = OpContext::new();
    for sku in ["WATER", "SOIL", "SAND"] {
        service.create_association(&ctx, M, sku).await.unwrap();
    }

    let err = service.purge_catalog(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CategoriesInUse);
    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(flatten(&fetched).len(), 14);

    service.purge_associations(&ctx).await.unwrap();
    service.purge_catalog(&ctx).await.unwrap();
    assert!(matches!(
        service.get_catalog(&ctx).await.unwrap_err(),
        CatalogError::CatalogNotFound
    ));
}

// ========== Atomicity and idempotence ==========

#[tokio::test]
async fn test_failed_publish_associations_keeps_previous_rows() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, M, "WATER").await.unwrap();
    let before = service.get_associations(&ctx).await.unwrap();

    let unknown_sku = mapping(&[(N, &["X", "GHOST"])]);
    let err = service
        .publish_associations(&ctx, &unknown_sku)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ProductNotFound(ref s) if s == "GHOST"));

    let inner_node = mapping(&[(N, &["X"]), ("a/c", &["Y"])]);
    let err = service
        .publish_associations(&ctx, &inner_node)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotLeaf);

    let repeated = mapping(&[(N, &["X", "X"])]);
    let err = service.publish_associations(&ctx, &repeated).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    assert_eq!(service.get_associations(&ctx).await.unwrap(), before);
}

#[tokio::test]
async fn test_failed_replace_catalog_keeps_previous_nodes() {
    let store = MemoryStore::new();
    let service = seeded_with(store.clone()).await;
    let ctx = OpContext::new();

    let dup = |lft, rgt, depth| NestedSetEntry {
        segment: "a".into(),
        path: "a".into(),
        name: "A".into(),
        lft,
        rgt,
        depth,
    };
    let err = store
        .replace_catalog(&[dup(1, 4, 0), dup(2, 3, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, catalog_cloud::db::StoreError::Conflict(_)));

    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(flatten(&fetched), expected_listing());
}

#[tokio::test]
async fn test_delete_missing_assoc_is_noop() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, M, "WATER").await.unwrap();

    service.delete_association(&ctx, M, "SAND").await.unwrap();
    service.delete_association(&ctx, "no/such", "X").await.unwrap();
    assert_eq!(service.get_associations(&ctx).await.unwrap().len(), 1);

    service.delete_association(&ctx, M, "WATER").await.unwrap();
    service.delete_association(&ctx, M, "WATER").await.unwrap();
    assert!(service.get_associations(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_keeps_other_priorities() {
    let service = seeded().await;
    let ctx = OpContext::new();
    for sku in ["WATER", "SOIL", "SAND"] {
        service.create_association(&ctx, M, sku).await.unwrap();
    }

    service.delete_association(&ctx, M, "SOIL").await.unwrap();
    service.create_association(&ctx, M, "X").await.unwrap();
    assert_eq!(
        service.get_associations(&ctx).await.unwrap(),
        vec![entry(M, "WATER", 10), entry(M, "SAND", 30), entry(M, "X", 40)]
    );
}

// ========== Republish guard ==========

#[tokio::test]
async fn test_republish_guard() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, M, "WATER").await.unwrap();

    // m removed
    let mut without_m = sample_tree();
    without_m.nodes[1].nodes[0].nodes[1].nodes.remove(0);
    let err = service.publish_catalog(&ctx, &without_m).await.unwrap_err();
    assert!(matches!(err, CatalogError::CategoriesInUse(ref p) if p == M));

    // m gains a child
    let mut m_inner = sample_tree();
    m_inner.nodes[1].nodes[0].nodes[1].nodes[0]
        .nodes
        .push(CatalogNodeInput::new("deep", "Deep"));
    let err = service.publish_catalog(&ctx, &m_inner).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CategoriesInUse);

    let fetched = service.get_catalog(&ctx).await.unwrap();
    assert_eq!(flatten(&fetched), expected_listing());

    // m stays a leaf: allowed, association survives with its priority
    let mut extended = sample_tree();
    extended.nodes.push(CatalogNodeInput::new("z", "Z"));
    let view = service.publish_catalog(&ctx, &extended).await.unwrap();
    assert_eq!(view.rgt, 30);
    assert_eq!(
        service.get_associations(&ctx).await.unwrap(),
        vec![entry(M, "WATER", 10)]
    );
}

// ========== Batch update ==========

#[tokio::test]
async fn test_batch_update_keeps_priorities_verbatim() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, "a/b/e", "SOIL").await.unwrap();

    let stored = service
        .batch_update_associations(
            &ctx,
            vec![entry(N, "X", 7), entry(M, "WATER", 50), entry(M, "SAND", 5)],
        )
        .await
        .unwrap();

    let expected = vec![entry(M, "SAND", 5), entry(M, "WATER", 50), entry(N, "X", 7)];
    assert_eq!(stored, expected);
    assert_eq!(service.get_associations(&ctx).await.unwrap(), expected);
}

#[tokio::test]
async fn test_batch_update_rejections() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, M, "WATER").await.unwrap();
    let before = service.get_associations(&ctx).await.unwrap();

    let cases = [
        (vec![entry(M, "X", 0)], ErrorKind::Malformed),
        (vec![entry(M, "X", 10), entry(M, "Y", 10)], ErrorKind::Malformed),
        (vec![entry(M, "X", 10), entry(M, "X", 20)], ErrorKind::Malformed),
        (vec![entry("a/c", "X", 10)], ErrorKind::NotLeaf),
        (vec![entry(M, "GHOST", 10)], ErrorKind::NotFound),
    ];
    for (entries, kind) in cases {
        let err = service
            .batch_update_associations(&ctx, entries)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kind, "{err}");
    }
    assert_eq!(service.get_associations(&ctx).await.unwrap(), before);
}

// ========== Subtree queries ==========

#[tokio::test]
async fn test_subtree_and_breadcrumbs() {
    let service = seeded().await;
    let ctx = OpContext::new();

    let sub = service.get_subtree(&ctx, "a/c/f").await.unwrap();
    let paths: Vec<String> = flatten(&sub).into_iter().map(|r| r.0).collect();
    assert_eq!(
        paths,
        vec!["a/c/f", "a/c/f/i", "a/c/f/j", "a/c/f/j/m", "a/c/f/j/n"]
    );
    assert_eq!((sub.lft, sub.rgt, sub.depth), (7, 16, 2));

    let crumbs: Vec<String> = service
        .get_breadcrumbs(&ctx, M)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(crumbs, vec!["a", "a/c", "a/c/f", "a/c/f/j", M]);

    let err = service.get_subtree(&ctx, "a/x").await.unwrap_err();
    assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    let err = service.get_breadcrumbs(&ctx, "a/x").await.unwrap_err();
    assert!(matches!(err, CatalogError::CategoryNotFound(_)));
}

#[tokio::test]
async fn test_list_category_products() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, "a/c/g", "SAND").await.unwrap();
    service.create_association(&ctx, N, "Y").await.unwrap();
    service.create_association(&ctx, M, "SOIL").await.unwrap();
    service.create_association(&ctx, M, "WATER").await.unwrap();
    service.create_association(&ctx, "a/b/e", "X").await.unwrap();

    let listed: Vec<(String, String, i32)> = service
        .list_category_products(&ctx, "a/c")
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.path, p.sku, p.pri))
        .collect();
    assert_eq!(
        listed,
        vec![
            (M.to_string(), "SOIL".to_string(), 10),
            (M.to_string(), "WATER".to_string(), 20),
            (N.to_string(), "Y".to_string(), 10),
            ("a/c/g".to_string(), "SAND".to_string(), 10),
        ]
    );

    let products = service.list_category_products(&ctx, "a/c/g").await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "sand");
}

// ========== Products ==========

#[tokio::test]
async fn test_delete_product_in_use() {
    let service = seeded().await;
    let ctx = OpContext::new();
    service.create_association(&ctx, M, "WATER").await.unwrap();

    let err = service.delete_product(&ctx, "WATER").await.unwrap_err();
    assert!(matches!(err, CatalogError::ProductInUse(_)));

    service.delete_association(&ctx, M, "WATER").await.unwrap();
    service.delete_product(&ctx, "WATER").await.unwrap();
    let err = service.get_product(&ctx, "WATER").await.unwrap_err();
    assert!(matches!(err, CatalogError::ProductNotFound(_)));
}

// ========== Cancellation ==========

#[tokio::test]
async fn test_deadline_leaves_associations_intact() {
    let store = MemoryStore::with_latency(Duration::from_millis(100));
    let service = seeded_with(store).await;
    service
        .create_association(&OpContext::new(), M, "WATER")
        .await
        .unwrap();

    let ctx = OpContext::with_timeout(Duration::from_millis(10));
    let err = service
        .publish_associations(&ctx, &mapping(&[(N, &["X", "Y"])]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled { op: "replace_assocs" }));

    assert_eq!(
        service.get_associations(&OpContext::new()).await.unwrap(),
        vec![entry(M, "WATER", 10)]
    );
}

#[tokio::test]
async fn test_cancelled_publish_leaves_catalog_intact() {
    let service = seeded().await;
    let ctx = OpContext::new();
    ctx.cancel();

    let replacement = CatalogNodeInput::new("other", "Other");
    let err = service.publish_catalog(&ctx, &replacement).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    let fetched = service.get_catalog(&OpContext::new()).await.unwrap();
    assert_eq!(flatten(&fetched), expected_listing());
}

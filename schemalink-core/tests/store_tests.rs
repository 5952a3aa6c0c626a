// Tests for the link store adapter

use schemalink_core::data::{Database, ItemStatus, NewItem};
use schemalink_core::error::StoreError;
use schemalink_core::store::LinkStore;
use schemalink_pipeline::links::LinkField;
use schemalink_pipeline::strategy::LinkSource;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, LinkStore, i64) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    let item_id = db
        .insert_item(&NewItem {
            title: "Post".to_string(),
            slug: "post".to_string(),
            permalink: "https://site.example/post".to_string(),
            item_type: "post".to_string(),
            category: None,
            status: ItemStatus::Published,
        })
        .unwrap();
    (temp_dir, LinkStore::new(db), item_id)
}

// ============================================================================
// Raw Get/Set Tests
// ============================================================================

#[test]
fn test_get_raw_defaults_to_empty() {
    let (_tmp, store, id) = create_test_store();
    assert_eq!(store.get_raw(id, LinkField::Significant).unwrap(), "");
}

#[test]
fn test_set_and_get_raw_roundtrip() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(id, LinkField::Significant, "https://a.example/\nhttps://b.example/")
        .unwrap();
    assert_eq!(
        store.get_raw(id, LinkField::Significant).unwrap(),
        "https://a.example/\nhttps://b.example/"
    );
    // the other field is independent
    assert_eq!(store.get_raw(id, LinkField::Related).unwrap(), "");
}

#[test]
fn test_set_raw_empty_text_removes_storage() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(id, LinkField::Related, "https://a.example/")
        .unwrap();
    store.set_raw(id, LinkField::Related, "  \n ").unwrap();
    assert!(store
        .database()
        .get_meta(id, LinkField::Related.meta_key())
        .unwrap()
        .is_none());
}

#[test]
fn test_set_raw_unknown_item() {
    let (_tmp, store, _) = create_test_store();
    let result = store.set_raw(999, LinkField::Significant, "https://a.example/");
    assert!(matches!(result, Err(StoreError::UnknownItem(999))));
}

// ============================================================================
// Permission / Eligibility Tests
// ============================================================================

#[test]
fn test_denying_permission_check_blocks_writes() {
    let (_tmp, store, id) = create_test_store();
    let store = store.with_permission_check(Arc::new(|_| false));

    assert!(matches!(
        store.set_raw(id, LinkField::Significant, "https://a.example/"),
        Err(StoreError::PermissionDenied)
    ));
    assert!(matches!(
        store.add_link(id, LinkField::Significant, "https://a.example/"),
        Err(StoreError::PermissionDenied)
    ));
    assert!(matches!(
        store.clear(id, LinkField::Significant),
        Err(StoreError::PermissionDenied)
    ));
    assert!(matches!(
        store.clear_all(LinkField::Significant),
        Err(StoreError::PermissionDenied)
    ));
    // reads stay open
    assert!(store.get_raw(id, LinkField::Significant).is_ok());
}

#[test]
fn test_item_scoped_permission_check() {
    let (_tmp, store, id) = create_test_store();
    // only catalog-wide operations allowed
    let store = store.with_permission_check(Arc::new(|scope| scope.is_none()));

    assert!(store.set_raw(id, LinkField::Related, "https://a.example/").is_err());
    assert!(store.clear_all(LinkField::Related).is_ok());
}

#[test]
fn test_ineligible_item_type_is_rejected() {
    let (_tmp, store, id) = create_test_store();
    let store = store.with_eligible_types(vec!["page".to_string()]);

    let result = store.set_raw(id, LinkField::Significant, "https://a.example/");
    assert!(matches!(result, Err(StoreError::IneligibleType(t)) if t == "post"));
}

#[test]
fn test_eligible_item_type_is_accepted() {
    let (_tmp, store, id) = create_test_store();
    let store = store.with_eligible_types(vec!["post".to_string(), "page".to_string()]);
    assert!(store
        .set_raw(id, LinkField::Significant, "https://a.example/")
        .is_ok());
}

// ============================================================================
// Single-Link Editing Tests
// ============================================================================

#[test]
fn test_add_link_appends_normalized() {
    let (_tmp, store, id) = create_test_store();

    assert!(store
        .add_link(id, LinkField::Significant, "https://A.example/one")
        .unwrap());
    assert!(store
        .add_link(id, LinkField::Significant, "https://a.example/two")
        .unwrap());
    assert_eq!(
        store.get_raw(id, LinkField::Significant).unwrap(),
        "https://a.example/one\nhttps://a.example/two"
    );
}

#[test]
fn test_add_link_rejects_duplicates() {
    let (_tmp, store, id) = create_test_store();

    assert!(store
        .add_link(id, LinkField::Related, "https://a.example/")
        .unwrap());
    // same link, differently cased host normalizes to the same line
    assert!(!store
        .add_link(id, LinkField::Related, "https://A.EXAMPLE/")
        .unwrap());
    assert_eq!(
        store.get_raw(id, LinkField::Related).unwrap(),
        "https://a.example/"
    );
}

#[test]
fn test_add_link_rejects_invalid_url() {
    let (_tmp, store, id) = create_test_store();
    assert!(matches!(
        store.add_link(id, LinkField::Significant, "not a url"),
        Err(StoreError::InvalidLink(_))
    ));
    assert!(store
        .add_link(id, LinkField::Significant, "ftp://files.example/x")
        .is_err());
}

#[test]
fn test_remove_link_by_exact_or_normalized_form() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(id, LinkField::Significant, "https://a.example/\nhttps://b.example/")
        .unwrap();

    assert!(store
        .remove_link(id, LinkField::Significant, "https://A.example/")
        .unwrap());
    assert_eq!(
        store.get_raw(id, LinkField::Significant).unwrap(),
        "https://b.example/"
    );
    assert!(!store
        .remove_link(id, LinkField::Significant, "https://missing.example/")
        .unwrap());
}

#[test]
fn test_remove_last_link_removes_storage() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(id, LinkField::Related, "https://a.example/")
        .unwrap();
    assert!(store
        .remove_link(id, LinkField::Related, "https://a.example/")
        .unwrap());
    assert!(store
        .database()
        .get_meta(id, LinkField::Related.meta_key())
        .unwrap()
        .is_none());
}

// ============================================================================
// Clearing Tests
// ============================================================================

#[test]
fn test_clear_single_field() {
    let (_tmp, store, id) = create_test_store();
    store.set_raw(id, LinkField::Significant, "https://a.example/").unwrap();
    store.set_raw(id, LinkField::Related, "https://b.example/").unwrap();

    store.clear(id, LinkField::Significant).unwrap();
    assert_eq!(store.get_raw(id, LinkField::Significant).unwrap(), "");
    assert_eq!(
        store.get_raw(id, LinkField::Related).unwrap(),
        "https://b.example/"
    );
}

#[test]
fn test_clear_both_fields() {
    let (_tmp, store, id) = create_test_store();
    store.set_raw(id, LinkField::Significant, "https://a.example/").unwrap();
    store.set_raw(id, LinkField::Related, "https://b.example/").unwrap();

    store.clear_both(id).unwrap();
    assert_eq!(store.get_raw(id, LinkField::Significant).unwrap(), "");
    assert_eq!(store.get_raw(id, LinkField::Related).unwrap(), "");
}

#[test]
fn test_clear_all_counts_across_statuses() {
    let (_tmp, store, id) = create_test_store();
    store.set_raw(id, LinkField::Significant, "https://a.example/").unwrap();

    let draft = store
        .database()
        .insert_item(&NewItem {
            title: "Draft".to_string(),
            slug: "draft".to_string(),
            permalink: "https://site.example/draft".to_string(),
            item_type: "page".to_string(),
            category: None,
            status: ItemStatus::Draft,
        })
        .unwrap();
    store
        .set_raw(draft, LinkField::Significant, "https://b.example/")
        .unwrap();

    assert_eq!(store.clear_all(LinkField::Significant).unwrap(), 2);
    assert_eq!(store.clear_all(LinkField::Significant).unwrap(), 0);
}

// ============================================================================
// Render-Path Read Tests
// ============================================================================

#[test]
fn test_links_for_processes_raw_text() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(
            id,
            LinkField::Significant,
            "https://good.example\nnot-a-url\nhttps://good.example",
        )
        .unwrap();

    let links = store.links_for(id, LinkField::Significant);
    assert_eq!(links, vec!["https://good.example/"]);
}

#[test]
fn test_links_for_missing_item_is_empty() {
    let (_tmp, store, _) = create_test_store();
    assert!(store.links_for(12345, LinkField::Related).is_empty());
}

#[test]
fn test_processed_hook_filters_final_list() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(
            id,
            LinkField::Significant,
            "https://keep.example/\nhttps://drop.example/",
        )
        .unwrap();

    let store = store.with_processed_hook(Arc::new(|links, _item_id, _field| {
        links
            .into_iter()
            .filter(|l| !l.contains("drop.example"))
            .collect()
    }));

    assert_eq!(
        store.links_for(id, LinkField::Significant),
        vec!["https://keep.example/"]
    );
}

#[test]
fn test_preview_reports_dropped_lines() {
    let (_tmp, store, id) = create_test_store();
    store
        .set_raw(
            id,
            LinkField::Related,
            "https://ok.example/\nbroken line\nalso broken",
        )
        .unwrap();

    let (links, dropped) = store.preview(id, LinkField::Related).unwrap();
    assert_eq!(links, vec!["https://ok.example/"]);
    assert_eq!(dropped, 2);
}

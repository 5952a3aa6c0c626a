// Tests for CLI handler helpers

use schemalink::handlers::{inject_text, resolve_db_path, response_kind_for_content_type};
use schemalink_core::data::{Database, ItemStatus, NewItem};
use schemalink_core::store::LinkStore;
use schemalink_pipeline::links::LinkField;
use schemalink_pipeline::scan::ResponseKind;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, LinkStore, i64) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("schemalink.db");
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
// Response Classification Tests
// ============================================================================

#[test]
fn test_response_kind_html_is_page() {
    assert_eq!(
        response_kind_for_content_type(Some("text/html; charset=utf-8")),
        ResponseKind::Page
    );
    assert_eq!(
        response_kind_for_content_type(Some("application/xhtml+xml")),
        ResponseKind::Page
    );
}

#[test]
fn test_response_kind_json_is_ajax() {
    assert_eq!(
        response_kind_for_content_type(Some("application/json")),
        ResponseKind::Ajax
    );
}

#[test]
fn test_response_kind_feeds() {
    assert_eq!(
        response_kind_for_content_type(Some("application/rss+xml")),
        ResponseKind::Feed
    );
    assert_eq!(
        response_kind_for_content_type(Some("application/atom+xml")),
        ResponseKind::Feed
    );
}

#[test]
fn test_response_kind_missing_header_defaults_to_page() {
    assert_eq!(response_kind_for_content_type(None), ResponseKind::Page);
}

#[test]
fn test_response_kind_other_payloads_are_not_scanned() {
    assert!(!response_kind_for_content_type(Some("text/plain")).eligible());
    assert!(!response_kind_for_content_type(Some("image/png")).eligible());
}

// ============================================================================
// Database Path Tests
// ============================================================================

#[test]
fn test_resolve_db_path_appends_file_name() {
    let path = resolve_db_path("/tmp/schemalink-conf/");
    assert_eq!(path.to_str().unwrap(), "/tmp/schemalink-conf/schemalink.db");
}

#[test]
fn test_resolve_db_path_expands_tilde() {
    let path = resolve_db_path("~/.config/schemalink/");
    assert!(!path.to_str().unwrap().starts_with('~'));
    assert!(path.ends_with("schemalink.db"));
}

// ============================================================================
// Inject Helper Tests
// ============================================================================

#[test]
fn test_inject_text_html_goes_through_text_scan() {
    let (_tmp, store, item_id) = create_test_store();
    store
        .set_raw(item_id, LinkField::Significant, "https://good.example")
        .unwrap();

    let html = r#"<html><head><script type="application/ld+json">{"@type":"WebPage"}</script></head></html>"#;
    let out = inject_text(store, item_id, html).unwrap();
    assert!(out.contains(r#""significantLink":["https://good.example/"]"#));
    assert!(out.starts_with("<html>"));
}

#[test]
fn test_inject_text_bare_json_document() {
    let (_tmp, store, item_id) = create_test_store();
    store
        .set_raw(item_id, LinkField::Related, "https://rel.example")
        .unwrap();

    let doc = r#"{"@type": "WebPage", "url": "https://site.example/post"}"#;
    let out = inject_text(store, item_id, doc).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed["relatedLink"],
        serde_json::json!(["https://rel.example/"])
    );
    assert_eq!(parsed["url"], serde_json::json!("https://site.example/post"));
}

#[test]
fn test_inject_text_invalid_json_document_is_an_error() {
    let (_tmp, store, item_id) = create_test_store();
    store
        .set_raw(item_id, LinkField::Significant, "https://good.example")
        .unwrap();

    assert!(inject_text(store, item_id, "{definitely not json").is_err());
}

#[test]
fn test_inject_text_without_stored_links_leaves_html_unchanged() {
    let (_tmp, store, item_id) = create_test_store();
    let html = r#"<html><script type="application/ld+json">{"@type":"WebPage"}</script></html>"#;
    let out = inject_text(store, item_id, html).unwrap();
    assert_eq!(out, html);
}

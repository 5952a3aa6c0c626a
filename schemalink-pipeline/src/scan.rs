use crate::mutate;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

/// Response classes the fallback scan distinguishes. Only full page renders
/// carry page-level structured data worth mutating; scanning anything else
/// wastes work or risks corrupting non-HTML payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Page,
    Admin,
    Ajax,
    Feed,
    Embed,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Page => "page",
            ResponseKind::Admin => "admin",
            ResponseKind::Ajax => "ajax",
            ResponseKind::Feed => "feed",
            ResponseKind::Embed => "embed",
        }
    }

    /// Whether the fallback scan engages for this response at all.
    pub fn eligible(&self) -> bool {
        matches!(self, ResponseKind::Page)
    }
}

/// Request-scoped context threaded into the fallback strategy. Built per
/// response, never shared across requests.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub kind: ResponseKind,
}

impl ResponseContext {
    pub fn page() -> Self {
        ResponseContext {
            kind: ResponseKind::Page,
        }
    }

    pub fn of(kind: ResponseKind) -> Self {
        ResponseContext { kind }
    }
}

// Tolerant match for JSON-LD script blocks: any attribute order and quoting
// around type=application/ld+json, case-insensitive, inner content spanning
// lines.
const SCRIPT_BLOCK_PATTERN: &str =
    r#"(?is)(<script\b[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>)(.*?)(</script>)"#;

/// Scans rendered markup for JSON-LD script blocks and rewrites the ones
/// containing a target node. Every byte outside a rewritten block's inner
/// JSON is preserved exactly, including unparseable or untargeted blocks.
pub struct ScriptScanner {
    pattern: Regex,
}

impl ScriptScanner {
    pub fn new() -> Self {
        ScriptScanner {
            pattern: Regex::new(SCRIPT_BLOCK_PATTERN).expect("script block pattern is valid"),
        }
    }

    /// One pass over the response body. Blocks are processed independently;
    /// a bad block never affects its neighbours.
    pub fn inject(&self, body: &str, significant: &[String], related: &[String]) -> String {
        if significant.is_empty() && related.is_empty() {
            return body.to_string();
        }
        self.pattern
            .replace_all(body, |caps: &Captures| {
                match rewrite_block(&caps[2], significant, related) {
                    Some(json) => format!("{}{}{}", &caps[1], json, &caps[3]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for ScriptScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one block's inner JSON, mutate, and re-serialize with stable key
/// order (slashes and unicode stay unescaped). `None` means the block must
/// be left exactly as it was: invalid JSON, or nothing changed.
fn rewrite_block(inner: &str, significant: &[String], related: &[String]) -> Option<String> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut doc: Value = match serde_json::from_str(trimmed) {
        Ok(doc) => doc,
        Err(err) => {
            debug!("Skipping unparseable JSON-LD block: {}", err);
            return None;
        }
    };
    if !mutate::apply(&mut doc, significant, related) {
        return None;
    }
    match serde_json::to_string(&doc) {
        Ok(json) => Some(json),
        Err(err) => {
            warn!("Failed to re-serialize JSON-LD block: {}", err);
            None
        }
    }
}

/// Parse a bare structured-data document, surfacing the JSON error. Used by
/// callers fed a raw document rather than a rendered page.
pub fn parse_document(text: &str) -> crate::error::Result<Value> {
    Ok(serde_json::from_str(text.trim())?)
}

/// Extract every parseable JSON-LD document embedded in `html`. Read-only;
/// backs the inspect surface.
pub fn extract_documents(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("selector is valid");
    let mut docs = Vec::new();
    for script in document.select(&selector) {
        let text = script.text().collect::<String>();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value) => docs.push(value),
            Err(err) => debug!("Ignoring unparseable JSON-LD block: {}", err),
        }
    }
    docs
}

/// Schema `@type` labels present in a document, root and `@graph` nodes
/// included, deduplicated in encounter order.
pub fn document_types(doc: &Value) -> Vec<String> {
    let mut types = Vec::new();
    collect_types(doc, &mut types);
    if let Some(Value::Array(graph)) = doc.get("@graph") {
        for node in graph {
            collect_types(node, &mut types);
        }
    }
    types
}

fn collect_types(node: &Value, types: &mut Vec<String>) {
    match node.get("@type") {
        Some(Value::String(label)) => {
            if !types.contains(label) {
                types.push(label.clone());
            }
        }
        Some(Value::Array(labels)) => {
            for label in labels {
                if let Some(label) = label.as_str()
                    && !types.iter().any(|t| t == label)
                {
                    types.push(label.to_string());
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sig() -> Vec<String> {
        vec!["https://good.example/".to_string()]
    }

    #[test]
    fn test_inject_rewrites_web_page_block() {
        let scanner = ScriptScanner::new();
        let body = r#"<html><head><script type="application/ld+json">{"@type":"WebPage"}</script></head><body>hi</body></html>"#;
        let out = scanner.inject(body, &sig(), &[]);
        assert!(out.contains(r#""significantLink":["https://good.example/"]"#));
        assert!(out.starts_with("<html><head><script type=\"application/ld+json\">"));
        assert!(out.ends_with("</script></head><body>hi</body></html>"));
    }

    #[test]
    fn test_inject_leaves_plain_script_untouched() {
        let scanner = ScriptScanner::new();
        let body = r#"<script type="text/javascript">var x = {"@type":"WebPage"};</script>"#;
        let out = scanner.inject(body, &sig(), &[]);
        assert_eq!(out, body);
    }

    #[test]
    fn test_inject_leaves_malformed_json_untouched_and_continues() {
        let scanner = ScriptScanner::new();
        let body = concat!(
            r#"<script type="application/ld+json">{not json at all</script>"#,
            r#"<script type="application/ld+json">{"@type":"WebPage"}</script>"#,
        );
        let out = scanner.inject(body, &sig(), &[]);
        // first block byte-for-byte intact, second one rewritten
        assert!(out.starts_with(r#"<script type="application/ld+json">{not json at all</script>"#));
        assert!(out.contains("significantLink"));
    }

    #[test]
    fn test_inject_preserves_untargeted_block_verbatim() {
        let scanner = ScriptScanner::new();
        // formatting quirks must survive when no target node exists
        let body = "<script type=\"application/ld+json\">\n  { \"@type\" : \"Organization\" }\n</script>";
        let out = scanner.inject(body, &sig(), &[]);
        assert_eq!(out, body);
    }

    #[test]
    fn test_inject_handles_single_quoted_and_uppercase_attributes() {
        let scanner = ScriptScanner::new();
        let body = r#"<SCRIPT TYPE='application/ld+json'>{"@type":"WebPage"}</SCRIPT>"#;
        let out = scanner.inject(body, &sig(), &[]);
        assert!(out.contains("significantLink"));
    }

    #[test]
    fn test_inject_mutates_graph_block() {
        let scanner = ScriptScanner::new();
        let body = r#"<script type="application/ld+json">{"@context":"https://schema.org","@graph":[{"@type":"Organization"},{"@type":"WebPage","url":"https://x/"}]}</script>"#;
        let out = scanner.inject(body, &sig(), &sig());
        let inner = out
            .trim_start_matches(r#"<script type="application/ld+json">"#)
            .trim_end_matches("</script>");
        let doc: Value = serde_json::from_str(inner).unwrap();
        assert_eq!(doc["@graph"][1]["significantLink"], json!(["https://good.example/"]));
        assert!(doc["@graph"][0].get("significantLink").is_none());
        // key order of untouched properties is preserved
        assert!(inner.starts_with(r#"{"@context":"https://schema.org","@graph""#));
    }

    #[test]
    fn test_inject_with_empty_lists_returns_body_unchanged() {
        let scanner = ScriptScanner::new();
        let body = r#"<script type="application/ld+json">{"@type":"WebPage"}</script>"#;
        assert_eq!(scanner.inject(body, &[], &[]), body);
    }

    #[test]
    fn test_inject_does_not_escape_slashes_or_unicode() {
        let scanner = ScriptScanner::new();
        let body = r#"<script type="application/ld+json">{"@type":"WebPage","name":"café"}</script>"#;
        let out = scanner.inject(body, &sig(), &[]);
        assert!(out.contains(r#""name":"café""#));
        assert!(out.contains("https://good.example/"));
        assert!(!out.contains(r#"https:\/\/"#));
    }

    #[test]
    fn test_end_to_end_processing_of_raw_stored_text() {
        // raw stored text with a duplicate and an invalid line
        let raw = "https://good.example\nnot-a-url\nhttps://good.example";
        let links = crate::links::process_links(raw);
        let scanner = ScriptScanner::new();
        let body = r#"<script type="application/ld+json">{"@type":"WebPage"}</script>"#;
        let out = scanner.inject(body, &links, &[]);
        assert_eq!(
            out,
            r#"<script type="application/ld+json">{"@type":"WebPage","significantLink":["https://good.example/"]}</script>"#
        );
    }

    #[test]
    fn test_extract_documents_skips_invalid_blocks() {
        let html = concat!(
            r#"<html><head>"#,
            r#"<script type="application/ld+json">{"@type":"WebPage"}</script>"#,
            r#"<script type="application/ld+json">broken</script>"#,
            r#"<script type="text/javascript">1</script>"#,
            r#"</head></html>"#,
        );
        let docs = extract_documents(html);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["@type"], json!("WebPage"));
    }

    #[test]
    fn test_document_types_covers_root_and_graph() {
        let doc = json!({
            "@type": "WebPage",
            "@graph": [
                {"@type": ["Article", "WebPage"]},
                {"@type": "Person"}
            ]
        });
        assert_eq!(document_types(&doc), vec!["WebPage", "Article", "Person"]);
    }
}

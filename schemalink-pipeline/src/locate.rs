use serde_json::{Map, Value};

/// Article-like types whose embedded `isPartOf` page also receives links.
const ARTICLE_TYPES: [&str; 3] = ["Article", "BlogPosting", "NewsArticle"];

const WEB_PAGE: &str = "WebPage";

/// Location of a schema node within a structured-data document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePath {
    /// The document root (flat form).
    Root,
    /// Index into the document's `@graph` array.
    Graph(usize),
    /// Key into a node-identifier to node map (first-party pipeline form).
    Entity(String),
}

/// A located target node: the path to the node plus whether the target is
/// the node's embedded `isPartOf` page rather than the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub path: NodePath,
    pub via_is_part_of: bool,
}

/// True when the node's `@type` contains `expected`. A bare string and a
/// one-element list of that string are equivalent.
pub(crate) fn type_set_contains(node: &Value, expected: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(label)) => label == expected,
        Some(Value::Array(labels)) => labels.iter().any(|l| l.as_str() == Some(expected)),
        _ => false,
    }
}

fn is_article_like(node: &Value) -> bool {
    ARTICLE_TYPES
        .iter()
        .any(|label| type_set_contains(node, label))
}

fn has_web_page_parent(node: &Value) -> bool {
    node.get("isPartOf")
        .map(|parent| type_set_contains(parent, WEB_PAGE))
        .unwrap_or(false)
}

/// A node can contribute up to two independent targets: itself (when typed
/// WebPage) and its embedded `isPartOf` page (when the node is article-like).
fn push_targets(refs: &mut Vec<NodeRef>, path: NodePath, node: &Value) {
    if type_set_contains(node, WEB_PAGE) {
        refs.push(NodeRef {
            path: path.clone(),
            via_is_part_of: false,
        });
    }
    if is_article_like(node) && has_web_page_parent(node) {
        refs.push(NodeRef {
            path,
            via_is_part_of: true,
        });
    }
}

/// Find every target node in a flat or `@graph` document.
///
/// Graph form is detected by the presence of an `@graph` array; its nodes
/// are walked once in native order. A flat document yields at most its root.
/// The returned order follows document iteration order and is never sorted.
pub fn locate(doc: &Value) -> Vec<NodeRef> {
    let mut refs = Vec::new();
    if let Value::Object(map) = doc {
        if let Some(Value::Array(graph)) = map.get("@graph") {
            for (index, node) in graph.iter().enumerate() {
                push_targets(&mut refs, NodePath::Graph(index), node);
            }
        } else if type_set_contains(doc, WEB_PAGE) {
            refs.push(NodeRef {
                path: NodePath::Root,
                via_is_part_of: false,
            });
        }
    }
    refs
}

/// Find every target node in a keyed node-identifier to node map, the form a
/// first-party schema pipeline hands over mid-render.
pub fn locate_entities(entities: &Map<String, Value>) -> Vec<NodeRef> {
    let mut refs = Vec::new();
    for (id, node) in entities {
        push_targets(&mut refs, NodePath::Entity(id.clone()), node);
    }
    refs
}

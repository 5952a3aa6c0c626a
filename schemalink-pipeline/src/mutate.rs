use crate::links::LinkField;
use crate::locate::{self, NodePath, NodeRef};
use serde_json::{Map, Value};

fn links_value(links: &[String]) -> Value {
    Value::Array(links.iter().map(|l| Value::String(l.clone())).collect())
}

/// Write both link lists onto one target node. Empty lists leave the
/// corresponding property untouched; clearing is an explicit store-level
/// action, never a render-time one. Existing unrelated properties are kept
/// as-is. Returns whether anything was written.
fn write_links(node: &mut Value, significant: &[String], related: &[String]) -> bool {
    let Some(object) = node.as_object_mut() else {
        return false;
    };
    let mut changed = false;
    if !significant.is_empty() {
        object.insert(
            LinkField::Significant.property().to_string(),
            links_value(significant),
        );
        changed = true;
    }
    if !related.is_empty() {
        object.insert(
            LinkField::Related.property().to_string(),
            links_value(related),
        );
        changed = true;
    }
    changed
}

fn resolve<'a>(doc: &'a mut Value, node_ref: &NodeRef) -> Option<&'a mut Value> {
    let node = match &node_ref.path {
        NodePath::Root => Some(doc),
        NodePath::Graph(index) => doc.get_mut("@graph").and_then(|g| g.get_mut(*index)),
        // keyed maps go through apply_entities
        NodePath::Entity(_) => None,
    }?;
    if node_ref.via_is_part_of {
        node.get_mut("isPartOf")
    } else {
        Some(node)
    }
}

/// Apply the two link lists to every target node in a flat or `@graph`
/// document.
///
/// Properties are replaced wholesale, so repeated application with the same
/// lists converges on the first result. Returns whether the document was
/// modified; with no targets or two empty lists the document is untouched.
pub fn apply(doc: &mut Value, significant: &[String], related: &[String]) -> bool {
    if significant.is_empty() && related.is_empty() {
        return false;
    }
    let mut changed = false;
    for node_ref in locate::locate(doc) {
        if let Some(node) = resolve(doc, &node_ref) {
            changed |= write_links(node, significant, related);
        }
    }
    changed
}

/// [`apply`] for the keyed node-identifier to node form.
pub fn apply_entities(
    entities: &mut Map<String, Value>,
    significant: &[String],
    related: &[String],
) -> bool {
    if significant.is_empty() && related.is_empty() {
        return false;
    }
    let mut changed = false;
    for node_ref in locate::locate_entities(entities) {
        let NodePath::Entity(ref id) = node_ref.path else {
            continue;
        };
        let Some(node) = entities.get_mut(id) else {
            continue;
        };
        let target = if node_ref.via_is_part_of {
            node.get_mut("isPartOf")
        } else {
            Some(node)
        };
        if let Some(target) = target {
            changed |= write_links(target, significant, related);
        }
    }
    changed
}

use crate::links::LinkField;
use crate::mutate;
use crate::scan::{ResponseContext, ScriptScanner};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Read-only source of processed link lists for the render path. The store
/// implements this; failures degrade to an empty list inside the
/// implementation so the render path never sees an error.
pub trait LinkSource {
    fn links_for(&self, item_id: i64, field: LinkField) -> Vec<String>;
}

/// Observation hook fired once per proposed link before the graph/flat
/// strategies write it into a document. Collaborators use it to veto-log or
/// audit; it does not alter the flow.
pub type BeforeInjectHook = Arc<dyn Fn(i64, &str, LinkField) + Send + Sync>;

/// Schema-generation collaborator detected by the startup capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaProvider {
    /// First-party pipeline producing a keyed graph document mid-render.
    GraphPipeline,
    /// Third-party generator producing a single WebPage-shaped node.
    FlatGenerator,
}

/// The one strategy wired up for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveStrategy {
    GraphHook,
    FlatHook,
    TextScan,
}

impl ActiveStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStrategy::GraphHook => "graph-hook",
            ActiveStrategy::FlatHook => "flat-hook",
            ActiveStrategy::TextScan => "text-scan",
        }
    }
}

/// Map the probe result to a strategy. Static: evaluated once at startup,
/// never re-decided per request.
pub fn select_strategy(provider: Option<SchemaProvider>) -> ActiveStrategy {
    match provider {
        Some(SchemaProvider::GraphPipeline) => ActiveStrategy::GraphHook,
        Some(SchemaProvider::FlatGenerator) => ActiveStrategy::FlatHook,
        None => ActiveStrategy::TextScan,
    }
}

/// Wires the link source, the selected strategy and the scan machinery
/// together. One instance per deployment; per-request state stays in the
/// arguments.
///
/// Every `transform_*` entry point upholds the same boundary contract: it
/// can never fail its caller. Internal problems are logged and the input is
/// handed back unmodified, so the surrounding render pipeline is never
/// aborted by link injection.
pub struct Injector {
    source: Arc<dyn LinkSource>,
    strategy: ActiveStrategy,
    scanner: ScriptScanner,
    before_hook: Option<BeforeInjectHook>,
}

impl Injector {
    pub fn new(source: Arc<dyn LinkSource>, provider: Option<SchemaProvider>) -> Self {
        let strategy = select_strategy(provider);
        debug!("Selected injection strategy: {}", strategy.as_str());
        Injector {
            source,
            strategy,
            scanner: ScriptScanner::new(),
            before_hook: None,
        }
    }

    pub fn with_before_hook(mut self, hook: BeforeInjectHook) -> Self {
        self.before_hook = Some(hook);
        self
    }

    pub fn strategy(&self) -> ActiveStrategy {
        self.strategy
    }

    fn lists(&self, item_id: i64) -> (Vec<String>, Vec<String>) {
        (
            self.source.links_for(item_id, LinkField::Significant),
            self.source.links_for(item_id, LinkField::Related),
        )
    }

    fn fire_before_hook(&self, item_id: i64, significant: &[String], related: &[String]) {
        if let Some(ref hook) = self.before_hook {
            for link in significant {
                hook(item_id, link, LinkField::Significant);
            }
            for link in related {
                hook(item_id, link, LinkField::Related);
            }
        }
    }

    /// Graph-hook strategy: callback for a first-party pipeline handing over
    /// its keyed in-progress graph. The graph flows back to the collaborator
    /// for continued processing whether or not anything was written.
    pub fn transform_graph(
        &self,
        item_id: i64,
        mut entities: Map<String, Value>,
    ) -> Map<String, Value> {
        let (significant, related) = self.lists(item_id);
        if significant.is_empty() && related.is_empty() {
            return entities;
        }
        self.fire_before_hook(item_id, &significant, &related);
        if mutate::apply_entities(&mut entities, &significant, &related) {
            debug!("Injected links into graph document for item {}", item_id);
        }
        entities
    }

    /// Flat-hook strategy: callback for a generator producing a single
    /// WebPage-shaped node.
    pub fn transform_flat(&self, item_id: i64, mut node: Value) -> Value {
        let (significant, related) = self.lists(item_id);
        if significant.is_empty() && related.is_empty() {
            return node;
        }
        self.fire_before_hook(item_id, &significant, &related);
        if mutate::apply(&mut node, &significant, &related) {
            debug!("Injected links into flat document for item {}", item_id);
        }
        node
    }

    /// Text-scan fallback: one pass over the fully rendered response body.
    /// Ineligible responses short-circuit before any scanning work.
    pub fn transform_response(&self, item_id: i64, ctx: &ResponseContext, body: &str) -> String {
        if !ctx.kind.eligible() {
            debug!("Skipping {} response for item {}", ctx.kind.as_str(), item_id);
            return body.to_string();
        }
        let (significant, related) = self.lists(item_id);
        if significant.is_empty() && related.is_empty() {
            return body.to_string();
        }
        self.scanner.inject(body, &significant, &related)
    }
}

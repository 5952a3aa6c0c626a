pub mod error;
pub mod links;
pub mod locate;
pub mod mutate;
pub mod scan;
pub mod strategy;

pub use error::PipelineError;
pub use links::{LinkField, process_links};
pub use locate::{NodePath, NodeRef, locate};
pub use scan::{ResponseContext, ResponseKind, ScriptScanner};
pub use strategy::{ActiveStrategy, Injector, LinkSource, SchemaProvider};

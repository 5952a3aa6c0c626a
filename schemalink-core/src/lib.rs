pub mod data;
pub mod error;
pub mod report;
pub mod store;

pub use data::Database;
pub use error::StoreError;
pub use store::{LinkStore, PermissionCheck};

pub fn print_banner() {
    println!(
        r#"
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
  schemalink v{}
  significant & related links for JSON-LD WebPage schema
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
"#,
        env!("CARGO_PKG_VERSION")
    );
}

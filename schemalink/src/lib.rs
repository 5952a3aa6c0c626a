// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    inject_text,
    read_input,
    resolve_db_path,
    response_kind_for_content_type,
};

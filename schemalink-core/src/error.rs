use schemalink_pipeline::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Unknown content item: {0}")]
    UnknownItem(i64),

    #[error("Write not permitted")]
    PermissionDenied,

    #[error("Item type '{0}' is not eligible for link storage")]
    IneligibleType(String),

    #[error("Rejected link: {0}")]
    InvalidLink(#[from] PipelineError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

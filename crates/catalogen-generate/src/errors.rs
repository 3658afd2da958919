use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("metadata error: {0}")]
    Metadata(#[from] catalogen_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Composite products were requested but no simple product was generated.
    #[error("no simple products available to associate with {0} products")]
    EmptyPool(&'static str),
    #[error("attribute set {0} has no attribute assignment")]
    MissingAssignment(u64),
    #[error("no product attribute set is available for category {0}")]
    NoAttributeSet(u64),
}

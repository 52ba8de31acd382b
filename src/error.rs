use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreemapError>;

/// Errors raised while building a hierarchy or computing its layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreemapError {
    /// The input tree is structurally invalid or carries no weight.
    #[error("invalid tree at '{id}': {reason}")]
    InvalidTree { id: String, reason: String },

    #[error("invalid viewport {width}x{height}: both sides must be finite and positive")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

impl TreemapError {
    pub fn invalid_tree(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTree {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

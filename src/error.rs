//! Error taxonomy shared by the catalog core and the user directory.

use thiserror::Error;

/// Result alias used throughout the library layer.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A lookup missed. Nothing was changed.
    #[error("{what} '{key}' not found")]
    NotFound { what: &'static str, key: String },

    /// A field failed validation before touching any structure.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The rank tree and the title index disagree.
    #[error("catalog inconsistent: {0}")]
    Inconsistent(String),
}

impl CatalogError {
    pub(crate) fn book_not_found(title: &str) -> Self {
        CatalogError::NotFound {
            what: "Book",
            key: title.to_string(),
        }
    }

    pub(crate) fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Self {
        CatalogError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

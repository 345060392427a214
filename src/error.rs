//! Error types for building the API model

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Conditions that abort a build.
///
/// Every variant names the offending entity so a single message is enough to
/// locate the conflict in the source XML.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Duplicate category {name:?}")]
    DuplicateCategory { name: String },

    #[error("Inconsistent definitions for enum {name:?}: {existing:?} vs {new:?}")]
    InconsistentEnum {
        name: String,
        existing: String,
        new: String,
    },

    #[error("Inconsistent {field} for function {name:?}: {existing} vs {new}")]
    InconsistentFunction {
        name: String,
        field: &'static str,
        existing: String,
        new: String,
    },

    #[error("Too many return types for function {function:?} in category {category:?}")]
    MultipleReturns { function: String, category: String },

    #[error("Don't know how to interpret value of enum {name} ({value:?})")]
    MalformedEnumValue { name: String, value: String },

    #[error("Missing attribute {attribute:?} on {element}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Cannot include {href:?}: {reason}")]
    Include { href: String, reason: String },

    #[error("Include cycle through {path}")]
    IncludeCycle { path: String },

    #[error("Invalid lint pattern: {0}")]
    Pattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub(crate) fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }
}

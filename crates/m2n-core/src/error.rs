//! Unified error handling for M2N
//!
//! This module provides the error type shared by the scene source, the
//! export pipeline and the geometry codec.

use thiserror::Error;

/// Unified error type for all M2N operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Format Errors ====================

    /// Invalid magic bytes at file start
    #[error("Invalid magic bytes: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    /// Unsupported format version
    #[error("Unsupported version: {version} (supported: {supported})")]
    UnsupportedVersion {
        version: u8,
        supported: u8,
    },

    /// Unexpected end of data
    #[error("Unexpected end of data at offset {offset}")]
    UnexpectedEof {
        offset: u64,
    },

    /// Invalid data structure
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    /// Payload does not fit the 32-bit length field
    #[error("Payload of {bytes} bytes exceeds the 32-bit length field")]
    PayloadTooLarge {
        bytes: usize,
    },

    // ==================== Scene Errors ====================

    /// Mesh data referenced by a node is not present in the scene
    #[error("Mesh data not found: {name}")]
    MissingMesh {
        name: String,
    },

    /// Name cannot be used as a single path component
    #[error("Invalid asset name '{name}': {reason}")]
    InvalidAssetName {
        name: String,
        reason: String,
    },

    /// Name refers to a material or image the scene does not define
    #[error("Unresolved {kind} reference '{name}'")]
    UnresolvedReference {
        kind: String,
        name: String,
    },

    // ==================== Configuration Errors ====================

    /// Namespace cannot be used as a path prefix
    #[error("Invalid namespace '{namespace}': {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: String,
    },

    /// Vertex attribute set has no defined binary layout
    #[error("Unsupported vertex attribute set: {attributes}")]
    UnsupportedVertexAttributes {
        attributes: String,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Create an invalid namespace error
    pub fn invalid_namespace(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidNamespace {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid asset name error
    pub fn invalid_asset_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAssetName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a parse/format error
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::InvalidMagic { .. }
            | Error::UnsupportedVersion { .. }
            | Error::UnexpectedEof { .. }
            | Error::InvalidData { .. } => true,
            Error::WithContext { source, .. } => source.is_format_error(),
            _ => false,
        }
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::InvalidNamespace { .. }
            | Error::UnsupportedVertexAttributes { .. }
            | Error::Yaml(_) => true,
            Error::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::invalid_data("bad polygon");
        let contextualized = err.with_context("while extracting mesh 'Cube'");

        assert!(contextualized.to_string().contains("while extracting mesh 'Cube'"));
        assert!(contextualized.to_string().contains("bad polygon"));
    }

    #[test]
    fn test_is_format_error() {
        assert!(Error::InvalidMagic {
            expected: b"M2N1.0".to_vec(),
            found: vec![],
        }.is_format_error());
        assert!(Error::invalid_data("x").with_context("nested").is_format_error());
        assert!(!Error::MissingMesh { name: "Cube".into() }.is_format_error());
    }

    #[test]
    fn test_is_config_error() {
        assert!(Error::invalid_namespace("../up", "parent components").is_config_error());
        assert!(!Error::PayloadTooLarge { bytes: 1 }.is_config_error());
    }

    #[test]
    fn test_unresolved_reference_message() {
        let err = Error::UnresolvedReference {
            kind: "material".into(),
            name: "Ghost".into(),
        };
        assert_eq!(err.to_string(), "Unresolved material reference 'Ghost'");
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_result_context_on_io() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let with_context = result.context("opening scene document");

        let message = with_context.unwrap_err().to_string();
        assert!(message.starts_with("opening scene document"));
    }
}

//! Unified error handling for meshbake
//!
//! Every failure is terminal for the current conversion. The variants fall
//! into three groups: usage errors (bad selector or dialect), malformed-input
//! errors (a document meshbake cannot convert), and I/O errors.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all meshbake operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Usage Errors ====================

    /// Dialect token is not one of the known dialects
    #[error("Unknown dialect: {token} (expected one of: c, rust)")]
    UnknownDialect {
        token: String,
    },

    /// A selected piece name is not a geometry node in the document
    #[error("Unknown piece: {name}")]
    UnknownPiece {
        name: String,
    },

    /// Invalid combination of options
    #[error("Invalid usage: {message}")]
    InvalidUsage {
        message: String,
    },

    // ==================== Malformed Input ====================

    /// Two geometry nodes share one identifier
    #[error("Duplicate piece name: {name}")]
    DuplicatePiece {
        name: String,
    },

    /// Two joint nodes share one identifier
    #[error("Duplicate joint name: {name}")]
    DuplicateJoint {
        name: String,
    },

    /// Two emitted names map to one constant identifier
    #[error("Nodes {first} and {second} both emit the constant {name}")]
    DuplicateConstant {
        name: String,
        first: String,
        second: String,
    },

    /// Position, normal and texcoord index streams differ in length
    #[error(
        "Index stream length mismatch in geometry {geometry}: \
         positions={positions}, normals={normals}, texcoords={texcoords}"
    )]
    IndexStreamMismatch {
        geometry: String,
        positions: usize,
        normals: usize,
        texcoords: usize,
    },

    /// Geometry carries more than one primitive group
    #[error("Geometry {geometry} has {count} primitive groups (only one is supported)")]
    MultiplePrimitiveGroups {
        geometry: String,
        count: usize,
    },

    /// Geometry carries no primitive group at all
    #[error("Geometry {geometry} has no primitive group")]
    MissingPrimitives {
        geometry: String,
    },

    /// Primitive group lacks a required input stream
    #[error("Geometry {geometry} is missing the {semantic} input")]
    MissingInput {
        geometry: String,
        semantic: String,
    },

    /// Index points past the end of its source
    #[error("Index {index} out of range for {semantic} source of {geometry} ({len} elements)")]
    IndexOutOfRange {
        geometry: String,
        semantic: String,
        index: usize,
        len: usize,
    },

    /// A piece whose vertex count is not a multiple of three
    #[error("Piece {name} has {count} vertices, not a whole number of triangles")]
    PartialTriangle {
        name: String,
        count: usize,
    },

    /// Invalid data structure
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

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

    /// Create an invalid usage error
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Error::InvalidUsage {
            message: message.into(),
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error was caused by how meshbake was invoked
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self.root(),
            Error::UnknownDialect { .. } | Error::UnknownPiece { .. } | Error::InvalidUsage { .. }
        )
    }

    /// Check if this error was caused by a document meshbake cannot convert
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self.root(),
            Error::UnknownPiece { .. }
                | Error::DuplicatePiece { .. }
                | Error::DuplicateJoint { .. }
                | Error::DuplicateConstant { .. }
                | Error::IndexStreamMismatch { .. }
                | Error::MultiplePrimitiveGroups { .. }
                | Error::MissingPrimitives { .. }
                | Error::MissingInput { .. }
                | Error::IndexOutOfRange { .. }
                | Error::PartialTriangle { .. }
                | Error::InvalidData { .. }
        )
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self.root(), Error::Io(_) | Error::FileNotFound(_))
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

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::UnknownPiece { name: "head".into() };
        let contextualized = err.with_context("while selecting pieces");

        assert!(contextualized.to_string().contains("while selecting pieces"));
        assert!(contextualized.to_string().contains("head"));
    }

    #[test]
    fn test_classification_sees_through_context() {
        let err = Error::DuplicateJoint { name: "arm_bone".into() }.with_context("extracting joints");
        assert!(err.is_malformed_input());
        assert!(!err.is_usage_error());
    }

    #[test]
    fn test_is_usage_error() {
        assert!(Error::UnknownDialect { token: "go".into() }.is_usage_error());
        assert!(Error::UnknownPiece { name: "tail".into() }.is_usage_error());
        // a bad selector is only detected against the document
        assert!(Error::UnknownPiece { name: "tail".into() }.is_malformed_input());
        assert!(!Error::FileNotFound(PathBuf::from("/test")).is_usage_error());
    }

    #[test]
    fn test_is_io_error() {
        assert!(Error::FileNotFound(PathBuf::from("/test")).is_io_error());
        assert!(!Error::invalid_data("bad").is_io_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::FileNotFound(PathBuf::from("/test")));
        let with_context = result.context("loading scene");

        assert!(with_context.is_err());
        assert!(with_context.unwrap_err().to_string().contains("loading scene"));
    }
}

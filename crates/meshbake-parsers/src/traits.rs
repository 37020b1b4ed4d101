// meshbake-parsers/src/traits.rs
//! Core traits defining the parser interface for scene documents.
//!
//! Parsers read an entire document into memory and return a fully built,
//! immutable value. There is no streaming or partial parse: a document either
//! loads completely or fails with a [`ParseError`].

use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] xmltree::ParseError),

    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid number {text:?} in {context}")]
    InvalidNumber { text: String, context: String },

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Nested error in {context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap this error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ParseError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Configuration options for parsing
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Reject geometry nodes that carry further instances after their geometry
    pub strict_validation: bool,
    /// Node identifier suffix marking a skeletal joint
    pub bone_suffix: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_validation: false,
            bone_suffix: "_bone".to_string(),
        }
    }
}

/// Core trait for all scene document parsers
pub trait Parser: Send + Sync {
    /// The parsed output type
    type Output: Send + Sync;

    /// Returns the file extensions this parser handles (e.g., ["dae"])
    fn extensions(&self) -> &[&str];

    /// Returns a human-readable name for this parser
    fn name(&self) -> &str;

    /// Parse from a reader with default options
    fn parse<R: Read>(&self, reader: R) -> ParseResult<Self::Output> {
        self.parse_with_options(reader, &ParseOptions::default())
    }

    /// Parse from a reader with custom options
    fn parse_with_options<R: Read>(&self, reader: R, options: &ParseOptions) -> ParseResult<Self::Output>;

    /// Parse from a file path
    fn parse_file(&self, path: &Path) -> ParseResult<Self::Output> {
        self.parse_file_with_options(path, &ParseOptions::default())
    }

    /// Parse from a file path with options
    fn parse_file_with_options(&self, path: &Path, options: &ParseOptions) -> ParseResult<Self::Output> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        self.parse_with_options(reader, options)
    }

    /// Check if this parser can handle the given file, judging by extension
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext_str = ext.to_string_lossy().to_lowercase();
                self.extensions().iter().any(|e| e.to_lowercase() == ext_str)
            })
            .unwrap_or(false)
    }
}

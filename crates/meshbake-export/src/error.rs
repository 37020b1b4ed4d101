//! Bake pipeline errors

use meshbake_parsers::ParseError;
use thiserror::Error;

/// Errors raised while loading, extracting or writing a bake
#[derive(Error, Debug)]
pub enum BakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bake(#[from] meshbake_core::Error),
}

pub type BakeResult<T> = Result<T, BakeError>;

impl BakeError {
    /// Check if the error comes from how the pipeline was invoked
    pub fn is_usage_error(&self) -> bool {
        matches!(self, BakeError::Bake(e) if e.is_usage_error())
    }

    /// Check if the error comes from a document that cannot be converted
    pub fn is_malformed_input(&self) -> bool {
        match self {
            BakeError::Parse(ParseError::Io(_)) => false,
            BakeError::Parse(_) => true,
            BakeError::Bake(e) => e.is_malformed_input(),
            BakeError::Io(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let usage: BakeError = meshbake_core::Error::UnknownDialect { token: "go".into() }.into();
        assert!(usage.is_usage_error());
        assert!(!usage.is_malformed_input());

        let parse: BakeError = ParseError::MissingField("mesh".into()).into();
        assert!(parse.is_malformed_input());

        let io: BakeError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!io.is_malformed_input());
        assert!(!io.is_usage_error());
    }
}

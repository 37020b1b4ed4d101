//! meshbake-parsers
//!
//! Scene document parsing for meshbake.
//!
//! # Supported Formats
//!
//! | Format  | Extension | Description |
//! |---------|-----------|-------------|
//! | COLLADA | `.dae`    | Node hierarchy, geometry library, triangulated primitives |
//!
//! # Example
//!
//! ```rust,ignore
//! use meshbake_parsers::{DaeParser, Parser};
//!
//! let parser = DaeParser::new();
//! let document = parser.parse_file("steve.dae".as_ref())?;
//!
//! for summary in document.piece_summaries() {
//!     println!("{} ({} triangles)", summary.name, summary.triangles);
//! }
//! ```

pub mod dae;
pub mod logging;
pub mod traits;

// Re-export main types
pub use traits::{ParseError, ParseOptions, ParseResult, Parser};

pub use dae::{
    DaeDocument, DaeParser, Geometry, Input, PieceSummary, PrimitiveGroup, PrimitiveKind,
    SceneGraph, SceneNode, Source,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

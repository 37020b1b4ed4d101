//! meshbake export pipeline
//!
//! Turns a parsed COLLADA document into compiled-in source code:
//! - extraction of per-node triangle lists and bone translations
//! - emitters for the C and Rust dialects
//! - the [`Baker`] driver that loads, extracts and writes output files

pub mod emit;
pub mod error;
pub mod extract;
pub mod pipeline;

pub use emit::{CEmitter, CodeEmitter, Dialect, EmitOptions, Emitter, RustEmitter};
pub use error::{BakeError, BakeResult};
pub use extract::{extract_joints, extract_pieces, extract_scene, NodeSelector};
pub use pipeline::{list_pieces, BakeJob, BakeOptions, BakeReport, Baker};

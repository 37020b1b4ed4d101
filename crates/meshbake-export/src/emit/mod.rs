//! Source code emitters
//!
//! Each dialect writes the same scene as compilable source: a vertex struct
//! definition followed by one constant per piece (and per joint, in Rust).
//! Output goes to any [`std::io::Write`] sink; nothing is buffered
//! beyond what the sink itself buffers.

mod c;
mod rust;

pub use c::CEmitter;
pub use rust::RustEmitter;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use meshbake_core::{Error, Joint, Piece, Scene};
use tracing::warn;

/// Output language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    C,
    #[default]
    Rust,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::C, Dialect::Rust];

    /// Command line token for this dialect
    pub fn token(&self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Rust => "rust",
        }
    }

    /// Conventional file extension for generated files
    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::C => "h",
            Dialect::Rust => "rs",
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownDialect { token: s.to_string() })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Emission settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Output language
    pub dialect: Dialect,
    /// Module holding the shared `Vertex` definition (Rust only). When set,
    /// the struct is imported instead of defined inline.
    pub common_module: Option<String>,
}

impl EmitOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            common_module: None,
        }
    }

    /// Import the vertex struct from `module`
    pub fn with_common_module(mut self, module: impl Into<String>) -> Self {
        self.common_module = Some(module.into());
        self
    }
}

/// Writes a scene as source code in one dialect
pub trait Emitter {
    /// Struct definitions or imports at the top of the file
    fn write_preamble(&self, out: &mut dyn Write) -> io::Result<()>;

    /// One constant array for a piece
    fn write_piece(&self, out: &mut dyn Write, piece: &Piece) -> io::Result<()>;

    /// One constant for a joint; dialects without joint output write nothing
    fn write_joint(&self, out: &mut dyn Write, joint: &Joint) -> io::Result<()>;

    /// Check if joints appear in the output
    fn emits_joints(&self) -> bool {
        true
    }

    /// Reject scenes where two emitted names map to one constant
    fn check_constants(&self, scene: &Scene) -> meshbake_core::Result<()> {
        let joints: &[Joint] = if self.emits_joints() { scene.joints() } else { &[] };
        let names = scene
            .pieces()
            .iter()
            .map(Piece::name)
            .chain(joints.iter().map(Joint::name));

        let mut seen: HashMap<String, &str> = HashMap::new();
        for name in names {
            match seen.entry(to_constant(name)) {
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateConstant {
                        name: entry.key().clone(),
                        first: entry.get().to_string(),
                        second: name.to_string(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(name);
                }
            }
        }
        Ok(())
    }

    /// Preamble, then every piece, then every joint, in scene order
    fn write_scene(&self, out: &mut dyn Write, scene: &Scene) -> io::Result<()> {
        self.write_preamble(out)?;
        for piece in scene.pieces() {
            self.write_piece(out, piece)?;
        }
        for joint in scene.joints() {
            self.write_joint(out, joint)?;
        }
        out.flush()
    }
}

/// Emitter for whichever dialect was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeEmitter {
    C(CEmitter),
    Rust(RustEmitter),
}

impl CodeEmitter {
    /// Pick the emitter for `options.dialect`
    pub fn new(options: &EmitOptions) -> Self {
        match options.dialect {
            Dialect::C => {
                if options.common_module.is_some() {
                    warn!("Common module only applies to the rust dialect; ignoring it");
                }
                CodeEmitter::C(CEmitter::new())
            }
            Dialect::Rust => CodeEmitter::Rust(RustEmitter::new(options.common_module.clone())),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            CodeEmitter::C(_) => Dialect::C,
            CodeEmitter::Rust(_) => Dialect::Rust,
        }
    }
}

impl Emitter for CodeEmitter {
    fn emits_joints(&self) -> bool {
        match self {
            CodeEmitter::C(e) => e.emits_joints(),
            CodeEmitter::Rust(e) => e.emits_joints(),
        }
    }

    fn write_preamble(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            CodeEmitter::C(e) => e.write_preamble(out),
            CodeEmitter::Rust(e) => e.write_preamble(out),
        }
    }

    fn write_piece(&self, out: &mut dyn Write, piece: &Piece) -> io::Result<()> {
        match self {
            CodeEmitter::C(e) => e.write_piece(out, piece),
            CodeEmitter::Rust(e) => e.write_piece(out, piece),
        }
    }

    fn write_joint(&self, out: &mut dyn Write, joint: &Joint) -> io::Result<()> {
        match self {
            CodeEmitter::C(e) => e.write_joint(out, joint),
            CodeEmitter::Rust(e) => e.write_joint(out, joint),
        }
    }
}

fn to_constant(name: &str) -> String {
    name.to_uppercase()
}

/// Upper-cased constant name for a node identifier
pub(crate) fn constant_name(name: &str) -> String {
    let constant = to_constant(name);
    let valid = constant
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && constant.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        warn!(name, "Node name is not a valid identifier; generated code will not compile");
    }
    constant
}

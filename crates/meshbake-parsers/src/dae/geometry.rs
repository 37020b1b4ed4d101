// meshbake-parsers/src/dae/geometry.rs
//! Geometry library structures: float sources and primitive groups

use std::collections::HashMap;

use crate::traits::{ParseError, ParseResult};

/// Vertex position semantic
pub const SEMANTIC_POSITION: &str = "POSITION";
/// Vertex normal semantic
pub const SEMANTIC_NORMAL: &str = "NORMAL";
/// Texture coordinate semantic
pub const SEMANTIC_TEXCOORD: &str = "TEXCOORD";

/// A `<source>` holding a float array read through an accessor
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Source id (without `#`)
    pub id: String,
    /// Raw float values
    pub data: Vec<f64>,
    /// Values per element
    pub stride: usize,
}

impl Source {
    /// Number of whole elements in the source
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.data.len() / self.stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index`, `stride` values long
    pub fn element(&self, index: usize) -> Option<&[f64]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.stride;
        self.data.get(start..start + self.stride)
    }
}

/// One `<input>` of a primitive group, with `VERTEX` already expanded to the
/// inputs of `<vertices>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Semantic name (POSITION, NORMAL, TEXCOORD, ...)
    pub semantic: String,
    /// Referenced source id (without `#`)
    pub source: String,
    /// Offset into each index tuple of `<p>`
    pub offset: usize,
    /// Input set, used to tell texture coordinate channels apart
    pub set: Option<u32>,
}

/// Primitive element kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `<triangles>`
    Triangles,
    /// `<polylist>` with per-polygon `<vcount>`
    Polylist,
    /// `<polygons>` with one `<p>` per polygon
    Polygons,
    /// Lines, strips and fans; counted but not triangulated
    Unsupported(String),
}

impl PrimitiveKind {
    /// Classify a primitive element name, `None` for non-primitive elements
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "triangles" => Some(PrimitiveKind::Triangles),
            "polylist" => Some(PrimitiveKind::Polylist),
            "polygons" => Some(PrimitiveKind::Polygons),
            "lines" | "linestrips" | "tristrips" | "trifans" => {
                Some(PrimitiveKind::Unsupported(name.to_string()))
            }
            _ => None,
        }
    }
}

/// One primitive group of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveGroup {
    /// Element kind
    pub kind: PrimitiveKind,
    /// Material symbol
    pub material: Option<String>,
    /// Inputs, in document order
    pub inputs: Vec<Input>,
    /// Indices per corner (highest input offset + 1)
    pub stride: usize,
    /// Interleaved `<p>` indices
    pub indices: Vec<usize>,
    /// Corners per polygon; empty for triangles
    pub vcounts: Vec<usize>,
}

impl PrimitiveGroup {
    /// First input with the given semantic
    pub fn input(&self, semantic: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.semantic == semantic)
    }

    /// Texture coordinate input with the lowest set
    pub fn texcoord_input(&self) -> Option<&Input> {
        self.inputs
            .iter()
            .filter(|i| i.semantic == SEMANTIC_TEXCOORD)
            .min_by_key(|i| i.set.unwrap_or(0))
    }

    /// Index stream for one input: every `stride`-th index starting at its offset
    pub fn index_stream(&self, input: &Input) -> Vec<usize> {
        if self.stride == 0 {
            return Vec::new();
        }
        self.indices
            .iter()
            .skip(input.offset)
            .step_by(self.stride)
            .copied()
            .collect()
    }

    /// Number of complete index tuples
    pub fn corner_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.indices.len() / self.stride
        }
    }

    /// Triangle count after triangulation, without validating the group
    pub fn triangle_count(&self) -> usize {
        match self.kind {
            PrimitiveKind::Triangles => self.corner_count() / 3,
            PrimitiveKind::Polylist | PrimitiveKind::Polygons => {
                self.vcounts.iter().map(|&v| v.saturating_sub(2)).sum()
            }
            PrimitiveKind::Unsupported(_) => 0,
        }
    }

    /// Corner numbers of each triangle, in winding order.
    ///
    /// Triangles are returned as-is; polygons are fan-triangulated around
    /// their first corner.
    pub fn triangle_corners(&self) -> ParseResult<Vec<[usize; 3]>> {
        let corners = self.corner_count();

        match &self.kind {
            PrimitiveKind::Triangles => {
                if corners % 3 != 0 {
                    return Err(ParseError::InvalidStructure(format!(
                        "triangles hold {} corners, not a multiple of 3",
                        corners
                    )));
                }
                Ok((0..corners / 3).map(|t| [3 * t, 3 * t + 1, 3 * t + 2]).collect())
            }
            PrimitiveKind::Polylist | PrimitiveKind::Polygons => {
                let declared: usize = self.vcounts.iter().sum();
                if declared != corners {
                    return Err(ParseError::InvalidStructure(format!(
                        "polygon vertex counts add up to {} but {} corners are indexed",
                        declared, corners
                    )));
                }

                let mut triangles = Vec::with_capacity(self.triangle_count());
                let mut base = 0;
                for &count in &self.vcounts {
                    if count < 3 {
                        return Err(ParseError::InvalidStructure(format!(
                            "polygon with {} corners",
                            count
                        )));
                    }
                    for i in 1..count - 1 {
                        triangles.push([base, base + i, base + i + 1]);
                    }
                    base += count;
                }
                Ok(triangles)
            }
            PrimitiveKind::Unsupported(name) => Err(ParseError::UnsupportedFeature(format!(
                "<{}> primitives cannot be triangulated",
                name
            ))),
        }
    }
}

/// A `<geometry>` from the geometry library
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Geometry id
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Float sources by id
    pub sources: HashMap<String, Source>,
    /// Primitive groups, in document order
    pub primitives: Vec<PrimitiveGroup>,
}

impl Geometry {
    /// Source an input reads from
    pub fn source_for(&self, input: &Input) -> Option<&Source> {
        self.sources.get(&input.source)
    }

    /// Triangle count across all triangulable groups
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(PrimitiveGroup::triangle_count).sum()
    }
}

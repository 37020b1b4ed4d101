//! Baked scene data model
//!
//! Everything here is built once per conversion and never mutated afterwards:
//! [`Vertex`] and [`Joint`] hold already-quantized values, and a [`Scene`] can
//! only be obtained from a [`SceneBuilder`], which enforces the naming and
//! triangle invariants.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::quantize::quantize;

/// 3D vector (position, normal, translation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise [`quantize`]
    pub fn quantized(&self) -> Self {
        Self {
            x: quantize(self.x),
            y: quantize(self.y),
            z: quantize(self.z),
        }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// 2D texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub s: f64,
    pub t: f64,
}

impl Vec2 {
    pub fn new(s: f64, t: f64) -> Self {
        Self { s, t }
    }

    /// Component-wise [`quantize`]
    pub fn quantized(&self) -> Self {
        Self {
            s: quantize(self.s),
            t: quantize(self.t),
        }
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// One triangle corner: position, texture coordinate and normal.
///
/// All eight components are quantized on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    position: Vec3,
    texcoord: Vec2,
    normal: Vec3,
}

impl Vertex {
    /// Build a vertex from raw attribute values
    pub fn new(position: impl Into<Vec3>, texcoord: impl Into<Vec2>, normal: impl Into<Vec3>) -> Self {
        Self {
            position: position.into().quantized(),
            texcoord: texcoord.into().quantized(),
            normal: normal.into().quantized(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn texcoord(&self) -> Vec2 {
        self.texcoord
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

/// Flattened triangle list for one geometry node
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    name: String,
    vertices: Vec<Vertex>,
}

impl Piece {
    /// Create a piece, rejecting vertex lists that do not form whole triangles
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>) -> Result<Self> {
        let name = name.into();
        if vertices.len() % 3 != 0 {
            return Err(Error::PartialTriangle {
                name,
                count: vertices.len(),
            });
        }
        Ok(Self { name, vertices })
    }

    /// Node identifier this piece was extracted from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Vertices grouped per triangle, in winding order
    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Local translation of a bone node
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    position: Vec3,
}

impl Joint {
    /// Create a joint; the translation is quantized component-wise
    pub fn new(name: impl Into<String>, translation: impl Into<Vec3>) -> Self {
        Self {
            name: name.into(),
            position: translation.into().quantized(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

/// Every piece and joint extracted from one document, in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pieces: Vec<Piece>,
    joints: Vec<Joint>,
}

impl Scene {
    /// Start building a scene
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Find piece by node name
    pub fn piece(&self, name: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.name == name)
    }

    /// Find joint by node name
    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Total vertex count across all pieces
    pub fn vertex_count(&self) -> usize {
        self.pieces.iter().map(Piece::vertex_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty() && self.joints.is_empty()
    }
}

/// Collects pieces and joints, rejecting duplicate names
#[derive(Debug, Default)]
pub struct SceneBuilder {
    pieces: Vec<Piece>,
    joints: Vec<Joint>,
    piece_names: HashSet<String>,
    joint_names: HashSet<String>,
}

impl SceneBuilder {
    /// Add a piece; its name must not have been used by another piece
    pub fn add_piece(&mut self, piece: Piece) -> Result<&mut Self> {
        if !self.piece_names.insert(piece.name.clone()) {
            return Err(Error::DuplicatePiece { name: piece.name });
        }
        self.pieces.push(piece);
        Ok(self)
    }

    /// Add a joint; its name must not have been used by another joint
    pub fn add_joint(&mut self, joint: Joint) -> Result<&mut Self> {
        if !self.joint_names.insert(joint.name.clone()) {
            return Err(Error::DuplicateJoint { name: joint.name });
        }
        self.joints.push(joint);
        Ok(self)
    }

    /// Finish building
    pub fn build(self) -> Scene {
        Scene {
            pieces: self.pieces,
            joints: self.joints,
        }
    }
}

//! Geometry node to Piece conversion

use meshbake_core::{Error, Piece, Vertex};
use meshbake_parsers::dae::{SEMANTIC_NORMAL, SEMANTIC_POSITION, SEMANTIC_TEXCOORD};
use meshbake_parsers::{DaeDocument, Geometry, Input, ParseError, PrimitiveGroup, SceneNode, Source};
use tracing::{debug, warn};

use super::NodeSelector;
use crate::error::BakeResult;

/// Extract one piece per selected geometry node, in traversal order
pub fn extract_pieces(document: &DaeDocument, selector: &NodeSelector) -> BakeResult<Vec<Piece>> {
    if let NodeSelector::Named(names) = selector {
        for name in names {
            let known = document
                .scene
                .geometry_nodes()
                .any(|node| node.identifier() == Some(name.as_str()));
            if !known {
                return Err(Error::UnknownPiece { name: name.clone() }.into());
            }
        }
    }

    let mut pieces = Vec::new();
    for node in document.scene.geometry_nodes() {
        let Some(name) = node.identifier() else {
            continue;
        };
        if !selector.includes(name) {
            continue;
        }
        pieces.push(extract_piece(document, node, name)?);
    }

    if pieces.is_empty() {
        warn!("No geometry nodes selected; output will hold boilerplate only");
    }
    Ok(pieces)
}

fn extract_piece(document: &DaeDocument, node: &SceneNode, name: &str) -> BakeResult<Piece> {
    let geometry_id = node.geometry.as_deref().unwrap_or_default();
    let geometry = document
        .geometry(geometry_id)
        .ok_or_else(|| ParseError::UnresolvedReference(format!("#{}", geometry_id)))?;

    let group = single_group(geometry)?;
    let streams = CornerStreams::resolve(geometry, group)?;
    let triangles = group
        .triangle_corners()
        .map_err(|e| e.with_context(format!("geometry {}", geometry.id)))?;

    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for corner in triangles.iter().flatten() {
        vertices.push(streams.vertex(&geometry.id, *corner)?);
    }

    debug!(piece = name, geometry = %geometry.id, vertices = vertices.len(), "Extracted piece");
    Ok(Piece::new(name, vertices)?)
}

fn single_group(geometry: &Geometry) -> BakeResult<&PrimitiveGroup> {
    match geometry.primitives.as_slice() {
        [group] => Ok(group),
        [] => Err(Error::MissingPrimitives {
            geometry: geometry.id.clone(),
        }
        .into()),
        groups => Err(Error::MultiplePrimitiveGroups {
            geometry: geometry.id.clone(),
            count: groups.len(),
        }
        .into()),
    }
}

/// One index stream per required semantic, each paired with its source
struct CornerStreams<'a> {
    positions: Stream<'a>,
    texcoords: Stream<'a>,
    normals: Stream<'a>,
}

struct Stream<'a> {
    semantic: &'static str,
    source: &'a Source,
    indices: Vec<usize>,
}

impl<'a> CornerStreams<'a> {
    fn resolve(geometry: &'a Geometry, group: &PrimitiveGroup) -> BakeResult<Self> {
        let positions = Stream::resolve(geometry, group, SEMANTIC_POSITION, group.input(SEMANTIC_POSITION))?;
        let normals = Stream::resolve(geometry, group, SEMANTIC_NORMAL, group.input(SEMANTIC_NORMAL))?;
        let texcoords = Stream::resolve(geometry, group, SEMANTIC_TEXCOORD, group.texcoord_input())?;

        if positions.indices.len() != normals.indices.len()
            || positions.indices.len() != texcoords.indices.len()
        {
            return Err(Error::IndexStreamMismatch {
                geometry: geometry.id.clone(),
                positions: positions.indices.len(),
                normals: normals.indices.len(),
                texcoords: texcoords.indices.len(),
            }
            .into());
        }

        Ok(Self {
            positions,
            texcoords,
            normals,
        })
    }

    fn vertex(&self, geometry_id: &str, corner: usize) -> BakeResult<Vertex> {
        let position: [f64; 3] = self.positions.fetch(geometry_id, corner)?;
        let texcoord: [f64; 2] = self.texcoords.fetch(geometry_id, corner)?;
        let normal: [f64; 3] = self.normals.fetch(geometry_id, corner)?;
        Ok(Vertex::new(position, texcoord, normal))
    }
}

impl<'a> Stream<'a> {
    fn resolve(
        geometry: &'a Geometry,
        group: &PrimitiveGroup,
        semantic: &'static str,
        input: Option<&Input>,
    ) -> BakeResult<Self> {
        let input = input.ok_or_else(|| Error::MissingInput {
            geometry: geometry.id.clone(),
            semantic: semantic.to_string(),
        })?;
        let source = geometry
            .source_for(input)
            .ok_or_else(|| ParseError::UnresolvedReference(format!("#{} in geometry {}", input.source, geometry.id)))?;

        Ok(Self {
            semantic,
            source,
            indices: group.index_stream(input),
        })
    }

    /// First `N` components of the element the corner points at
    fn fetch<const N: usize>(&self, geometry_id: &str, corner: usize) -> BakeResult<[f64; N]> {
        let index = self.indices.get(corner).copied().ok_or_else(|| {
            Error::invalid_data(format!(
                "corner {} has no {} index in geometry {}",
                corner, self.semantic, geometry_id
            ))
        })?;

        let element = self.source.element(index).ok_or_else(|| Error::IndexOutOfRange {
            geometry: geometry_id.to_string(),
            semantic: self.semantic.to_string(),
            index,
            len: self.source.len(),
        })?;

        let values = element.get(..N).and_then(|head| <[f64; N]>::try_from(head).ok());
        values.ok_or_else(|| {
            Error::invalid_data(format!(
                "{} source {} has stride {}, need at least {}",
                self.semantic, self.source.id, self.source.stride, N
            ))
            .into()
        })
    }
}

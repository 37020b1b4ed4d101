// meshbake-parsers/src/dae/mod.rs
//! COLLADA (DAE) scene document parser
//!
//! Only the parts of a COLLADA document needed to bake vertex data are read:
//!
//! ```text
//! <COLLADA>
//! ├── <library_geometries>
//! │   └── <geometry id>
//! │       └── <mesh>
//! │           ├── <source id> <float_array/> <accessor stride/>
//! │           ├── <vertices id> <input semantic="POSITION"/>
//! │           └── <triangles | polylist | polygons> <input offset/> <p/>
//! └── <library_visual_scenes>
//!     └── <visual_scene>            (first one is the default scene)
//!         └── <node id>             (nested nodes are traversed too)
//!             ├── <matrix | translate | rotate | scale>
//!             └── <instance_geometry url="#geometry-id"/>
//! ```
//!
//! Everything else (materials, controllers, animations, cameras) is skipped.

mod geometry;
mod scene;
mod transform;

pub use geometry::{
    Geometry, Input, PrimitiveGroup, PrimitiveKind, Source, SEMANTIC_NORMAL, SEMANTIC_POSITION,
    SEMANTIC_TEXCOORD,
};
pub use scene::{PieceSummary, SceneGraph, SceneNode};
pub use transform::{
    from_row_major, multiply_matrices, rotate, scale, translate, translation_of, Matrix4,
    IDENTITY_MATRIX,
};

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};
use xmltree::{Element, XMLNode};

use crate::logging::instrument_parse;
use crate::traits::{ParseError, ParseOptions, ParseResult, Parser};

/// Root element name of a COLLADA document
const COLLADA_ROOT: &str = "COLLADA";

/// Parsed COLLADA document: the default scene and the geometry library
#[derive(Debug, Clone)]
pub struct DaeDocument {
    /// `version` attribute of the root element
    pub version: Option<String>,
    /// Default visual scene
    pub scene: SceneGraph,
    geometries: Vec<Geometry>,
}

impl DaeDocument {
    /// Create a document from already-built parts
    pub fn new(version: Option<String>, scene: SceneGraph, geometries: Vec<Geometry>) -> Self {
        Self {
            version,
            scene,
            geometries,
        }
    }

    /// Find geometry by id
    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        self.geometries.iter().find(|g| g.id == id)
    }

    /// All geometries, in library order
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    /// Geometry node summaries in traversal order
    pub fn piece_summaries(&self) -> Vec<PieceSummary> {
        self.scene
            .geometry_nodes()
            .filter_map(|node| {
                let name = node.identifier()?;
                let geometry_id = node.geometry.as_deref()?;
                Some(PieceSummary {
                    name: name.to_string(),
                    geometry: geometry_id.to_string(),
                    triangles: self.geometry(geometry_id).map(Geometry::triangle_count).unwrap_or(0),
                })
            })
            .collect()
    }

    /// Joint node identifiers in traversal order
    pub fn joint_names(&self) -> Vec<&str> {
        self.scene.joint_nodes().filter_map(SceneNode::identifier).collect()
    }
}

/// COLLADA parser
#[derive(Debug, Default)]
pub struct DaeParser;

impl DaeParser {
    /// Create a new COLLADA parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a document held in memory
    pub fn parse_str(&self, text: &str) -> ParseResult<DaeDocument> {
        self.parse(text.as_bytes())
    }

    /// Parse a document held in memory with custom options
    pub fn parse_str_with_options(&self, text: &str, options: &ParseOptions) -> ParseResult<DaeDocument> {
        self.parse_with_options(text.as_bytes(), options)
    }

    fn parse_document(&self, root: &Element, options: &ParseOptions) -> ParseResult<DaeDocument> {
        if root.name != COLLADA_ROOT {
            return Err(ParseError::UnexpectedRoot {
                expected: COLLADA_ROOT.to_string(),
                found: root.name.clone(),
            });
        }

        let mut geometries = Vec::new();
        for library in children_named(root, "library_geometries") {
            for element in children_named(library, "geometry") {
                let geometry = parse_geometry(element)?;
                debug!(
                    geometry = %geometry.id,
                    primitives = geometry.primitives.len(),
                    "Parsed geometry"
                );
                geometries.push(geometry);
            }
        }

        let visual_scene = children_named(root, "library_visual_scenes")
            .flat_map(|library| children_named(library, "visual_scene"))
            .next()
            .ok_or_else(|| ParseError::MissingField("library_visual_scenes/visual_scene".into()))?;

        let scene = parse_visual_scene(visual_scene, options)?;

        let document = DaeDocument::new(root.attributes.get("version").cloned(), scene, geometries);

        for node in document.scene.nodes() {
            if let Some(ref geometry_id) = node.geometry {
                if document.geometry(geometry_id).is_none() {
                    return Err(ParseError::UnresolvedReference(format!(
                        "#{} (instanced by node {})",
                        geometry_id,
                        node.identifier().unwrap_or("<anonymous>")
                    )));
                }
            }
        }

        Ok(document)
    }
}

impl Parser for DaeParser {
    type Output = DaeDocument;

    fn extensions(&self) -> &[&str] {
        &["dae"]
    }

    fn name(&self) -> &str {
        "COLLADA Parser"
    }

    fn parse_with_options<R: Read>(&self, reader: R, options: &ParseOptions) -> ParseResult<Self::Output> {
        instrument_parse(self.name(), || {
            let root = Element::parse(reader)?;
            self.parse_document(&root, options)
        })
    }

    fn parse_file_with_options(&self, path: &Path, options: &ParseOptions) -> ParseResult<Self::Output> {
        crate::log_parse_start!(self.name(), path);
        let start = Instant::now();

        let result = std::fs::File::open(path)
            .map_err(ParseError::from)
            .and_then(|file| self.parse_with_options(std::io::BufReader::new(file), options));

        match result {
            Ok(document) => {
                crate::log_parse_complete!(self.name(), start.elapsed(), document.scene.node_count());
                Ok(document)
            }
            Err(e) => {
                crate::log_parse_error!(self.name(), &e);
                Err(e.with_context(path.display().to_string()))
            }
        }
    }
}

/// Child elements, skipping text and comments
fn elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) => Some(e),
        _ => None,
    })
}

/// Child elements with the given name
fn children_named<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    elements(parent).filter(move |e| e.name == name)
}

/// Strip the `#` from a local URI fragment
fn strip_ref(url: &str) -> &str {
    url.strip_prefix('#').unwrap_or(url)
}

fn required_attr<'a>(element: &'a Element, attr: &str) -> ParseResult<&'a str> {
    element
        .attributes
        .get(attr)
        .map(String::as_str)
        .ok_or_else(|| ParseError::MissingField(format!("<{}> {}", element.name, attr)))
}

fn parse_number<T: std::str::FromStr>(text: &str, context: &str) -> ParseResult<T> {
    text.parse().map_err(|_| ParseError::InvalidNumber {
        text: text.to_string(),
        context: context.to_string(),
    })
}

fn parse_list<T: std::str::FromStr>(element: &Element) -> ParseResult<Vec<T>> {
    let text = element.get_text().unwrap_or_default();
    text.split_whitespace()
        .map(|token| parse_number(token, &element.name))
        .collect()
}

fn parse_fixed<const N: usize>(element: &Element) -> ParseResult<[f64; N]> {
    let values: Vec<f64> = parse_list(element)?;
    let count = values.len();
    values.try_into().map_err(|_| {
        ParseError::InvalidStructure(format!(
            "<{}> holds {} values, expected {}",
            element.name, count, N
        ))
    })
}

fn optional_number<T: std::str::FromStr>(element: &Element, attr: &str) -> ParseResult<Option<T>> {
    element
        .attributes
        .get(attr)
        .map(|text| parse_number(text, &format!("<{}> {}", element.name, attr)))
        .transpose()
}

fn parse_geometry(element: &Element) -> ParseResult<Geometry> {
    let id = required_attr(element, "id")?.to_string();
    let name = element.attributes.get("name").cloned();

    let mut geometry = Geometry {
        id,
        name,
        sources: HashMap::new(),
        primitives: Vec::new(),
    };

    // splines and convex meshes carry no primitives
    let Some(mesh) = element.get_child("mesh") else {
        return Ok(geometry);
    };

    let context = format!("geometry {}", geometry.id);

    for source_element in children_named(mesh, "source") {
        if let Some(source) = parse_source(source_element).map_err(|e| e.with_context(context.clone()))? {
            geometry.sources.insert(source.id.clone(), source);
        }
    }

    let vertices = mesh.get_child("vertices");
    let vertices_id = vertices.map(|v| required_attr(v, "id")).transpose()?;
    let vertex_inputs: Vec<(String, String)> = match vertices {
        Some(v) => children_named(v, "input")
            .map(|input| {
                Ok((
                    required_attr(input, "semantic")?.to_string(),
                    strip_ref(required_attr(input, "source")?).to_string(),
                ))
            })
            .collect::<ParseResult<_>>()?,
        None => Vec::new(),
    };

    for child in elements(mesh) {
        let Some(kind) = PrimitiveKind::from_element_name(&child.name) else {
            continue;
        };
        let group = parse_primitive(child, kind, vertices_id, &vertex_inputs)
            .map_err(|e| e.with_context(context.clone()))?;
        geometry.primitives.push(group);
    }

    Ok(geometry)
}

fn parse_source(element: &Element) -> ParseResult<Option<Source>> {
    let id = required_attr(element, "id")?.to_string();

    // name and IDREF arrays are not vertex data
    let Some(array) = element.get_child("float_array") else {
        return Ok(None);
    };
    let data: Vec<f64> = parse_list(array).map_err(|e| e.with_context(format!("source {}", id)))?;

    let stride = element
        .get_child("technique_common")
        .and_then(|tc| tc.get_child("accessor"))
        .map(|accessor| optional_number::<usize>(accessor, "stride"))
        .transpose()?
        .flatten()
        .unwrap_or(1);

    if stride == 0 {
        return Err(ParseError::InvalidStructure(format!("source {} has stride 0", id)));
    }

    Ok(Some(Source { id, data, stride }))
}

fn parse_primitive(
    element: &Element,
    kind: PrimitiveKind,
    vertices_id: Option<&str>,
    vertex_inputs: &[(String, String)],
) -> ParseResult<PrimitiveGroup> {
    let mut inputs = Vec::new();
    let mut max_offset = None;

    for input in children_named(element, "input") {
        let semantic = required_attr(input, "semantic")?;
        let source = strip_ref(required_attr(input, "source")?);
        let offset = optional_number::<usize>(input, "offset")?.unwrap_or(0);
        let set = optional_number::<u32>(input, "set")?;
        max_offset = max_offset.max(Some(offset));

        if semantic == "VERTEX" {
            if vertices_id != Some(source) {
                return Err(ParseError::UnresolvedReference(format!("#{} (VERTEX input)", source)));
            }
            for (vertex_semantic, vertex_source) in vertex_inputs {
                inputs.push(Input {
                    semantic: vertex_semantic.clone(),
                    source: vertex_source.clone(),
                    offset,
                    set: None,
                });
            }
        } else {
            inputs.push(Input {
                semantic: semantic.to_string(),
                source: source.to_string(),
                offset,
                set,
            });
        }
    }

    let stride = max_offset
        .map(|offset| offset + 1)
        .ok_or_else(|| ParseError::MissingField(format!("<{}> input", element.name)))?;

    let mut indices = Vec::new();
    let mut vcounts = Vec::new();

    match kind {
        PrimitiveKind::Polygons => {
            if element.get_child("ph").is_some() {
                return Err(ParseError::UnsupportedFeature("polygons with holes".into()));
            }
            for p in children_named(element, "p") {
                let polygon: Vec<usize> = parse_list(p)?;
                if polygon.len() % stride != 0 {
                    return Err(ParseError::InvalidStructure(format!(
                        "polygon holds {} indices, not a multiple of {}",
                        polygon.len(),
                        stride
                    )));
                }
                vcounts.push(polygon.len() / stride);
                indices.extend(polygon);
            }
        }
        PrimitiveKind::Polylist => {
            if let Some(vcount) = element.get_child("vcount") {
                vcounts = parse_list(vcount)?;
            }
            if let Some(p) = element.get_child("p") {
                indices = parse_list(p)?;
            }
        }
        PrimitiveKind::Triangles | PrimitiveKind::Unsupported(_) => {
            if let Some(p) = element.get_child("p") {
                indices = parse_list(p)?;
            }
        }
    }

    Ok(PrimitiveGroup {
        kind,
        material: element.attributes.get("material").cloned(),
        inputs,
        stride,
        indices,
        vcounts,
    })
}

fn parse_visual_scene(element: &Element, options: &ParseOptions) -> ParseResult<SceneGraph> {
    let mut nodes = Vec::new();
    for node in children_named(element, "node") {
        collect_nodes(node, None, 0, options, &mut nodes)?;
    }
    Ok(SceneGraph::new(
        element.attributes.get("id").cloned(),
        nodes,
        options.bone_suffix.clone(),
    ))
}

/// Append `element` and its descendants to `out` in depth-first pre-order
fn collect_nodes(
    element: &Element,
    parent: Option<usize>,
    depth: usize,
    options: &ParseOptions,
    out: &mut Vec<SceneNode>,
) -> ParseResult<()> {
    let id = element.attributes.get("id").cloned();
    let name = element.attributes.get("name").cloned();
    let label = id.clone().or_else(|| name.clone()).unwrap_or_else(|| "<anonymous>".into());

    let mut transform = IDENTITY_MATRIX;
    let mut instances = Vec::new();

    for child in elements(element) {
        let local = match child.name.as_str() {
            "matrix" => from_row_major(&parse_fixed::<16>(child)?),
            "translate" => translate(parse_fixed::<3>(child)?),
            "scale" => scale(parse_fixed::<3>(child)?),
            "rotate" => {
                let [x, y, z, angle] = parse_fixed::<4>(child)?;
                rotate([x, y, z], angle)
            }
            "lookat" | "skew" => {
                warn!(node = %label, transform = %child.name, "Ignoring unsupported transform element");
                continue;
            }
            other if other == "node" || other.starts_with("instance_") => {
                instances.push(child);
                continue;
            }
            _ => continue,
        };
        transform = multiply_matrices(transform, local);
    }

    let geometry = match instances.first() {
        Some(first) if first.name == "instance_geometry" => {
            Some(strip_ref(required_attr(first, "url")?).to_string())
        }
        _ => None,
    };

    // child nodes are traversed on their own; only sibling instances are lost
    let extra = instances.iter().skip(1).filter(|e| e.name != "node").count();
    if geometry.is_some() && extra > 0 {
        if options.strict_validation {
            return Err(ParseError::InvalidStructure(format!(
                "node {} has {} instance children besides its geometry",
                label, extra
            )));
        }
        debug!(node = %label, extra, "Ignoring instances after geometry");
    }

    let index = out.len();
    out.push(SceneNode {
        id,
        name,
        parent,
        depth,
        transform,
        geometry,
        instance_count: instances.len(),
    });

    for child in instances.into_iter().filter(|e| e.name == "node") {
        collect_nodes(child, Some(index), depth + 1, options, out)?;
    }

    Ok(())
}

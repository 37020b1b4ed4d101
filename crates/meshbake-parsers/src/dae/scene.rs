// meshbake-parsers/src/dae/scene.rs
//! Visual scene node hierarchy

use serde::Serialize;

use super::transform::{translation_of, Matrix4, IDENTITY_MATRIX};

/// A `<node>` of the visual scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// `id` attribute
    pub id: Option<String>,
    /// `name` attribute
    pub name: Option<String>,
    /// Index of the parent node in traversal order
    pub parent: Option<usize>,
    /// Nesting depth (0 = top level)
    pub depth: usize,
    /// Local transform composed from the node's transform elements
    pub transform: Matrix4,
    /// Geometry id when the first instance child is `<instance_geometry>`
    pub geometry: Option<String>,
    /// Instance children (nodes and `instance_*` elements)
    pub instance_count: usize,
}

impl SceneNode {
    /// Create a top-level node with an identity transform
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            parent: None,
            depth: 0,
            transform: IDENTITY_MATRIX,
            geometry: None,
            instance_count: 0,
        }
    }

    /// Identifier used for pieces and joints: the id, else the name
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().or(self.name.as_deref())
    }

    /// Check if the node's first instance child references a geometry
    pub fn is_geometry_node(&self) -> bool {
        self.geometry.is_some() && self.identifier().is_some()
    }

    /// Check if the identifier carries the bone suffix
    pub fn is_joint_node(&self, bone_suffix: &str) -> bool {
        self.identifier()
            .map(|id| id.ends_with(bone_suffix))
            .unwrap_or(false)
    }

    /// Translation column of the local transform
    pub fn translation(&self) -> [f64; 3] {
        translation_of(&self.transform)
    }

    /// Check if this is a top-level node
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Summary of a geometry node, for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceSummary {
    /// Node identifier
    pub name: String,
    /// Referenced geometry id
    pub geometry: String,
    /// Triangles after triangulation
    pub triangles: usize,
}

/// Nodes of one visual scene in depth-first pre-order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneGraph {
    /// Visual scene id
    pub id: Option<String>,
    nodes: Vec<SceneNode>,
    bone_suffix: String,
}

impl SceneGraph {
    /// Create a graph from nodes already in traversal order
    pub fn new(id: Option<String>, nodes: Vec<SceneNode>, bone_suffix: impl Into<String>) -> Self {
        Self {
            id,
            nodes,
            bone_suffix: bone_suffix.into(),
        }
    }

    /// All nodes, parents before children
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Suffix marking joint nodes
    pub fn bone_suffix(&self) -> &str {
        &self.bone_suffix
    }

    /// Geometry nodes in traversal order
    pub fn geometry_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|n| n.is_geometry_node())
    }

    /// Joint nodes in traversal order
    pub fn joint_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.is_joint_node(&self.bone_suffix))
    }

    /// Find a node by identifier
    pub fn find(&self, identifier: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.identifier() == Some(identifier))
    }

    /// Children of a node, by traversal index
    pub fn children(&self, index: usize) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.parent == Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> SceneGraph {
        let mut head = SceneNode::new("head");
        head.geometry = Some("head-mesh".into());
        head.instance_count = 1;

        let mut spine = SceneNode::new("spine_bone");
        spine.parent = Some(0);
        spine.depth = 1;

        let mut named = SceneNode::new("unused");
        named.id = None;
        named.name = Some("arm".into());
        named.geometry = Some("arm-mesh".into());

        SceneGraph::new(Some("Scene".into()), vec![head, spine, named], "_bone")
    }

    #[test]
    fn test_identifier_falls_back_to_name() {
        let g = graph();
        assert_eq!(g.nodes()[2].identifier(), Some("arm"));
        assert!(g.find("arm").is_some());
    }

    #[test]
    fn test_classification() {
        let g = graph();
        let geometry: Vec<_> = g.geometry_nodes().filter_map(SceneNode::identifier).collect();
        let joints: Vec<_> = g.joint_nodes().filter_map(SceneNode::identifier).collect();
        assert_eq!(geometry, ["head", "arm"]);
        assert_eq!(joints, ["spine_bone"]);
    }

    #[test]
    fn test_children() {
        let g = graph();
        let kids: Vec<_> = g.children(0).filter_map(SceneNode::identifier).collect();
        assert_eq!(kids, ["spine_bone"]);
        assert!(!g.nodes()[1].is_root());
    }

    #[test]
    fn test_node_can_be_geometry_and_joint() {
        let mut node = SceneNode::new("jaw_bone");
        node.geometry = Some("jaw-mesh".into());
        assert!(node.is_geometry_node());
        assert!(node.is_joint_node("_bone"));
    }
}

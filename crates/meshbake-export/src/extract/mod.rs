//! Vertex and joint extraction from a parsed document

mod joints;
mod mesh;

pub use joints::extract_joints;
pub use mesh::extract_pieces;

use meshbake_core::Scene;
use meshbake_parsers::DaeDocument;
use tracing::debug;

use crate::error::BakeResult;

/// Which geometry nodes become pieces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeSelector {
    /// Every geometry node of the default scene
    #[default]
    All,
    /// Only the listed node identifiers
    Named(Vec<String>),
}

impl NodeSelector {
    /// Select the given names; duplicates are dropped
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
        NodeSelector::Named(selected)
    }

    /// Check if a node identifier is selected
    pub fn includes(&self, identifier: &str) -> bool {
        match self {
            NodeSelector::All => true,
            NodeSelector::Named(names) => names.iter().any(|n| n == identifier),
        }
    }

    /// Check if nothing can be selected
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeSelector::Named(names) if names.is_empty())
    }
}

/// Extract the selected pieces and every joint into one scene
pub fn extract_scene(document: &DaeDocument, selector: &NodeSelector) -> BakeResult<Scene> {
    let mut builder = Scene::builder();

    for piece in extract_pieces(document, selector)? {
        builder.add_piece(piece)?;
    }
    for joint in extract_joints(&document.scene) {
        builder.add_joint(joint)?;
    }

    let scene = builder.build();
    debug!(
        pieces = scene.pieces().len(),
        joints = scene.joints().len(),
        vertices = scene.vertex_count(),
        "Extracted scene"
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_selector_dedups_in_order() {
        let selector = NodeSelector::named(["torso", "head", "torso"]);
        assert_eq!(selector, NodeSelector::Named(vec!["torso".into(), "head".into()]));
        assert!(selector.includes("head"));
        assert!(!selector.includes("arm"));
    }

    #[test]
    fn test_empty_selector() {
        assert!(NodeSelector::named(Vec::<String>::new()).is_empty());
        assert!(!NodeSelector::All.is_empty());
        assert!(NodeSelector::All.includes("anything"));
    }
}

//! Bone node translations

use meshbake_core::Joint;
use meshbake_parsers::SceneGraph;
use tracing::trace;

/// Local translation of every joint node, in traversal order.
///
/// Ancestor transforms are not composed in; the position is the translation
/// column of the node's own matrix.
pub fn extract_joints(graph: &SceneGraph) -> Vec<Joint> {
    graph
        .joint_nodes()
        .filter_map(|node| {
            let name = node.identifier()?;
            let joint = Joint::new(name, node.translation());
            trace!(joint = name, position = ?joint.position(), "Extracted joint");
            Some(joint)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbake_core::Vec3;
    use meshbake_parsers::dae::{multiply_matrices, rotate, translate};
    use meshbake_parsers::SceneNode;

    #[test]
    fn test_translation_column_only() {
        let mut root = SceneNode::new("root_bone");
        root.transform = translate([10.0, 0.0, 0.0]);

        let mut child = SceneNode::new("spine_bone");
        child.parent = Some(0);
        child.depth = 1;
        child.transform = multiply_matrices(translate([1.5, 2.25, 0.0]), rotate([0.0, 0.0, 1.0], 90.0));

        let mut mesh = SceneNode::new("head");
        mesh.geometry = Some("head-mesh".into());

        let graph = SceneGraph::new(None, vec![root, child, mesh], "_bone");
        let joints = extract_joints(&graph);

        let names: Vec<_> = joints.iter().map(Joint::name).collect();
        assert_eq!(names, ["root_bone", "spine_bone"]);
        assert_eq!(joints[1].position(), Vec3::new(1.5, 2.25, 0.0));
    }

    #[test]
    fn test_translation_is_quantized() {
        let mut node = SceneNode::new("tail_bone");
        node.transform = translate([0.123456, -98.7654, 1e-7]);
        let graph = SceneGraph::new(None, vec![node], "_bone");

        let joint = &extract_joints(&graph)[0];
        assert_eq!(joint.position().x, 0.123);
        assert_eq!(joint.position().y, -98.8);
    }

    #[test]
    fn test_custom_suffix() {
        let graph = SceneGraph::new(None, vec![SceneNode::new("spine_bone"), SceneNode::new("Spine.jnt")], ".jnt");
        let joints = extract_joints(&graph);
        assert_eq!(joints.len(), 1);
        assert_eq!(joints[0].name(), "Spine.jnt");
    }
}

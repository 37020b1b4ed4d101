//! Rust dialect

use std::io::{self, Write};

use meshbake_core::{format_fixed, Joint, Piece, Vertex};

use super::{constant_name, Emitter};

const VERTEX_STRUCT: &str = "#[derive(Copy, Clone)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
}

implement_vertex!(Vertex, position, texcoord, normal);
";

/// Writes `pub const` slices of `Vertex` and `nalgebra::Vec3<f32>` joints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RustEmitter {
    common_module: Option<String>,
}

impl RustEmitter {
    /// `common_module` names the module the `Vertex` struct is imported from;
    /// `None` defines it inline.
    pub fn new(common_module: Option<String>) -> Self {
        Self { common_module }
    }

    pub fn common_module(&self) -> Option<&str> {
        self.common_module.as_deref()
    }

    /// Shared `Vertex` definition for files that import it
    pub fn write_common(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "extern crate nalgebra;")?;
        out.write_all(VERTEX_STRUCT.as_bytes())?;
        out.flush()
    }

    fn write_vertex(&self, out: &mut dyn Write, vertex: &Vertex) -> io::Result<()> {
        let p = vertex.position();
        let t = vertex.texcoord();
        let n = vertex.normal();
        writeln!(
            out,
            "    Vertex {{ position: [{}, {}, {}],  texcoord: [{}, {}],  normal: [{}, {}, {}] }},",
            format_fixed(p.x),
            format_fixed(p.y),
            format_fixed(p.z),
            format_fixed(t.s),
            format_fixed(t.t),
            format_fixed(n.x),
            format_fixed(n.y),
            format_fixed(n.z),
        )
    }
}

impl Emitter for RustEmitter {
    fn write_preamble(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.common_module {
            Some(module) => write!(out, "extern crate nalgebra;\nuse {}::Vertex;", module),
            None => {
                writeln!(out, "extern crate nalgebra;")?;
                out.write_all(VERTEX_STRUCT.as_bytes())
            }
        }
    }

    fn write_piece(&self, out: &mut dyn Write, piece: &Piece) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "pub const {}: &'static [Vertex] = &[", constant_name(piece.name()))?;
        for vertex in piece.vertices() {
            self.write_vertex(out, vertex)?;
        }
        writeln!(out, "    ];")
    }

    fn write_joint(&self, out: &mut dyn Write, joint: &Joint) -> io::Result<()> {
        let p = joint.position();
        writeln!(out)?;
        writeln!(
            out,
            "pub const {}: &'static nalgebra::Vec3<f32> = &nalgebra::Vec3{{ x: {}, y: {}, z: {} }};",
            constant_name(joint.name()),
            format_fixed(p.x),
            format_fixed(p.y),
            format_fixed(p.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbake_core::Scene;

    fn render(emitter: &RustEmitter, scene: &Scene) -> String {
        let mut out = Vec::new();
        emitter.write_scene(&mut out, scene).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn scene() -> Scene {
        let mut builder = Scene::builder();
        builder
            .add_piece(
                Piece::new(
                    "head",
                    vec![
                        Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
                        Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
                        Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
                    ],
                )
                .unwrap(),
            )
            .unwrap()
            .add_joint(Joint::new("spine_bone", [1.5, 2.25, 0.0]))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_inline_struct() {
        let text = render(&RustEmitter::new(None), &scene());
        assert!(text.starts_with("extern crate nalgebra;\n#[derive(Copy, Clone)]\npub struct Vertex {"));
        assert!(text.contains("implement_vertex!(Vertex, position, texcoord, normal);"));
        assert!(!text.contains("use "));
    }

    #[test]
    fn test_piece_and_joint_lines() {
        let text = render(&RustEmitter::new(Some("steve_common".into())), &scene());

        assert!(text.starts_with("extern crate nalgebra;\nuse steve_common::Vertex;\n"));
        assert!(!text.contains("pub struct Vertex"));
        assert!(text.contains(
            "pub const HEAD: &'static [Vertex] = &[\n    Vertex { position: [0.0000, 0.0000, 0.0000],  \
             texcoord: [0.0000, 0.0000],  normal: [0.0000, 0.0000, 1.0000] },\n"
        ));
        assert!(text.contains("    ];\n"));
        assert!(text.ends_with(
            "\npub const SPINE_BONE: &'static nalgebra::Vec3<f32> = \
             &nalgebra::Vec3{ x: 1.5000, y: 2.2500, z: 0.0000 };\n"
        ));
    }

    #[test]
    fn test_common_definitions() {
        let mut out = Vec::new();
        RustEmitter::default().write_common(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\nextern crate nalgebra;\n#[derive(Copy, Clone)]\n"));
        assert!(text.ends_with("implement_vertex!(Vertex, position, texcoord, normal);\n"));
    }
}

//! C dialect

use std::io::{self, Write};

use meshbake_core::{format_fixed, Joint, Piece, Vertex};

use super::{constant_name, Emitter};

const VERTEX_STRUCT: &str = "struct vertex {
    float x, y, z;
    float s, t;
    float nx, ny, nz;
};
";

/// Writes `static const struct vertex` arrays. Joints are not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CEmitter;

impl CEmitter {
    pub fn new() -> Self {
        Self
    }

    fn write_vertex(&self, out: &mut dyn Write, vertex: &Vertex) -> io::Result<()> {
        let p = vertex.position();
        let t = vertex.texcoord();
        let n = vertex.normal();
        let fields = [p.x, p.y, p.z, t.s, t.t, n.x, n.y, n.z]
            .iter()
            .map(|&v| format!("{}f", format_fixed(v)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "    {{ {} }},", fields)
    }
}

impl Emitter for CEmitter {
    fn write_preamble(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(VERTEX_STRUCT.as_bytes())
    }

    fn write_piece(&self, out: &mut dyn Write, piece: &Piece) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "static const struct vertex {}[] = {{", constant_name(piece.name()))?;
        for vertex in piece.vertices() {
            self.write_vertex(out, vertex)?;
        }
        writeln!(out, "}};")
    }

    fn emits_joints(&self) -> bool {
        false
    }

    fn write_joint(&self, _out: &mut dyn Write, _joint: &Joint) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbake_core::Scene;
    use proptest::prelude::*;

    fn head() -> Piece {
        Piece::new(
            "head",
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
                Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_piece_layout() {
        let mut out = Vec::new();
        CEmitter::new().write_piece(&mut out, &head()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "\nstatic const struct vertex HEAD[] = {\n\
             \x20   { 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 1.0000f },\n\
             \x20   { 1.0000f, 0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 1.0000f },\n\
             \x20   { 0.0000f, 1.0000f, 0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 1.0000f },\n\
             };\n"
        );
    }

    #[test]
    fn test_scene_skips_joints() {
        let mut builder = Scene::builder();
        builder.add_piece(head()).unwrap();
        builder.add_joint(Joint::new("spine_bone", [1.5, 2.25, 0.0])).unwrap();

        let mut out = Vec::new();
        CEmitter::new().write_scene(&mut out, &builder.build()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("struct vertex {"));
        assert!(text.contains("float nx, ny, nz;"));
        assert!(!text.contains("SPINE_BONE"));
    }

    #[test]
    fn test_quantized_values_keep_four_decimals() {
        let piece = Piece::new(
            "tri",
            vec![Vertex::new([123.456, -0.98765, 2.0], [0.5, 0.25], [0.0, 0.0, -1.0]); 3],
        )
        .unwrap();
        let mut out = Vec::new();
        CEmitter::new().write_piece(&mut out, &piece).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("{ 123.0000f, -0.9880f, 2.0000f, 0.5000f, 0.2500f, 0.0000f, 0.0000f, -1.0000f }"));
    }

    proptest! {
        #[test]
        fn prop_every_field_has_four_decimals(
            values in prop::array::uniform8(-1.0e4f64..1.0e4),
        ) {
            let [x, y, z, s, t, nx, ny, nz] = values;
            let vertex = Vertex::new([x, y, z], [s, t], [nx, ny, nz]);
            let piece = Piece::new("p", vec![vertex; 3]).unwrap();

            let mut out = Vec::new();
            CEmitter::new().write_piece(&mut out, &piece).unwrap();
            let text = String::from_utf8(out).unwrap();

            let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("    { ")).collect();
            prop_assert_eq!(rows.len(), 3);
            for row in rows {
                let fields: Vec<&str> = row
                    .trim_start_matches("    { ")
                    .trim_end_matches(" },")
                    .split(", ")
                    .collect();
                prop_assert_eq!(fields.len(), 8);
                for field in fields {
                    let number = field.strip_suffix('f').unwrap();
                    let (_, decimals) = number.split_once('.').unwrap();
                    prop_assert_eq!(decimals.len(), 4);
                }
            }
        }
    }
}

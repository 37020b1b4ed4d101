// meshbake-parsers/src/dae/transform.rs
//! Node transform elements and 4x4 matrix helpers
//!
//! Matrices are row-major with the translation in the last column, the same
//! layout COLLADA uses for `<matrix>` text.

/// Row-major 4x4 homogeneous matrix
pub type Matrix4 = [[f64; 4]; 4];

/// Identity matrix
pub const IDENTITY_MATRIX: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two matrices (`a * b`)
pub fn multiply_matrices(a: Matrix4, b: Matrix4) -> Matrix4 {
    let mut result = [[0.0f64; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }

    result
}

/// Translation column of a matrix
pub fn translation_of(m: &Matrix4) -> [f64; 3] {
    [m[0][3], m[1][3], m[2][3]]
}

/// Matrix from 16 row-major values
pub fn from_row_major(values: &[f64; 16]) -> Matrix4 {
    let mut m = [[0.0f64; 4]; 4];
    for (row, chunk) in m.iter_mut().zip(values.chunks_exact(4)) {
        row.copy_from_slice(chunk);
    }
    m
}

/// Translation matrix
pub fn translate(v: [f64; 3]) -> Matrix4 {
    let mut m = IDENTITY_MATRIX;
    m[0][3] = v[0];
    m[1][3] = v[1];
    m[2][3] = v[2];
    m
}

/// Non-uniform scale matrix
pub fn scale(v: [f64; 3]) -> Matrix4 {
    let mut m = IDENTITY_MATRIX;
    m[0][0] = v[0];
    m[1][1] = v[1];
    m[2][2] = v[2];
    m
}

/// Rotation of `degrees` around `axis`. A zero axis yields the identity.
pub fn rotate(axis: [f64; 3], degrees: f64) -> Matrix4 {
    let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if len == 0.0 {
        return IDENTITY_MATRIX;
    }

    let [x, y, z] = [axis[0] / len, axis[1] / len, axis[2] / len];
    let (s, c) = degrees.to_radians().sin_cos();
    let t = 1.0 - c;

    [
        [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
        [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
        [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: Matrix4, b: Matrix4) {
        for i in 0..4 {
            for j in 0..4 {
                assert!((a[i][j] - b[i][j]).abs() < 1e-9, "mismatch at [{}][{}]: {:?} vs {:?}", i, j, a, b);
            }
        }
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = translate([1.0, 2.0, 3.0]);
        assert_eq!(multiply_matrices(IDENTITY_MATRIX, m), m);
        assert_eq!(multiply_matrices(m, IDENTITY_MATRIX), m);
    }

    #[test]
    fn test_translation_column() {
        let values = [
            1.0, 0.0, 0.0, 1.5,
            0.0, 1.0, 0.0, 2.25,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_eq!(translation_of(&from_row_major(&values)), [1.5, 2.25, 0.0]);
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let expected = [
            [0.0, -1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert_close(rotate([0.0, 0.0, 1.0], 90.0), expected);
    }

    #[test]
    fn test_rotation_does_not_move_later_translation_column() {
        // translate then rotate: translation stays as written
        let m = multiply_matrices(translate([4.0, 5.0, 6.0]), rotate([0.0, 1.0, 0.0], 45.0));
        let t = translation_of(&m);
        assert!((t[0] - 4.0).abs() < 1e-12);
        assert!((t[1] - 5.0).abs() < 1e-12);
        assert!((t[2] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_then_translate_scales_translation() {
        let m = multiply_matrices(scale([2.0, 2.0, 2.0]), translate([1.0, 0.0, 0.0]));
        assert_eq!(translation_of(&m), [2.0, 0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_translations_compose_additively(
            a in prop::array::uniform3(-1e3f64..1e3),
            b in prop::array::uniform3(-1e3f64..1e3),
        ) {
            let t = translation_of(&multiply_matrices(translate(a), translate(b)));
            for i in 0..3 {
                prop_assert!((t[i] - (a[i] + b[i])).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_rotation_keeps_axis_fixed(degrees in -360.0f64..360.0) {
            let m = rotate([0.0, 0.0, 1.0], degrees);
            prop_assert!((m[2][2] - 1.0).abs() < 1e-12);
            prop_assert!(m[0][2].abs() < 1e-12 && m[1][2].abs() < 1e-12);
        }
    }
}

use super::Transform;
use crate::vector::{Matrix4, Vector4};

/// A precomputed 4x4 matrix transform. Identity matrices are detected
/// once at construction so they short-circuit the rest of a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixTransform {
    matrix: Matrix4,
    identity: bool,
}

impl MatrixTransform {
    pub fn new(matrix: Matrix4) -> Self {
        let identity = matrix.is_identity();
        MatrixTransform { matrix, identity }
    }

    pub fn identity() -> Self {
        MatrixTransform {
            matrix: Matrix4::IDENTITY,
            identity: true,
        }
    }

    pub fn from_3x3(linear: &[[f32; 3]; 3], translation: Option<[f32; 3]>, transpose: bool) -> Self {
        Self::new(Matrix4::from_3x3(linear, translation, transpose))
    }

    pub fn from_xyz_columns(columns: &[[f32; 3]]) -> Self {
        Self::new(Matrix4::from_xyz_columns(columns))
    }
}

impl Transform for MatrixTransform {
    fn is_identity(&self) -> bool {
        self.identity
    }

    fn transform(&self, v: Vector4) -> Vector4 {
        if self.identity {
            return v;
        }
        self.matrix.transform(v)
    }
}

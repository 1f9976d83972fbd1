//! Four-lane float vector and 4x4 matrix primitives shared by every hot path
//! in the transform chain (matrix multiply, curve evaluation, CLUT lookup).

use std::ops::{Add, Div, Mul, Sub};

/// A 4-lane float vector. Color values use at most 4 active channels
/// (CMYK is the widest device space), so every transform in this crate
/// operates on `Vector4` even when only 1 or 3 lanes are meaningful;
/// unused lanes carry an identity value so a single code path serves all
/// channel counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const ZERO: Vector4 = Vector4::splat(0.0);
    pub const ONE: Vector4 = Vector4::splat(1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Vector4 { x, y, z, w }
    }

    pub const fn splat(v: f32) -> Self {
        Vector4::new(v, v, v, v)
    }

    /// Builds a vector from up to 4 components, zero-padding the rest.
    /// Used for position-like quantities (e.g. function inputs).
    pub fn from_components_zero(components: &[f32]) -> Self {
        Self::from_components_padded(components, 0.0)
    }

    /// Builds a vector from up to 4 components, one-padding the rest.
    /// Used for color-like quantities where a missing channel should act
    /// as an identity contribution in downstream multiplies.
    pub fn from_components_one(components: &[f32]) -> Self {
        Self::from_components_padded(components, 1.0)
    }

    fn from_components_padded(components: &[f32], pad: f32) -> Self {
        let get = |i: usize| components.get(i).copied().unwrap_or(pad);
        Vector4::new(get(0), get(1), get(2), get(3))
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn dot(&self, other: &Vector4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn clamp(&self, lo: &Vector4, hi: &Vector4) -> Vector4 {
        Vector4::new(
            self.x.clamp(lo.x, hi.x),
            self.y.clamp(lo.y, hi.y),
            self.z.clamp(lo.z, hi.z),
            self.w.clamp(lo.w, hi.w),
        )
    }

    pub fn clamp_scalar(&self, lo: f32, hi: f32) -> Vector4 {
        self.clamp(&Vector4::splat(lo), &Vector4::splat(hi))
    }

    pub fn min(&self, other: &Vector4) -> Vector4 {
        Vector4::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
            self.w.min(other.w),
        )
    }

    pub fn max(&self, other: &Vector4) -> Vector4 {
        Vector4::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
            self.w.max(other.w),
        )
    }

    /// Lane-wise floor, kept as float (the fractional part is what callers
    /// usually want alongside it for interpolation).
    pub fn floor(&self) -> Vector4 {
        Vector4::new(self.x.floor(), self.y.floor(), self.z.floor(), self.w.floor())
    }

    pub fn fract(&self) -> Vector4 {
        *self - self.floor()
    }
}

impl Add for Vector4 {
    type Output = Vector4;
    fn add(self, rhs: Vector4) -> Vector4 {
        Vector4::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vector4 {
    type Output = Vector4;
    fn sub(self, rhs: Vector4) -> Vector4 {
        Vector4::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul for Vector4 {
    type Output = Vector4;
    fn mul(self, rhs: Vector4) -> Vector4 {
        Vector4::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z, self.w * rhs.w)
    }
}

impl Mul<f32> for Vector4 {
    type Output = Vector4;
    fn mul(self, rhs: f32) -> Vector4 {
        Vector4::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Div for Vector4 {
    type Output = Vector4;
    fn div(self, rhs: Vector4) -> Vector4 {
        Vector4::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z, self.w / rhs.w)
    }
}

/// A 4x4 matrix stored as four column vectors so `transform` is four
/// fused multiply-adds with no row/column transposition at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub col0: Vector4,
    pub col1: Vector4,
    pub col2: Vector4,
    pub col3: Vector4,
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        col0: Vector4::new(1.0, 0.0, 0.0, 0.0),
        col1: Vector4::new(0.0, 1.0, 0.0, 0.0),
        col2: Vector4::new(0.0, 0.0, 1.0, 0.0),
        col3: Vector4::new(0.0, 0.0, 0.0, 1.0),
    };

    pub fn from_rows4x4(rows: &[[f32; 4]; 4]) -> Self {
        Matrix4 {
            col0: Vector4::new(rows[0][0], rows[1][0], rows[2][0], rows[3][0]),
            col1: Vector4::new(rows[0][1], rows[1][1], rows[2][1], rows[3][1]),
            col2: Vector4::new(rows[0][2], rows[1][2], rows[2][2], rows[3][2]),
            col3: Vector4::new(rows[0][3], rows[1][3], rows[2][3], rows[3][3]),
        }
    }

    /// Builds a 4x4 from a 3x3 linear part plus an optional translation,
    /// identity-padding the fourth row/column. `transpose` matches the PDF
    /// convention where calibrated-color matrices are sometimes given
    /// column-major.
    pub fn from_3x3(linear: &[[f32; 3]; 3], translation: Option<[f32; 3]>, transpose: bool) -> Self {
        let m = if transpose {
            let mut t = [[0.0f32; 3]; 3];
            for r in 0..3 {
                for c in 0..3 {
                    t[r][c] = linear[c][r];
                }
            }
            t
        } else {
            *linear
        };
        let t = translation.unwrap_or([0.0, 0.0, 0.0]);
        Matrix4::from_rows4x4(&[
            [m[0][0], m[0][1], m[0][2], t[0]],
            [m[1][0], m[1][1], m[1][2], t[1]],
            [m[2][0], m[2][1], m[2][2], t[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Builds a matrix from up to 4 XYZ triplets, one per input channel
    /// (the ICC "3-component matrix" shape generalized to N <= 4 inputs).
    /// Unused rows/columns are identity-padded.
    pub fn from_xyz_columns(columns: &[[f32; 3]]) -> Self {
        let mut rows = [[0.0f32; 4]; 4];
        for r in 0..4 {
            rows[r][r] = 1.0;
        }
        for (c, xyz) in columns.iter().enumerate().take(4) {
            for r in 0..3 {
                rows[r][c] = xyz[r];
            }
            if c < 3 {
                rows[3][c] = 0.0;
            }
        }
        for r in 0..3.min(columns.len()) {
            rows[r][3] = 0.0;
        }
        Matrix4::from_rows4x4(&rows)
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix4::IDENTITY
    }

    pub fn transform(&self, v: Vector4) -> Vector4 {
        Vector4::new(
            self.col0.x * v.x + self.col1.x * v.y + self.col2.x * v.z + self.col3.x * v.w,
            self.col0.y * v.x + self.col1.y * v.y + self.col2.y * v.z + self.col3.y * v.w,
            self.col0.z * v.x + self.col1.z * v.y + self.col2.z * v.z + self.col3.z * v.w,
            self.col0.w * v.x + self.col1.w * v.y + self.col2.w * v.z + self.col3.w * v.w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_construction_zero_vs_one() {
        let z = Vector4::from_components_zero(&[0.5, 0.25]);
        assert_eq!(z, Vector4::new(0.5, 0.25, 0.0, 0.0));

        let o = Vector4::from_components_one(&[0.5, 0.25]);
        assert_eq!(o, Vector4::new(0.5, 0.25, 1.0, 1.0));
    }

    #[test]
    fn dot_product() {
        let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vector4::new(2.0, 0.0, 1.0, 0.5);
        assert_eq!(a.dot(&b), 1.0 * 2.0 + 2.0 * 0.0 + 3.0 * 1.0 + 4.0 * 0.5);
    }

    #[test]
    fn clamp_clips_each_lane() {
        let v = Vector4::new(-1.0, 0.5, 2.0, 1.0);
        let clamped = v.clamp_scalar(0.0, 1.0);
        assert_eq!(clamped, Vector4::new(0.0, 0.5, 1.0, 1.0));
    }

    #[test]
    fn floor_and_fract_reconstruct_value() {
        let v = Vector4::new(1.25, -1.25, 3.0, 0.0);
        let reconstructed = v.floor() + v.fract();
        assert_eq!(reconstructed, v);
    }

    #[test]
    fn identity_matrix_transform_is_identity() {
        let v = Vector4::new(0.1, 0.2, 0.3, 1.0);
        assert_eq!(Matrix4::IDENTITY.transform(v), v);
        assert!(Matrix4::IDENTITY.is_identity());
    }

    #[test]
    fn scale_matrix_scales_each_lane() {
        let rows = [
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 4.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = Matrix4::from_rows4x4(&rows);
        let v = Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(m.transform(v), Vector4::new(2.0, 3.0, 4.0, 1.0));
        assert!(!m.is_identity());
    }

    #[test]
    fn from_xyz_columns_pads_identity() {
        let m = Matrix4::from_xyz_columns(&[[0.9505, 1.0, 1.089]]);
        let v = Vector4::new(1.0, 0.0, 0.0, 1.0);
        let out = m.transform(v);
        assert_eq!(out, Vector4::new(0.9505, 1.0, 1.089, 1.0));
    }

    #[test]
    fn from_3x3_with_translation() {
        let linear = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let m = Matrix4::from_3x3(&linear, Some([1.0, 2.0, 3.0]), false);
        let v = Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(m.transform(v), Vector4::new(1.0, 2.0, 3.0, 1.0));
    }
}

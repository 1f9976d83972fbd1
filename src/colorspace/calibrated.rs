use crate::transform::{ChainedTransform, Curve, CurveTransform, MatrixTransform, Transform};

/// CalGray color space descriptor (ISO 32000-1 §8.6.5.2): a single gamma
/// applied to the gray component before mapping through the white point.
#[derive(Debug, Clone, PartialEq)]
pub struct CalGrayColorSpace {
    pub white_point: [f32; 3],
    pub black_point: [f32; 3],
    pub gamma: f32,
}

impl Default for CalGrayColorSpace {
    fn default() -> Self {
        CalGrayColorSpace {
            white_point: [0.9505, 1.0000, 1.0890], // D50
            black_point: [0.0, 0.0, 0.0],
            gamma: 1.0,
        }
    }
}

impl CalGrayColorSpace {
    pub fn d65() -> Self {
        CalGrayColorSpace {
            white_point: [0.9505, 1.0, 1.0890],
            ..Default::default()
        }
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Builds `gamma curve -> XYZ (scaled by white point) -> linear sRGB`.
    pub fn build_chain(&self) -> ChainedTransform {
        let gamma_curve = CurveTransform::new(vec![Curve::Gamma(self.gamma)]);
        // A gray input drives all three XYZ axes proportionally to the
        // white point, then XYZ -> linear sRGB via the standard D65 matrix.
        let to_xyz = MatrixTransform::from_3x3(
            &[
                [self.white_point[0], 0.0, 0.0],
                [self.white_point[1], 0.0, 0.0],
                [self.white_point[2], 0.0, 0.0],
            ],
            None,
            false,
        );
        let xyz_to_srgb = super::icc::xyz_to_linear_srgb_matrix();
        ChainedTransform::new(vec![
            Box::new(gamma_curve),
            Box::new(to_xyz),
            Box::new(xyz_to_srgb),
        ])
    }
}

/// CalRGB color space descriptor (ISO 32000-1 §8.6.5.3).
#[derive(Debug, Clone, PartialEq)]
pub struct CalRgbColorSpace {
    pub white_point: [f32; 3],
    pub black_point: [f32; 3],
    pub gamma: [f32; 3],
    pub matrix: [[f32; 3]; 3],
}

impl Default for CalRgbColorSpace {
    fn default() -> Self {
        CalRgbColorSpace {
            white_point: [0.9505, 1.0000, 1.0890],
            black_point: [0.0, 0.0, 0.0],
            gamma: [1.0, 1.0, 1.0],
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl CalRgbColorSpace {
    pub fn srgb() -> Self {
        CalRgbColorSpace {
            white_point: [0.9505, 1.0, 1.089],
            gamma: [2.2, 2.2, 2.2],
            matrix: [
                [0.4124, 0.3576, 0.1805],
                [0.2126, 0.7152, 0.0722],
                [0.0193, 0.1192, 0.9505],
            ],
            ..Default::default()
        }
    }

    pub fn with_matrix(mut self, matrix: [[f32; 3]; 3]) -> Self {
        self.matrix = matrix;
        self
    }

    /// Builds `per-channel gamma -> matrix (to XYZ) -> linear sRGB`.
    pub fn build_chain(&self) -> ChainedTransform {
        let gamma_curve = CurveTransform::new(vec![
            Curve::Gamma(self.gamma[0]),
            Curve::Gamma(self.gamma[1]),
            Curve::Gamma(self.gamma[2]),
        ]);
        let to_xyz = MatrixTransform::from_3x3(&self.matrix, None, false);
        let xyz_to_srgb = super::icc::xyz_to_linear_srgb_matrix();
        ChainedTransform::new(vec![
            Box::new(gamma_curve),
            Box::new(to_xyz),
            Box::new(xyz_to_srgb),
        ])
    }
}

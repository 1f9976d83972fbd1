use super::icc::xyz_to_linear_srgb_matrix;
use crate::transform::{ChainedTransform, Transform};
use crate::vector::Vector4;

const EPSILON: f32 = 216.0 / 24389.0;
const KAPPA: f32 = 24389.0 / 27.0;

/// CIE L*a*b* color space descriptor (ISO 32000-1 §8.6.5.4).
#[derive(Debug, Clone, PartialEq)]
pub struct LabColorSpace {
    pub white_point: [f32; 3],
    pub black_point: [f32; 3],
    /// `[a_min, a_max, b_min, b_max]`.
    pub range: [f32; 4],
}

impl Default for LabColorSpace {
    fn default() -> Self {
        LabColorSpace {
            white_point: [0.9505, 1.0000, 1.0890],
            black_point: [0.0, 0.0, 0.0],
            range: [-100.0, 100.0, -100.0, 100.0],
        }
    }
}

impl LabColorSpace {
    /// Builds `Lab -> XYZ (white-point relative) -> linear sRGB`.
    pub fn build_chain(&self) -> ChainedTransform {
        let lab_to_xyz = LabToXyz {
            white_point: self.white_point,
        };
        ChainedTransform::new(vec![Box::new(lab_to_xyz), Box::new(xyz_to_linear_srgb_matrix())])
    }
}

/// Standalone L*a*b* -> CIE XYZ stage; not expressible as a matrix or a
/// per-channel curve because the forward transform mixes all three
/// input lanes non-linearly (CIE76).
#[derive(Debug)]
struct LabToXyz {
    white_point: [f32; 3],
}

impl Transform for LabToXyz {
    fn is_identity(&self) -> bool {
        false
    }

    fn transform(&self, v: Vector4) -> Vector4 {
        let (l, a, b) = (v.x, v.y, v.z);
        let fy = (l + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - b / 200.0;

        let finv = |f: f32| -> f32 {
            let f3 = f * f * f;
            if f3 > EPSILON {
                f3
            } else {
                (116.0 * f - 16.0) / KAPPA
            }
        };

        let xr = finv(fx);
        let yr = if l > KAPPA * EPSILON {
            ((l + 16.0) / 116.0).powi(3)
        } else {
            l / KAPPA
        };
        let zr = finv(fz);

        Vector4::new(
            xr * self.white_point[0],
            yr * self.white_point[1],
            zr * self.white_point[2],
            1.0,
        )
    }
}

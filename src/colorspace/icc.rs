use super::Converter;
use crate::error::{ColorCoreError, Result};
use crate::transform::{ChainedTransform, Clut, Curve, CurveTransform, MatrixTransform, Transform};
use crate::vector::Vector4;

/// The D65 XYZ -> linear sRGB matrix (IEC 61966-2-1), used as the final
/// step of every chain that terminates in CIE XYZ.
pub(crate) fn xyz_to_linear_srgb_matrix() -> MatrixTransform {
    MatrixTransform::from_3x3(
        &[
            [3.2406, -1.5372, -0.4986],
            [-0.9689, 1.8758, 0.0415],
            [0.0557, -0.2040, 1.0570],
        ],
        None,
        false,
    )
}

/// An ICC-tag hierarchy reduced to the three stages this crate actually
/// evaluates: per-channel curves, an optional matrix, and an optional
/// CLUT. `None` at any stage means that stage is omitted (profiles with
/// only a CLUT, for instance, skip the matrix/curve stage entirely).
#[derive(Debug, Clone)]
pub struct IccColorSpace {
    pub input_channels: u8,
    pub curves: Option<Vec<Curve>>,
    pub matrix: Option<[[f32; 3]; 3]>,
    pub clut: Option<IccClutDescriptor>,
}

#[derive(Debug, Clone)]
pub struct IccClutDescriptor {
    pub dims: usize,
    pub grid_sizes: Vec<usize>,
    /// Flattened `product(grid_sizes)` samples of up to 4 output
    /// channels each, dimension 0 fastest.
    pub samples: Vec<[f32; 4]>,
}

impl IccColorSpace {
    pub fn build_converter(&self) -> Result<Converter> {
        let mut steps: Vec<Box<dyn Transform>> = Vec::new();

        if let Some(curves) = &self.curves {
            steps.push(Box::new(CurveTransform::new(curves.clone())));
        }

        if let Some(clut) = &self.clut {
            let expected: usize = clut.grid_sizes.iter().product();
            if clut.samples.len() != expected {
                return Err(ColorCoreError::InvalidColorSpace(format!(
                    "ICC CLUT expects {} samples, got {}",
                    expected,
                    clut.samples.len()
                )));
            }
            let table: Vec<Vector4> = clut
                .samples
                .iter()
                .map(|s| Vector4::new(s[0], s[1], s[2], s[3]))
                .collect();
            steps.push(Box::new(Clut::new(clut.dims, &clut.grid_sizes, table)));
        } else if let Some(matrix) = self.matrix {
            steps.push(Box::new(MatrixTransform::from_3x3(&matrix, None, false)));
            steps.push(Box::new(xyz_to_linear_srgb_matrix()));
        }

        Ok(Converter::Chain(ChainedTransform::new(steps)))
    }
}

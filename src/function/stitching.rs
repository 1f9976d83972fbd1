use super::{clamp_outputs, build_function, Function, FunctionDescriptor, OutputBuffer};
use crate::error::{ColorCoreError, Result};

/// PDF Type 3 (stitching) function: dispatches a single input to one of
/// several child functions based on `bounds`, remapping the input into
/// the selected child's `encode` subdomain first.
#[derive(Debug)]
pub struct StitchingFunction {
    domain: Vec<f32>,
    range: Option<Vec<f32>>,
    children: Vec<Box<dyn Function>>,
    bounds: Vec<f32>,
    encode: Vec<f32>,
    out: OutputBuffer,
}

impl StitchingFunction {
    pub fn new(descriptor: &FunctionDescriptor) -> Result<Self> {
        if descriptor.functions.is_empty() {
            return Err(ColorCoreError::InvalidFunction(
                "stitching function requires at least one child function".to_string(),
            ));
        }
        let expected_bounds = descriptor.functions.len() - 1;
        if descriptor.bounds.len() != expected_bounds {
            return Err(ColorCoreError::InvalidFunction(format!(
                "stitching function expects {} bounds, got {}",
                expected_bounds,
                descriptor.bounds.len()
            )));
        }
        if descriptor.stitch_encode.len() != 2 * descriptor.functions.len() {
            return Err(ColorCoreError::InvalidFunction(
                "stitching function encode array length mismatch".to_string(),
            ));
        }

        let children = descriptor
            .functions
            .iter()
            .map(build_function)
            .collect::<Result<Vec<_>>>()?;

        Ok(StitchingFunction {
            domain: descriptor.domain.clone(),
            range: descriptor.range.clone(),
            children,
            bounds: descriptor.bounds.clone(),
            encode: descriptor.stitch_encode.clone(),
            out: OutputBuffer::default(),
        })
    }

    fn segment_for(&self, t: f32) -> usize {
        for (i, &bound) in self.bounds.iter().enumerate() {
            if t < bound {
                return i;
            }
        }
        self.children.len() - 1
    }

    fn subdomain(&self, segment: usize) -> (f32, f32) {
        let lo = if segment == 0 {
            self.domain[0]
        } else {
            self.bounds[segment - 1]
        };
        let hi = if segment == self.children.len() - 1 {
            self.domain[1]
        } else {
            self.bounds[segment]
        };
        (lo, hi)
    }
}

impl Function for StitchingFunction {
    fn domain(&self) -> &[f32] {
        &self.domain
    }

    fn range(&self) -> Option<&[f32]> {
        self.range.as_deref()
    }

    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        let t = inputs
            .first()
            .copied()
            .unwrap_or(0.0)
            .clamp(self.domain[0], self.domain[1]);
        let segment = self.segment_for(t);
        let (lo, hi) = self.subdomain(segment);
        let (enc_lo, enc_hi) = (self.encode[2 * segment], self.encode[2 * segment + 1]);

        let mapped = if hi > lo {
            enc_lo + (t - lo) / (hi - lo) * (enc_hi - enc_lo)
        } else {
            enc_lo
        };

        let child_out = self.children[segment].evaluate(&[mapped]);
        self.out.with(|buf| {
            buf.clear();
            buf.extend_from_slice(&child_out);
            clamp_outputs(self.range.as_deref(), buf);
            buf.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_child(domain: Vec<f32>) -> FunctionDescriptor {
        FunctionDescriptor {
            function_type: 2,
            domain,
            c0: Some(vec![0.0]),
            c1: Some(vec![1.0]),
            exponent_n: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn identity_children_stitch_to_identity() {
        let descriptor = FunctionDescriptor {
            function_type: 3,
            domain: vec![0.0, 1.0],
            functions: vec![
                identity_child(vec![0.0, 1.0]),
                identity_child(vec![0.0, 1.0]),
            ],
            bounds: vec![0.5],
            stitch_encode: vec![0.0, 1.0, 0.0, 1.0],
            ..Default::default()
        };
        let f = StitchingFunction::new(&descriptor).unwrap();
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let out = f.evaluate(&[t]);
            assert!((out[0] - t).abs() < 1e-2);
        }
    }

    #[test]
    fn dispatches_to_correct_segment() {
        let zero_child = FunctionDescriptor {
            function_type: 2,
            domain: vec![0.0, 1.0],
            c0: Some(vec![0.0]),
            c1: Some(vec![0.0]),
            exponent_n: 1.0,
            ..Default::default()
        };
        let one_child = FunctionDescriptor {
            function_type: 2,
            domain: vec![0.0, 1.0],
            c0: Some(vec![1.0]),
            c1: Some(vec![1.0]),
            exponent_n: 1.0,
            ..Default::default()
        };
        let descriptor = FunctionDescriptor {
            function_type: 3,
            domain: vec![0.0, 1.0],
            functions: vec![zero_child, one_child],
            bounds: vec![0.5],
            stitch_encode: vec![0.0, 1.0, 0.0, 1.0],
            ..Default::default()
        };
        let f = StitchingFunction::new(&descriptor).unwrap();
        assert!((f.evaluate(&[0.2])[0] - 0.0).abs() < 1e-6);
        assert!((f.evaluate(&[0.8])[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_bounds_length_rejected() {
        let descriptor = FunctionDescriptor {
            function_type: 3,
            domain: vec![0.0, 1.0],
            functions: vec![identity_child(vec![0.0, 1.0]), identity_child(vec![0.0, 1.0])],
            bounds: vec![],
            stitch_encode: vec![0.0, 1.0, 0.0, 1.0],
            ..Default::default()
        };
        assert!(StitchingFunction::new(&descriptor).is_err());
    }
}

use super::{clamp_outputs, Function, FunctionDescriptor, OutputBuffer};
use crate::error::{ColorCoreError, Result};

const LUT_SIZE: usize = 1024;

/// PDF Type 2 (exponential interpolation) function:
/// `out_k(t) = C0_k + t^N * (C1_k - C0_k)`, precomputed into a 1024-entry
/// LUT at construction so evaluation is a single linear lookup.
#[derive(Debug)]
pub struct ExponentialFunction {
    domain: Vec<f32>,
    range: Option<Vec<f32>>,
    output_components: usize,
    lut: Vec<f32>,
    out: OutputBuffer,
}

impl ExponentialFunction {
    pub fn new(descriptor: &FunctionDescriptor) -> Result<Self> {
        let c0 = descriptor.c0.clone().unwrap_or_else(|| vec![0.0]);
        let c1 = descriptor.c1.clone().unwrap_or_else(|| vec![1.0]);
        let output_components = c0.len().min(c1.len());
        if output_components == 0 {
            return Err(ColorCoreError::InvalidFunction(
                "exponential function requires at least one component in C0/C1".to_string(),
            ));
        }
        if descriptor.domain.len() < 2 {
            return Err(ColorCoreError::InvalidFunction(
                "exponential function requires a domain".to_string(),
            ));
        }
        let n = descriptor.exponent_n;

        let mut lut = Vec::with_capacity(LUT_SIZE * output_components);
        for i in 0..LUT_SIZE {
            let t = i as f32 / (LUT_SIZE - 1) as f32;
            let tn = if n == 1.0 { t } else { t.powf(n) };
            for k in 0..output_components {
                lut.push(c0[k] + tn * (c1[k] - c0[k]));
            }
        }

        Ok(ExponentialFunction {
            domain: descriptor.domain.clone(),
            range: descriptor.range.clone(),
            output_components,
            lut,
            out: OutputBuffer::default(),
        })
    }
}

impl Function for ExponentialFunction {
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
        let span = (self.domain[1] - self.domain[0]).max(f32::EPSILON);
        let normalized = ((t - self.domain[0]) / span).clamp(0.0, 1.0);

        let scaled = normalized * (LUT_SIZE - 1) as f32;
        let idx = scaled.floor() as usize;
        let frac = scaled - idx as f32;

        self.out.with(|buf| {
            buf.clear();
            if idx >= LUT_SIZE - 1 {
                let base = (LUT_SIZE - 1) * self.output_components;
                buf.extend_from_slice(&self.lut[base..base + self.output_components]);
            } else {
                let lo = idx * self.output_components;
                let hi = lo + self.output_components;
                for k in 0..self.output_components {
                    let a = self.lut[lo + k];
                    let b = self.lut[hi + k];
                    buf.push(a + frac * (b - a));
                }
            }
            clamp_outputs(self.range.as_deref(), buf);
            buf.clone()
        })
    }
}

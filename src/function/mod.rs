//! PDF function evaluator: the four function types (ISO 32000-1 §7.10)
//! behind one `Function` trait.

mod exponential;
mod postscript_fn;
mod sampled;
mod stitching;

pub use exponential::ExponentialFunction;
pub use postscript_fn::PostScriptFunction;
pub use sampled::SampledFunction;
pub use stitching::StitchingFunction;

use crate::error::{ColorCoreError, Result};
use std::cell::RefCell;

/// Uniform contract for all four PDF function types. Inputs are clamped
/// to `domain` and outputs clamped to `range` (when present) by each
/// implementation; `evaluate` may return a borrowed internal buffer, so
/// callers that need to retain the result across another call on the
/// same function must copy it.
pub trait Function: std::fmt::Debug {
    fn domain(&self) -> &[f32];
    fn range(&self) -> Option<&[f32]>;
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32>;

    fn input_dims(&self) -> usize {
        self.domain().len() / 2
    }

    fn output_components(&self) -> Option<usize> {
        self.range().map(|r| r.len() / 2)
    }
}

/// Clamps `inputs` against `domain`, zero-extending if `inputs` is
/// shorter than the declared input dimension.
pub(crate) fn clamp_inputs(domain: &[f32], inputs: &[f32]) -> Vec<f32> {
    let dims = domain.len() / 2;
    (0..dims)
        .map(|i| {
            let v = inputs.get(i).copied().unwrap_or(0.0);
            v.clamp(domain[2 * i], domain[2 * i + 1])
        })
        .collect()
}

/// Clamps `outputs` in place against `range`, when present.
pub(crate) fn clamp_outputs(range: Option<&[f32]>, outputs: &mut [f32]) {
    if let Some(range) = range {
        for (i, v) in outputs.iter_mut().enumerate() {
            if 2 * i + 1 < range.len() {
                *v = v.clamp(range[2 * i], range[2 * i + 1]);
            }
        }
    }
}

/// A raw function descriptor as handed in by the parser: a PDF function
/// dictionary's fields, independent of `FunctionType`.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub function_type: u8,
    pub domain: Vec<f32>,
    pub range: Option<Vec<f32>>,
    // Type 0
    pub size: Vec<u32>,
    pub bits_per_sample: u8,
    pub encode: Option<Vec<f32>>,
    pub decode: Option<Vec<f32>>,
    pub samples: Vec<u8>,
    // Type 2
    pub c0: Option<Vec<f32>>,
    pub c1: Option<Vec<f32>>,
    pub exponent_n: f32,
    // Type 3
    pub functions: Vec<FunctionDescriptor>,
    pub bounds: Vec<f32>,
    pub stitch_encode: Vec<f32>,
    // Type 4
    pub postscript_source: Vec<u8>,
}

impl Default for FunctionDescriptor {
    fn default() -> Self {
        FunctionDescriptor {
            function_type: 2,
            domain: vec![0.0, 1.0],
            range: None,
            size: Vec::new(),
            bits_per_sample: 8,
            encode: None,
            decode: None,
            samples: Vec::new(),
            c0: None,
            c1: None,
            exponent_n: 1.0,
            functions: Vec::new(),
            bounds: Vec::new(),
            stitch_encode: Vec::new(),
            postscript_source: Vec::new(),
        }
    }
}

/// Builds the concrete [`Function`] implementation for a descriptor.
/// Returns `Err` for malformed descriptors (see each constructor for the
/// specific rejection rules); callers fall back to an identity pass
/// through per the crate's error-handling policy.
pub fn build_function(descriptor: &FunctionDescriptor) -> Result<Box<dyn Function>> {
    match descriptor.function_type {
        0 => Ok(Box::new(SampledFunction::new(descriptor)?)),
        2 => Ok(Box::new(ExponentialFunction::new(descriptor)?)),
        3 => Ok(Box::new(StitchingFunction::new(descriptor)?)),
        4 => Ok(Box::new(PostScriptFunction::new(descriptor)?)),
        other => Err(ColorCoreError::UnsupportedFunctionType(other)),
    }
}

/// A scratch output buffer reused by [`Function`] implementations that
/// need one; kept out of the trait object itself so `Function` stays
/// object-safe and shareable.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer(RefCell<Vec<f32>>);

impl OutputBuffer {
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut Vec<f32>) -> R) -> R {
        let mut buf = self.0.borrow_mut();
        f(&mut buf)
    }
}

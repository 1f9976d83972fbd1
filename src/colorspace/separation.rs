use super::{build_converter, ColorSpaceDescriptor, Converter};
use crate::error::Result;
use crate::function::{build_function, FunctionDescriptor};

/// Separation color space descriptor: a single tint component mapped
/// through a PDF function (C3) into an alternate color space.
#[derive(Debug, Clone)]
pub struct SeparationColorSpace {
    pub colorant_name: String,
    pub alternate: Box<ColorSpaceDescriptor>,
    pub tint_transform: FunctionDescriptor,
}

pub(crate) fn build_converter(cs: &SeparationColorSpace) -> Result<Converter> {
    let function = build_function(&cs.tint_transform)?;
    let base = build_converter(&cs.alternate)?;
    Ok(Converter::TintTransform {
        function,
        base: Box::new(base),
    })
}

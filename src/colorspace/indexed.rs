use super::{build_converter, ColorSpaceDescriptor, Converter};
use crate::config::RenderingIntent;
use crate::error::{ColorCoreError, Result};

/// Indexed color space descriptor: a single-byte index into a palette of
/// entries expressed in some base color space.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedColorSpace {
    pub hival: u16,
    /// Raw lookup bytes, `(hival + 1) * base_components` long.
    pub lookup: Vec<u8>,
}

/// Builds an indexed converter by running every palette entry through
/// the base converter once at construction, producing a flat sRGB
/// palette texture so `to_srgb` on an index is a direct lookup.
pub(crate) fn build_indexed_converter(
    base: &ColorSpaceDescriptor,
    hival: u16,
    lookup: &[u8],
) -> Result<Converter> {
    let base_converter = build_converter(base)?;
    let base_components = base_component_count(base);
    let entry_count = hival as usize + 1;
    let expected_len = entry_count * base_components;
    if lookup.len() != expected_len {
        return Err(ColorCoreError::InvalidColorSpace(format!(
            "indexed lookup table expects {} bytes, got {}",
            expected_len,
            lookup.len()
        )));
    }

    let mut palette = Vec::with_capacity(entry_count);
    for entry in lookup.chunks(base_components) {
        let components: Vec<f32> = entry.iter().map(|&b| b as f32 / 255.0).collect();
        palette.push(base_converter.to_srgb(&components, RenderingIntent::RelativeColorimetric));
    }

    Ok(Converter::Indexed {
        base: Box::new(base_converter),
        palette,
    })
}

fn base_component_count(descriptor: &ColorSpaceDescriptor) -> usize {
    match descriptor {
        ColorSpaceDescriptor::DeviceGray | ColorSpaceDescriptor::CalGray(_) => 1,
        ColorSpaceDescriptor::DeviceRgb
        | ColorSpaceDescriptor::CalRgb(_)
        | ColorSpaceDescriptor::Lab(_) => 3,
        ColorSpaceDescriptor::DeviceCmyk => 4,
        ColorSpaceDescriptor::IccBased(cs) => cs.input_channels as usize,
        ColorSpaceDescriptor::Separation(_) => 1,
        ColorSpaceDescriptor::DeviceN(cs) => cs.colorant_count,
        ColorSpaceDescriptor::Indexed { .. } => 1,
        ColorSpaceDescriptor::Pattern(_) => 1,
    }
}

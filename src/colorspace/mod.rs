//! Color space converters: maps device-space components to sRGB bytes.

mod calibrated;
mod devicen;
mod icc;
mod indexed;
mod lab;
mod separation;
pub mod texture;

pub use calibrated::{CalGrayColorSpace, CalRgbColorSpace};
pub use devicen::DeviceNColorSpace;
pub use icc::IccColorSpace;
pub use indexed::IndexedColorSpace;
pub use lab::LabColorSpace;
pub use separation::SeparationColorSpace;

use crate::config::RenderingIntent;
use crate::error::Result;
use crate::function::Function;
use crate::transform::{ChainedTransform, Transform};
use crate::vector::Vector4;

/// Parsed color space descriptor, independent of the concrete converter
/// that gets built from it.
#[derive(Debug, Clone)]
pub enum ColorSpaceDescriptor {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray(CalGrayColorSpace),
    CalRgb(CalRgbColorSpace),
    Lab(LabColorSpace),
    IccBased(IccColorSpace),
    Indexed {
        base: Box<ColorSpaceDescriptor>,
        hival: u16,
        lookup: Vec<u8>,
    },
    Separation(SeparationColorSpace),
    DeviceN(DeviceNColorSpace),
    Pattern(Option<Box<ColorSpaceDescriptor>>),
}

/// A built converter, ready to map device components to sRGB.
#[derive(Debug)]
pub enum Converter {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    Chain(ChainedTransform),
    Indexed {
        base: Box<Converter>,
        palette: Vec<[u8; 4]>,
    },
    TintTransform {
        function: Box<dyn Function>,
        base: Box<Converter>,
    },
    Pattern {
        underlying: Option<Box<Converter>>,
    },
}

impl Converter {
    pub fn to_srgb(&self, components: &[f32], intent: RenderingIntent) -> [u8; 4] {
        match self {
            Converter::DeviceGray => {
                let g = components.first().copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let byte = to_byte(g);
                [byte, byte, byte, 255]
            }
            Converter::DeviceRgb => {
                let r = components.first().copied().unwrap_or(0.0);
                let g = components.get(1).copied().unwrap_or(0.0);
                let b = components.get(2).copied().unwrap_or(0.0);
                [to_byte(r), to_byte(g), to_byte(b), 255]
            }
            Converter::DeviceCmyk => {
                let c = components.first().copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let m = components.get(1).copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let y = components.get(2).copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let k = components.get(3).copied().unwrap_or(0.0).clamp(0.0, 1.0);
                let r = (1.0 - c) * (1.0 - k);
                let g = (1.0 - m) * (1.0 - k);
                let b = (1.0 - y) * (1.0 - k);
                [to_byte(r), to_byte(g), to_byte(b), 255]
            }
            Converter::Chain(chain) => {
                let v = Vector4::from_components_one(components);
                let out = chain.transform(v);
                [srgb_encode(out.x), srgb_encode(out.y), srgb_encode(out.z), 255]
            }
            Converter::Indexed { palette, .. } => {
                let idx = components.first().copied().unwrap_or(0.0).round() as usize;
                *palette.get(idx).unwrap_or(&[0, 0, 0, 255])
            }
            Converter::TintTransform { function, base } => {
                let mapped = function.evaluate(components);
                base.to_srgb(&mapped, intent)
            }
            Converter::Pattern { underlying } => match underlying {
                Some(base) => base.to_srgb(components, intent),
                None => [0, 0, 0, 255],
            },
        }
    }
}

/// Builds a [`Converter`] for a parsed descriptor. Malformed descriptors
/// return `Err`; the crate's documented fallback (grayscale passthrough)
/// is the caller's responsibility at the render boundary.
pub fn build_converter(descriptor: &ColorSpaceDescriptor) -> Result<Converter> {
    match descriptor {
        ColorSpaceDescriptor::DeviceGray => Ok(Converter::DeviceGray),
        ColorSpaceDescriptor::DeviceRgb => Ok(Converter::DeviceRgb),
        ColorSpaceDescriptor::DeviceCmyk => Ok(Converter::DeviceCmyk),
        ColorSpaceDescriptor::CalGray(cs) => Ok(Converter::Chain(cs.build_chain())),
        ColorSpaceDescriptor::CalRgb(cs) => Ok(Converter::Chain(cs.build_chain())),
        ColorSpaceDescriptor::Lab(cs) => Ok(Converter::Chain(cs.build_chain())),
        ColorSpaceDescriptor::IccBased(cs) => cs.build_converter(),
        ColorSpaceDescriptor::Indexed { base, hival, lookup } => {
            indexed::build_indexed_converter(base, *hival, lookup)
        }
        ColorSpaceDescriptor::Separation(cs) => separation::build_converter(cs),
        ColorSpaceDescriptor::DeviceN(cs) => devicen::build_converter(cs),
        ColorSpaceDescriptor::Pattern(underlying) => {
            let underlying = underlying
                .as_ref()
                .map(|d| build_converter(d).map(Box::new))
                .transpose()?;
            Ok(Converter::Pattern { underlying })
        }
    }
}

/// Encodes a linear value in `[0,1]` through the sRGB transfer function
/// and quantizes to a byte.
pub(crate) fn srgb_encode(linear: f32) -> u8 {
    let l = linear.clamp(0.0, 1.0);
    let encoded = if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    };
    to_byte(encoded)
}

/// Decodes an sRGB-encoded `[0,1]` value back to linear light.
pub(crate) fn srgb_decode(encoded: f32) -> f32 {
    let e = encoded.clamp(0.0, 1.0);
    if e <= 0.04045 {
        e / 12.92
    } else {
        ((e + 0.055) / 1.055).powf(2.4)
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_gray_splats_to_rgb() {
        let converter = build_converter(&ColorSpaceDescriptor::DeviceGray).unwrap();
        let out = converter.to_srgb(&[1.0], RenderingIntent::RelativeColorimetric);
        assert_eq!(out, [255, 255, 255, 255]);
    }

    #[test]
    fn device_cmyk_white_and_black() {
        let converter = build_converter(&ColorSpaceDescriptor::DeviceCmyk).unwrap();
        let white = converter.to_srgb(&[0.0, 0.0, 0.0, 0.0], RenderingIntent::RelativeColorimetric);
        assert_eq!(white, [255, 255, 255, 255]);
        let black = converter.to_srgb(&[0.0, 0.0, 0.0, 1.0], RenderingIntent::RelativeColorimetric);
        assert_eq!(black, [0, 0, 0, 255]);
    }

    #[test]
    fn device_cmyk_cyan_plus_magenta_is_blue() {
        let converter = build_converter(&ColorSpaceDescriptor::DeviceCmyk).unwrap();
        let blue = converter.to_srgb(&[1.0, 1.0, 0.0, 0.0], RenderingIntent::RelativeColorimetric);
        assert_eq!(blue, [0, 0, 255, 255]);
    }

    #[test]
    fn device_rgb_is_passthrough() {
        let converter = build_converter(&ColorSpaceDescriptor::DeviceRgb).unwrap();
        let out = converter.to_srgb(&[0.5, 0.25, 0.75], RenderingIntent::RelativeColorimetric);
        assert_eq!(out, [128, 64, 191, 255]);
    }

    #[test]
    fn srgb_round_trip_is_close() {
        for i in 0..=10 {
            let l = i as f32 / 10.0;
            let encoded = srgb_encode(l) as f32 / 255.0;
            let decoded = srgb_decode(encoded);
            assert!((decoded - l).abs() < 0.02);
        }
    }

    #[test]
    fn pattern_without_underlying_falls_back_to_black() {
        let converter = build_converter(&ColorSpaceDescriptor::Pattern(None)).unwrap();
        let out = converter.to_srgb(&[], RenderingIntent::RelativeColorimetric);
        assert_eq!(out, [0, 0, 0, 255]);
    }
}

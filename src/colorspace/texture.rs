//! Materializes whole 3D/4D CLUT textures as contiguous BGRA byte
//! buffers for GPU sampling. Byte-exact: downstream shaders sample these
//! buffers directly, so the packing order here is part of the wire
//! contract (see the external interfaces section of the design notes).

use super::Converter;
use crate::config::RenderingIntent;

/// Builds an `grid_size x (grid_size*grid_size)` BGRA texture for an RGB
/// converter. Pixel `(b*grid_size + g)` at column `r` encodes the sRGB of
/// `(r, g, b) / (grid_size - 1)`.
pub fn build_rgb_texture(converter: &Converter, grid_size: u32, intent: RenderingIntent) -> Vec<u8> {
    let n = grid_size.max(2);
    let denom = (n - 1) as f32;
    let mut out = Vec::with_capacity((n * n * n * 4) as usize);
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                let components = [r as f32 / denom, g as f32 / denom, b as f32 / denom];
                let [cr, cg, cb, ca] = converter.to_srgb(&components, intent);
                out.extend_from_slice(&[cb, cg, cr, ca]);
            }
        }
    }
    out
}

/// Builds a 4D CMYK texture: `slice_count` K-slices, each an
/// `grid_size x (grid_size*grid_size)` BGRA block for fixed K.
pub fn build_cmyk_texture(
    converter: &Converter,
    grid_size: u32,
    slice_count: u32,
    intent: RenderingIntent,
) -> Vec<u8> {
    let n = grid_size.max(2);
    let k_slices = slice_count.max(2);
    let denom = (n - 1) as f32;
    let k_denom = (k_slices - 1) as f32;
    let mut out = Vec::with_capacity((n * n * n * k_slices * 4) as usize);
    for k in 0..k_slices {
        for y in 0..n {
            for m in 0..n {
                for c in 0..n {
                    let components = [
                        c as f32 / denom,
                        m as f32 / denom,
                        y as f32 / denom,
                        k as f32 / k_denom,
                    ];
                    let [cr, cg, cb, ca] = converter.to_srgb(&components, intent);
                    out.extend_from_slice(&[cb, cg, cr, ca]);
                }
            }
        }
    }
    out
}

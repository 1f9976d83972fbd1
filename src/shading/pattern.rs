//! Resolves PDF pattern dictionaries (tiling and shading patterns) down
//! to the device-space anchor needed to place repeated tile content;
//! actual content-stream rasterization of the tile is out of scope.

use super::Affine2;
use crate::colorspace::{build_converter, ColorSpaceDescriptor, Converter};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintType {
    Colored,
    Uncolored,
}

/// A tiling pattern dictionary (PDF `PatternType` 1): bounding box, tile
/// step, and the matrix mapping pattern space into the default
/// coordinate space of the page the pattern is used on.
#[derive(Debug, Clone)]
pub struct TilingPatternDescriptor {
    pub paint_type: PaintType,
    pub bbox: [f32; 4],
    pub x_step: f32,
    pub y_step: f32,
    pub matrix: Affine2,
    /// Present only for `PaintType::Uncolored`: the color space the
    /// caller must supply a tint in, and its converter's underlying space.
    pub uncolored_space: Option<ColorSpaceDescriptor>,
}

/// The resolved anchor for a tiling pattern: how to map a device-space
/// point back into tile-local coordinates, and (for uncolored patterns)
/// the fixed color to paint every mark in the tile with.
#[derive(Debug)]
pub struct TilingSampler {
    pub bbox: [f32; 4],
    pub x_step: f32,
    pub y_step: f32,
    /// Maps device space to pattern space (inverse of `matrix * ctm`).
    pub device_to_pattern: Affine2,
    pub uncolored_color: Option<[u8; 4]>,
}

impl TilingSampler {
    /// Projects a device-space point into the repeating tile's local
    /// coordinates, wrapping by the tile step.
    pub fn tile_local_coords(&self, device_x: f32, device_y: f32) -> (f32, f32) {
        let (px, py) = self.device_to_pattern.apply(device_x, device_y);
        let local_x = wrap(px - self.bbox[0], self.x_step) + self.bbox[0];
        let local_y = wrap(py - self.bbox[1], self.y_step) + self.bbox[1];
        (local_x, local_y)
    }
}

fn wrap(value: f32, period: f32) -> f32 {
    if period.abs() < 1e-9 {
        return 0.0;
    }
    let m = value.rem_euclid(period);
    if m < 0.0 {
        m + period.abs()
    } else {
        m
    }
}

/// Resolves a tiling pattern against the current transformation matrix
/// in effect where the pattern is painted, and (for uncolored patterns)
/// the tint components supplied by the content stream.
pub fn resolve_tiling_pattern(
    descriptor: &TilingPatternDescriptor,
    ctm: Affine2,
    uncolored_tint: Option<&[f32]>,
) -> Result<TilingSampler> {
    let pattern_to_device = descriptor.matrix.multiply(&ctm);
    let device_to_pattern = pattern_to_device.invert().unwrap_or(Affine2::IDENTITY);

    let uncolored_color = match (&descriptor.uncolored_space, uncolored_tint) {
        (Some(space), Some(tint)) => {
            let converter: Converter = build_converter(space)?;
            Some(converter.to_srgb(tint, crate::config::RenderingIntent::RelativeColorimetric))
        }
        _ => None,
    };

    Ok(TilingSampler {
        bbox: descriptor.bbox,
        x_step: descriptor.x_step,
        y_step: descriptor.y_step,
        device_to_pattern,
        uncolored_color,
    })
}

use super::{sample_functions_to_srgb, ShadingDescriptor};
use crate::colorspace::Converter;
use crate::config::RenderingIntent;
use crate::error::{ColorCoreError, Result};
use crate::function::Function;

const STOP_COUNT: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub position: f32,
    pub color: [u8; 4],
}

/// A 1D gradient along the line segment `p0 -> p1` in user space.
#[derive(Debug)]
pub struct LinearGradient {
    pub p0: (f32, f32),
    pub p1: (f32, f32),
    pub stops: Vec<GradientStop>,
    pub extend: [bool; 2],
}

impl LinearGradient {
    /// Samples the gradient at parametric position `t` along `p0..p1`,
    /// where `t` is already normalized to `[0,1]` by the caller (the
    /// projection of a device point onto the axis).
    pub fn sample(&self, t: f32) -> Option<[u8; 4]> {
        if t < 0.0 {
            return if self.extend[0] {
                self.stops.first().map(|s| s.color)
            } else {
                None
            };
        }
        if t > 1.0 {
            return if self.extend[1] {
                self.stops.last().map(|s| s.color)
            } else {
                None
            };
        }
        Some(interpolate_stops(&self.stops, t))
    }
}

pub(crate) fn interpolate_stops(stops: &[GradientStop], t: f32) -> [u8; 4] {
    if stops.is_empty() {
        return [0, 0, 0, 0];
    }
    if stops.len() == 1 {
        return stops[0].color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.position && t <= b.position {
            let span = (b.position - a.position).max(f32::EPSILON);
            let local_t = (t - a.position) / span;
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = (a.color[i] as f32 + local_t * (b.color[i] as f32 - a.color[i] as f32)).round() as u8;
            }
            return out;
        }
    }
    if t < stops[0].position {
        stops[0].color
    } else {
        stops[stops.len() - 1].color
    }
}

pub(crate) fn build_stops(
    functions: &[Box<dyn Function>],
    converter: &Converter,
    domain: [f32; 2],
    intent: RenderingIntent,
) -> Vec<GradientStop> {
    if functions.is_empty() {
        return vec![
            GradientStop {
                position: 0.0,
                color: [0, 0, 0, 255],
            },
            GradientStop {
                position: 1.0,
                color: [255, 255, 255, 255],
            },
        ];
    }
    (0..STOP_COUNT)
        .map(|i| {
            let frac = i as f32 / (STOP_COUNT - 1) as f32;
            let t = domain[0] + frac * (domain[1] - domain[0]);
            GradientStop {
                position: frac,
                color: sample_functions_to_srgb(functions, converter, t, intent),
            }
        })
        .collect()
}

pub(crate) fn build(
    descriptor: &ShadingDescriptor,
    converter: &Converter,
    functions: &[Box<dyn Function>],
) -> Result<LinearGradient> {
    if descriptor.coords.len() != 4 {
        return Err(ColorCoreError::InvalidShading(
            "axial shading requires 4 coords [x0,y0,x1,y1]".to_string(),
        ));
    }
    let stops = build_stops(functions, converter, descriptor.domain, descriptor.intent);
    Ok(LinearGradient {
        p0: (descriptor.coords[0], descriptor.coords[1]),
        p1: (descriptor.coords[2], descriptor.coords[3]),
        stops,
        extend: descriptor.extend,
    })
}

use super::Transform;
use crate::vector::Vector4;

/// A single per-channel transfer curve. Variants mirror the ICC curve
/// families the host color-management ecosystem recognizes.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Identity,
    Gamma(f32),
    Sampled(Vec<f32>),
    /// ICC parametric curve, function type 0-4 per ICC.1:2010 §10.18.
    Parametric { function_type: u8, params: Vec<f32> },
}

impl Curve {
    pub fn is_identity(&self) -> bool {
        matches!(self, Curve::Identity) || matches!(self, Curve::Gamma(g) if (*g - 1.0).abs() < 1e-6)
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Curve::Identity => x,
            Curve::Gamma(g) => x.powf(*g),
            Curve::Sampled(table) => evaluate_sampled_catmull_rom(table, x),
            Curve::Parametric { function_type, params } => evaluate_parametric(*function_type, params, x),
        }
    }
}

/// Catmull-Rom interpolation over a stored 1D LUT, with edge-repeated
/// neighbors at the boundaries.
fn evaluate_sampled_catmull_rom(table: &[f32], x: f32) -> f32 {
    if table.is_empty() {
        return x;
    }
    if table.len() == 1 {
        return table[0];
    }
    let n = table.len();
    let scaled = x * (n - 1) as f32;
    let i1 = scaled.floor() as isize;
    let t = scaled - i1 as f32;

    let at = |idx: isize| -> f32 {
        let clamped = idx.clamp(0, n as isize - 1) as usize;
        table[clamped]
    };

    let p0 = at(i1 - 1);
    let p1 = at(i1);
    let p2 = at(i1 + 1);
    let p3 = at(i1 + 2);

    let t2 = t * t;
    let t3 = t2 * t;
    (-0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3) * t3
        + (p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3) * t2
        + (-0.5 * p0 + 0.5 * p2) * t
        + p1
}

fn evaluate_parametric(function_type: u8, params: &[f32], x: f32) -> f32 {
    let get = |i: usize| params.get(i).copied().unwrap_or(0.0);
    match function_type {
        0 => x.powf(get(0)),
        1 => {
            let (g, a, b) = (get(0), get(1), get(2));
            if x >= -b / a.max(f32::EPSILON) {
                (a * x + b).max(0.0).powf(g)
            } else {
                0.0
            }
        }
        2 => {
            let (g, a, b, c) = (get(0), get(1), get(2), get(3));
            if x >= -b / a.max(f32::EPSILON) {
                (a * x + b).max(0.0).powf(g) + c
            } else {
                c
            }
        }
        3 => {
            let (g, a, b, c, d) = (get(0), get(1), get(2), get(3), get(4));
            if x >= d {
                (a * x + b).max(0.0).powf(g)
            } else {
                c * x
            }
        }
        4 => {
            let (g, a, b, c, d, e, f) = (get(0), get(1), get(2), get(3), get(4), get(5), get(6));
            if x >= d {
                (a * x + b).max(0.0).powf(g) + e
            } else {
                c * x + f
            }
        }
        _ => x,
    }
}

/// Up to four independent per-channel curves, applied lane-wise. The
/// transform is identity iff every curve is identity.
#[derive(Debug, Clone)]
pub struct CurveTransform {
    curves: Vec<Curve>,
    identity: bool,
}

impl CurveTransform {
    pub fn new(curves: Vec<Curve>) -> Self {
        let identity = curves.iter().all(Curve::is_identity);
        CurveTransform { curves, identity }
    }
}

impl Transform for CurveTransform {
    fn is_identity(&self) -> bool {
        self.identity
    }

    fn transform(&self, v: Vector4) -> Vector4 {
        if self.identity {
            return v;
        }
        let lanes = [v.x, v.y, v.z, v.w];
        let mut out = [0f32; 4];
        for i in 0..4 {
            out[i] = match self.curves.get(i) {
                Some(curve) => curve.evaluate(lanes[i]),
                None => lanes[i],
            };
        }
        Vector4::new(out[0], out[1], out[2], out[3])
    }
}

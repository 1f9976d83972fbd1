//! Process-wide configuration and the rendering-intent enum shared with
//! the rest of the host graphics stack.

/// How out-of-gamut colors are reconciled when a profile exposes more
/// than one CLUT tag. Mirrors `graphics::state::RenderingIntent` in the
/// wider PDF engine this crate slots into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    AbsoluteColorimetric,
    #[default]
    RelativeColorimetric,
    Saturation,
    Perceptual,
}

impl RenderingIntent {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            RenderingIntent::AbsoluteColorimetric => "AbsoluteColorimetric",
            RenderingIntent::RelativeColorimetric => "RelativeColorimetric",
            RenderingIntent::Saturation => "Saturation",
            RenderingIntent::Perceptual => "Perceptual",
        }
    }
}

/// Resolution preset for materialized 3D/4D CLUT textures (§6 of the
/// design notes: size/fidelity tradeoff, no effect on evaluation
/// correctness).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClutResolution {
    Low,
    Normal,
    High,
}

impl ClutResolution {
    /// `(grid_size, k_slices)` for a 4D (CMYK) texture build.
    pub fn grid_and_slices(&self) -> (u32, u32) {
        match self {
            ClutResolution::Low => (16, 8),
            ClutResolution::Normal => (32, 16),
            ClutResolution::High => (64, 32),
        }
    }
}

/// Crate-wide configuration threaded through converter/texture
/// construction, built with the host library's `with_*` consuming-setter
/// convention.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    clut_resolution: ClutResolution,
    default_intent: RenderingIntent,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            clut_resolution: ClutResolution::Normal,
            default_intent: RenderingIntent::RelativeColorimetric,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clut_resolution(mut self, resolution: ClutResolution) -> Self {
        self.clut_resolution = resolution;
        self
    }

    pub fn with_default_intent(mut self, intent: RenderingIntent) -> Self {
        self.default_intent = intent;
        self
    }

    pub fn clut_resolution(&self) -> ClutResolution {
        self.clut_resolution
    }

    pub fn default_intent(&self) -> RenderingIntent {
        self.default_intent
    }
}

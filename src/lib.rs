//! Color and function evaluation core for a PDF rendering pipeline:
//! PostScript calculator functions, PDF function types 0/2/3/4, device
//! and calibrated color space conversion to sRGB, and shading/pattern
//! resolution.
//!
//! The crate is deliberately inbound-only: it parses PDF color and
//! function dictionaries once and evaluates them many times against
//! pixel or vertex data. It does not read or write PDF files itself.

pub mod colorspace;
pub mod config;
pub mod error;
pub mod function;
pub mod postscript;
pub mod shading;
pub mod transform;
pub mod vector;

pub use colorspace::{build_converter, ColorSpaceDescriptor, Converter};
pub use config::{ClutResolution, CoreConfig, RenderingIntent};
pub use error::{ColorCoreError, Result};
pub use function::{build_function, Function, FunctionDescriptor};
pub use shading::{build_shading_sampler, Affine2, ShadingArtifact, ShadingDescriptor};
pub use transform::Transform;
pub use vector::{Matrix4, Vector4};

//! Typed materials.
//!
//! Handles:
//! - plastic, metal, trans (diffuse and specular reflectors)
//! - glass and mirror
//! - light and glow emitters
//! - BSDF and aBSDF (file-backed transmission data)
//!
//! Every other material type is carried as a generic primitive.

mod bsdf;
mod glass;
mod glow;
mod mirror;
mod plastic;
mod trans;

pub use bsdf::{ABsdf, AngleBasis, Bsdf};
pub use glass::Glass;
pub use glow::{Glow, Light};
pub use mirror::Mirror;
pub use plastic::{Metal, Plastic};
pub use trans::Trans;

/// Photopic weighting of red, green and blue channels.
pub(crate) fn luminance(r: f64, g: f64, b: f64) -> f64 {
    0.265 * r + 0.670 * g + 0.065 * b
}

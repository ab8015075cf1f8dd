//! Raster operations on top of the `image` crate.
//!
//! Decoding, artifact encoding, layered compositing and background removal
//! used by the silhouette pipeline and the debug overlays.

pub mod background;
mod composite;
pub mod io;

pub use background::{AlphaKey, AutoBackground, BackgroundRemoval, FloodFillKey};
pub use composite::{
    clip_to_alpha, copy_opacity, darken, fill_square, lighten, over_solid, quantize_two,
    transparency_ratio,
};

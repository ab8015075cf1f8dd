//! Background removal strategies.
//!
//! A strategy turns background pixels of a resized RGBA subject transparent.
//! The silhouette builder is generic over the strategy, so hosts can plug in
//! their own segmentation without touching the rest of the pipeline.

use crate::raster::composite::transparency_ratio;
use crate::trace::trace_event;
use image::{Rgba, RgbaImage};

/// Largest possible Euclidean distance between two RGB colours.
const MAX_RGB_DIST: f32 = 441.672_96;

/// Makes background pixels transparent in place.
pub trait BackgroundRemoval {
    /// Clears the alpha of every pixel judged to be background.
    fn remove_background(&self, img: &mut RgbaImage);
}

/// Trusts the alpha channel already present in the source.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaKey;

impl BackgroundRemoval for AlphaKey {
    fn remove_background(&self, _img: &mut RgbaImage) {}
}

/// Flood fill from the top-left pixel, keyed on that pixel's colour.
///
/// The image is conceptually padded with a one-pixel matte in the key colour
/// so the fill reaches every background region touching the image border.
#[derive(Clone, Copy, Debug)]
pub struct FloodFillKey {
    /// Colour tolerance as a fraction of the largest RGB distance.
    pub fuzz: f32,
}

impl Default for FloodFillKey {
    fn default() -> Self {
        Self { fuzz: 0.02 }
    }
}

impl BackgroundRemoval for FloodFillKey {
    fn remove_background(&self, img: &mut RgbaImage) {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let key = *img.get_pixel(0, 0);
        let limit = self.fuzz.max(0.0) * MAX_RGB_DIST;

        // Padded grid coordinates: (0, 0) and the outer ring are matte.
        let pw = w as usize + 2;
        let ph = h as usize + 2;
        let mut seen = vec![false; pw * ph];
        let mut stack = vec![(0usize, 0usize)];
        seen[0] = true;

        while let Some((px, py)) = stack.pop() {
            let interior = px >= 1 && py >= 1 && px <= w as usize && py <= h as usize;
            if interior {
                let (x, y) = ((px - 1) as u32, (py - 1) as u32);
                let p = img.get_pixel_mut(x, y);
                if p[3] != 0 && color_dist(p, &key) > limit {
                    continue;
                }
                p[3] = 0;
            }
            let neighbours = [
                (px.wrapping_sub(1), py),
                (px + 1, py),
                (px, py.wrapping_sub(1)),
                (px, py + 1),
            ];
            for (nx, ny) in neighbours {
                if nx < pw && ny < ph {
                    let idx = ny * pw + nx;
                    if !seen[idx] {
                        seen[idx] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
}

fn color_dist(a: &Rgba<u8>, b: &Rgba<u8>) -> f32 {
    let mut sum = 0.0f32;
    for c in 0..3 {
        let d = a[c] as f32 - b[c] as f32;
        sum += d * d;
    }
    sum.sqrt()
}

/// Uses the alpha channel when the source has real transparency, otherwise
/// falls back to a corner-keyed flood fill (scanned or flattened sources).
#[derive(Clone, Copy, Debug)]
pub struct AutoBackground {
    /// Minimum fraction of non-opaque pixels for alpha to be trusted.
    pub min_transparency: f32,
    /// Strategy used for sources without usable transparency.
    pub fallback: FloodFillKey,
}

impl Default for AutoBackground {
    fn default() -> Self {
        Self {
            min_transparency: 0.01,
            fallback: FloodFillKey::default(),
        }
    }
}

impl BackgroundRemoval for AutoBackground {
    fn remove_background(&self, img: &mut RgbaImage) {
        let ratio = transparency_ratio(img);
        if ratio >= self.min_transparency {
            trace_event!("background", strategy = "alpha", transparency = ratio);
            AlphaKey.remove_background(img);
        } else {
            trace_event!("background", strategy = "flood_fill", transparency = ratio);
            self.fallback.remove_background(img);
        }
    }
}

//! Silhouette normalization.
//!
//! Any decoded raster is turned into a fixed `size x size` binary silhouette.
//! The source is brought to a supersampled working resolution, separated from
//! its background and trimmed to the subject; the subject is then scaled to
//! fit `size - 2 * border` on its longer axis, centred and quantized to black
//! and white.
//! Alongside the mask the builder returns the clipped subject composited onto
//! white, which the extractor uses for debug overlays.

use crate::config::Config;
use crate::raster::io::load_image;
use crate::raster::{
    clip_to_alpha, copy_opacity, over_solid, quantize_two, AutoBackground, BackgroundRemoval,
};
use crate::trace::{trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbImage, RgbaImage};
use std::path::Path;

/// Working resolution, as a multiple of the inner box, for background removal.
const SUPERSAMPLE: u32 = 4;

/// Output of [`SilhouetteBuilder::normalize`].
pub struct Silhouette {
    /// Binary mask, subject white (255) on black (0).
    pub mask: GrayImage,
    /// Clipped subject composited onto a white canvas.
    pub composite: RgbImage,
    /// Clipped subject on a transparent canvas, before binarization.
    pub clipped: RgbaImage,
}

/// Normalizes images into canonical binary silhouettes.
pub struct SilhouetteBuilder<B = AutoBackground> {
    size: u32,
    border: u32,
    background: B,
}

impl SilhouetteBuilder {
    /// Creates a builder with the default background strategy.
    pub fn new(cfg: &Config) -> SilMatchResult<Self> {
        Self::with_background(cfg, AutoBackground::default())
    }
}

impl<B: BackgroundRemoval> SilhouetteBuilder<B> {
    /// Creates a builder with a custom background strategy.
    pub fn with_background(cfg: &Config, background: B) -> SilMatchResult<Self> {
        cfg.validate()?;
        Ok(Self {
            size: cfg.size,
            border: cfg.border,
            background,
        })
    }

    /// Canvas side in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Decodes `path` and normalizes it.
    pub fn normalize_path<P: AsRef<Path>>(&self, path: P) -> SilMatchResult<Silhouette> {
        let img = load_image(path)?;
        self.normalize(&img)
    }

    /// Normalizes a decoded image.
    pub fn normalize(&self, img: &DynamicImage) -> SilMatchResult<Silhouette> {
        let (src_w, src_h) = (img.width(), img.height());
        if src_w == 0 || src_h == 0 {
            return Err(SilMatchError::InvalidInput("image has no pixels"));
        }
        let _span = trace_span!("normalize", width = src_w, height = src_h).entered();

        let inner = self.size - 2 * self.border;
        let (work_w, work_h) = fit_within(src_w, src_h, inner * SUPERSAMPLE);
        let mut work = img.to_rgba8();
        if (work_w, work_h) != (src_w, src_h) {
            work = imageops::resize(&work, work_w, work_h, FilterType::Triangle);
        }
        self.background.remove_background(&mut work);
        clip_to_alpha(&mut work);

        let mut clipped = RgbaImage::new(self.size, self.size);
        let mut opacity = RgbaImage::from_pixel(self.size, self.size, Rgba([255, 255, 255, 0]));
        let mut on_white = RgbaImage::from_pixel(self.size, self.size, Rgba([255, 255, 255, 255]));

        if let Some((bx, by, bw, bh)) = alpha_bounds(&work) {
            let trimmed = imageops::crop_imm(&work, bx, by, bw, bh).to_image();
            let (w, h) = fit_within(bw, bh, inner);
            let subject = imageops::resize(&trimmed, w, h, FilterType::Gaussian);
            let x = (self.size - w) / 2;
            let y = (self.size - h) / 2;

            copy_opacity(&mut opacity, &subject, x, y);
            imageops::overlay(&mut on_white, &subject, x as i64, y as i64);
            imageops::replace(&mut clipped, &subject, x as i64, y as i64);
            trace_event!("silhouette", scaled_w = w, scaled_h = h);
        } else {
            trace_event!("silhouette", scaled_w = 0u32, scaled_h = 0u32);
        }

        let mask = quantize_two(&over_solid(&opacity, 0));
        let composite = DynamicImage::ImageRgba8(on_white).to_rgb8();
        Ok(Silhouette {
            mask,
            composite,
            clipped,
        })
    }
}

/// Bounding box `(x, y, w, h)` of pixels with non-zero alpha.
fn alpha_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, p) in img.enumerate_pixels() {
        if p[3] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    (min_x != u32::MAX).then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Scales `(w, h)` so the longer side equals `inner`, keeping aspect ratio.
fn fit_within(w: u32, h: u32, inner: u32) -> (u32, u32) {
    let scale = inner as f64 / w.max(h) as f64;
    let sw = ((w as f64 * scale).round() as u32).clamp(1, inner);
    let sh = ((h as f64 * scale).round() as u32).clamp(1, inner);
    (sw, sh)
}

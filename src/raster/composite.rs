//! Compositing primitives.
//!
//! Canvases are plain `image` buffers; offsets place the top-left corner of a
//! layer on the canvas and anything falling outside the canvas is dropped.

use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

/// Fraction of pixels that are not fully opaque.
pub fn transparency_ratio(img: &RgbaImage) -> f32 {
    let total = img.width() as usize * img.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let transparent = img.pixels().filter(|p| p[3] < u8::MAX).count();
    transparent as f32 / total as f32
}

/// Clears colour data of fully transparent pixels.
pub fn clip_to_alpha(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        if p[3] == 0 {
            p[0] = 0;
            p[1] = 0;
            p[2] = 0;
        }
    }
}

/// Copies the layer's alpha channel onto the canvas at `(x, y)`.
///
/// Canvas colour is kept; only opacity inside the layer bounds changes.
pub fn copy_opacity(canvas: &mut RgbaImage, layer: &RgbaImage, x: u32, y: u32) {
    for (lx, ly, src) in layer.enumerate_pixels() {
        let cx = x + lx;
        let cy = y + ly;
        if cx < canvas.width() && cy < canvas.height() {
            canvas.get_pixel_mut(cx, cy)[3] = src[3];
        }
    }
}

/// Flattens an RGBA image onto a solid grey level with source-over.
pub fn over_solid(layer: &RgbaImage, background: u8) -> GrayImage {
    let bg = background as f32;
    GrayImage::from_fn(layer.width(), layer.height(), |x, y| {
        let p = layer.get_pixel(x, y);
        let a = p[3] as f32 / 255.0;
        let luma = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
        Luma([(a * luma + (1.0 - a) * bg).round().clamp(0.0, 255.0) as u8])
    })
}

/// Reduces a grey image to exactly two levels, black and white.
pub fn quantize_two(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y)[0] >= 128 {
            Luma([u8::MAX])
        } else {
            Luma([0])
        }
    })
}

/// Scales every channel towards black by `factor` in `[0, 1]`.
pub fn darken(img: &RgbImage, factor: f32) -> RgbImage {
    let factor = factor.clamp(0.0, 1.0);
    let mut out = img.clone();
    for p in out.pixels_mut() {
        for c in p.0.iter_mut() {
            *c = (*c as f32 * factor).round() as u8;
        }
    }
    out
}

/// Lighten blend of a grey mask over an RGB base (per-channel maximum).
pub fn lighten(base: &mut RgbImage, mask: &GrayImage) {
    let w = base.width().min(mask.width());
    let h = base.height().min(mask.height());
    for y in 0..h {
        for x in 0..w {
            let m = mask.get_pixel(x, y)[0];
            let p = base.get_pixel_mut(x, y);
            for c in p.0.iter_mut() {
                *c = (*c).max(m);
            }
        }
    }
}

/// Draws a filled square of half-width `half` centred on `(cx, cy)`.
pub fn fill_square(img: &mut RgbImage, cx: f32, cy: f32, half: i64, color: Rgb<u8>) {
    let cx = cx.round() as i64;
    let cy = cy.round() as i64;
    let w = img.width() as i64;
    let h = img.height() as i64;
    for y in (cy - half).max(0)..=(cy + half).min(h - 1) {
        for x in (cx - half).max(0)..=(cx + half).min(w - 1) {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

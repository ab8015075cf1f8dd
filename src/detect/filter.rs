//! Float image buffers with separable filtering and Sobel gradients.
//!
//! Borders are handled by clamping (edge pixels are replicated).

use image::GrayImage;

/// Row-major `f32` image.
pub(crate) struct FloatImage {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) data: Vec<f32>,
}

impl FloatImage {
    pub(crate) fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub(crate) fn from_gray(img: &GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw().iter().map(|&v| v as f32).collect(),
        }
    }

    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    fn clamped(&self, x: isize, y: isize) -> f32 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.at(x, y)
    }

    pub(crate) fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }

    /// Rescales to `0..=255` relative to the maximum value.
    pub(crate) fn to_gray_normalized(&self) -> GrayImage {
        let max = self.max();
        let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
        let raw = self
            .data
            .iter()
            .map(|&v| (v * scale).round().clamp(0.0, 255.0) as u8)
            .collect();
        GrayImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| GrayImage::new(self.width as u32, self.height as u32))
    }
}

/// Convolves rows then columns with the same odd-length kernel.
pub(crate) fn convolve_separable(src: &FloatImage, kernel: &[f32]) -> FloatImage {
    let half = (kernel.len() / 2) as isize;
    let (w, h) = (src.width, src.height);
    let mut tmp = FloatImage::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                acc += src.clamped(x as isize + k as isize - half, y as isize) * kv;
            }
            tmp.data[y * w + x] = acc;
        }
    }
    let mut dst = FloatImage::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                acc += tmp.clamped(x as isize, y as isize + k as isize - half) * kv;
            }
            dst.data[y * w + x] = acc;
        }
    }
    dst
}

/// 3x3 Sobel gradients `(gx, gy)`.
pub(crate) fn sobel_xy(src: &FloatImage) -> (FloatImage, FloatImage) {
    let (w, h) = (src.width, src.height);
    let mut gx = FloatImage::zeros(w, h);
    let mut gy = FloatImage::zeros(w, h);
    for y in 0..h as isize {
        for x in 0..w as isize {
            let p = |dx: isize, dy: isize| src.clamped(x + dx, y + dy);
            let sx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            let sy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            let idx = y as usize * w + x as usize;
            gx.data[idx] = sx;
            gy.data[idx] = sy;
        }
    }
    (gx, gy)
}

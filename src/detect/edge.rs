//! Gradient-magnitude edge detector.

use crate::config::EdgeParams;
use crate::detect::filter::{convolve_separable, sobel_xy, FloatImage};
use crate::detect::EdgeDetector;
use crate::util::math::gaussian_kernel;
use crate::util::SilMatchResult;
use image::GrayImage;

/// Gaussian smoothing followed by Sobel gradient magnitude.
///
/// The result is rescaled so the strongest edge is 255.
#[derive(Clone, Copy, Debug, Default)]
pub struct GradientEdgeDetector;

impl EdgeDetector for GradientEdgeDetector {
    fn detect_edges(
        &self,
        silhouette: &GrayImage,
        params: &EdgeParams,
    ) -> SilMatchResult<GrayImage> {
        let src = FloatImage::from_gray(silhouette);
        if src.width == 0 || src.height == 0 {
            return Ok(GrayImage::new(silhouette.width(), silhouette.height()));
        }
        let kernel = gaussian_kernel(params.kernel_radius, params.kernel_width);
        let smooth = convolve_separable(&src, &kernel);
        let (gx, gy) = sobel_xy(&smooth);

        let mut mag = FloatImage::zeros(src.width, src.height);
        for (m, (x, y)) in mag.data.iter_mut().zip(gx.data.iter().zip(gy.data.iter())) {
            *m = (x * x + y * y).sqrt();
        }
        Ok(mag.to_gray_normalized())
    }
}

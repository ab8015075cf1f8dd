//! Harris corner detector with a turning-angle gate.
//!
//! The structure tensor of a contour point where two straight runs meet at a
//! turning angle `theta` has eigenvalue ratio `tan^2(theta / 2)`, so requiring
//! `lambda_min / lambda_max >= tan^2(threshold / 2)` rejects shallow bends
//! and straight runs regardless of response strength.

use crate::config::CornerParams;
use crate::detect::filter::{convolve_separable, sobel_xy, FloatImage};
use crate::detect::nms::{nms_2d, Peak};
use crate::detect::CornerDetector;
use crate::geometry::{CornerSet, Point};
use crate::util::math::{gaussian_kernel, sym2_eigen};
use crate::util::SilMatchResult;
use image::GrayImage;

const WINDOW_RADIUS: usize = 2;
const WINDOW_SIGMA: f32 = 1.0;

/// Harris detector tuned for edge masks of binary silhouettes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HarrisCornerDetector;

impl HarrisCornerDetector {
    fn response(edges: &FloatImage, k: f32) -> (FloatImage, FloatImage) {
        let (gx, gy) = sobel_xy(edges);
        let (w, h) = (edges.width, edges.height);
        let mut ixx = FloatImage::zeros(w, h);
        let mut iyy = FloatImage::zeros(w, h);
        let mut ixy = FloatImage::zeros(w, h);
        for i in 0..w * h {
            let (dx, dy) = (gx.data[i], gy.data[i]);
            ixx.data[i] = dx * dx;
            iyy.data[i] = dy * dy;
            ixy.data[i] = dx * dy;
        }

        let kernel = gaussian_kernel(WINDOW_RADIUS, WINDOW_SIGMA);
        let sxx = convolve_separable(&ixx, &kernel);
        let syy = convolve_separable(&iyy, &kernel);
        let sxy = convolve_separable(&ixy, &kernel);

        let mut response = FloatImage::zeros(w, h);
        let mut ratio = FloatImage::zeros(w, h);
        for i in 0..w * h {
            let (a, b, c) = (sxx.data[i], syy.data[i], sxy.data[i]);
            let trace = a + b;
            response.data[i] = a * b - c * c - k * trace * trace;
            let (l_max, l_min) = sym2_eigen(a, b, c);
            ratio.data[i] = if l_max > 0.0 { l_min.max(0.0) / l_max } else { 0.0 };
        }
        (response, ratio)
    }
}

impl CornerDetector for HarrisCornerDetector {
    fn detect_corners(
        &self,
        edges: &GrayImage,
        params: &CornerParams,
    ) -> SilMatchResult<CornerSet> {
        let src = FloatImage::from_gray(edges);
        if src.width < 3 || src.height < 3 {
            return Ok(CornerSet::default());
        }
        let (response, ratio) = Self::response(&src, params.sensitivity);
        let max = response.max();
        if max <= 0.0 {
            return Ok(CornerSet::default());
        }
        let threshold = params.contrast * max;
        let min_ratio = (params.turn_angle_deg.to_radians() * 0.5).tan().powi(2);

        let mut peaks = Vec::new();
        for y in 1..src.height - 1 {
            for x in 1..src.width - 1 {
                let r = response.at(x, y);
                if r <= 0.0 || r < threshold || ratio.at(x, y) < min_ratio {
                    continue;
                }
                let is_local_max = (y - 1..=y + 1)
                    .all(|ny| (x - 1..=x + 1).all(|nx| response.at(nx, ny) <= r));
                if is_local_max {
                    peaks.push(Peak { x, y, score: r });
                }
            }
        }

        let kept = nms_2d(&mut peaks, params.nms_radius);
        Ok(kept
            .into_iter()
            .map(|p| Point::new(p.x as f32, p.y as f32))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeParams;
    use crate::detect::{EdgeDetector, GradientEdgeDetector};
    use image::Luma;

    fn square_silhouette() -> GrayImage {
        GrayImage::from_fn(100, 100, |x, y| {
            Luma([if (25..75).contains(&x) && (25..75).contains(&y) { 255 } else { 0 }])
        })
    }

    #[test]
    fn finds_the_corners_of_a_square() {
        let edges = GradientEdgeDetector
            .detect_edges(&square_silhouette(), &EdgeParams::default())
            .unwrap();
        let corners = HarrisCornerDetector
            .detect_corners(&edges, &CornerParams::default())
            .unwrap();
        let truth = [(25.0f32, 25.0f32), (74.0, 25.0), (74.0, 74.0), (25.0, 74.0)];

        for (tx, ty) in truth {
            let near = corners
                .iter()
                .any(|p| (p.x - tx).abs() <= 6.0 && (p.y - ty).abs() <= 6.0);
            assert!(near, "no corner near ({tx}, {ty}): {:?}", corners);
        }
        for p in corners.iter() {
            let near = truth
                .iter()
                .any(|&(tx, ty)| (p.x - tx).abs() <= 10.0 && (p.y - ty).abs() <= 10.0);
            assert!(near, "spurious corner at ({}, {})", p.x, p.y);
        }
    }

    #[test]
    fn blank_mask_has_no_corners() {
        let corners = HarrisCornerDetector
            .detect_corners(&GrayImage::new(32, 32), &CornerParams::default())
            .unwrap();
        assert!(corners.is_empty());
    }
}

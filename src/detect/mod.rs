//! Edge and corner detection seams.
//!
//! The classifier only depends on the two traits below. The bundled
//! [`GradientEdgeDetector`] and [`HarrisCornerDetector`] are reasonable
//! defaults for binary silhouettes; hosts with their own detectors implement
//! the traits instead.

use crate::config::{CornerParams, EdgeParams};
use crate::geometry::CornerSet;
use crate::util::SilMatchResult;
use image::GrayImage;

mod corner;
mod edge;
mod filter;
pub(crate) mod nms;

pub use corner::HarrisCornerDetector;
pub use edge::GradientEdgeDetector;
pub use nms::{nms_2d, Peak};

/// Turns a binary silhouette into an edge mask.
pub trait EdgeDetector {
    /// Returns an edge mask of the same size as `silhouette`.
    fn detect_edges(&self, silhouette: &GrayImage, params: &EdgeParams)
        -> SilMatchResult<GrayImage>;
}

/// Turns an edge mask into corner points.
pub trait CornerDetector {
    /// Returns the corners found on `edges`.
    fn detect_corners(&self, edges: &GrayImage, params: &CornerParams)
        -> SilMatchResult<CornerSet>;
}

impl<T: EdgeDetector + ?Sized> EdgeDetector for &T {
    fn detect_edges(
        &self,
        silhouette: &GrayImage,
        params: &EdgeParams,
    ) -> SilMatchResult<GrayImage> {
        (**self).detect_edges(silhouette, params)
    }
}

impl<T: CornerDetector + ?Sized> CornerDetector for &T {
    fn detect_corners(
        &self,
        edges: &GrayImage,
        params: &CornerParams,
    ) -> SilMatchResult<CornerSet> {
        (**self).detect_corners(edges, params)
    }
}

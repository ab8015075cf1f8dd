//! Non-maximum suppression for corner responses.

use std::cmp::Ordering;

/// Response peak at an integer pixel location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the peak.
    pub x: usize,
    /// Y coordinate (row) of the peak.
    pub y: usize,
    /// Detector response at the peak.
    pub score: f32,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Applies 2D non-maximum suppression using Chebyshev distance.
///
/// Peaks are sorted by descending score (ties by row, then column) and kept
/// if they are farther than `radius` from every previously kept peak.
pub fn nms_2d(peaks: &mut [Peak], radius: usize) -> Vec<Peak> {
    peaks.sort_by(peak_cmp_desc);
    if radius == 0 {
        return peaks.to_owned();
    }

    let mut kept: Vec<Peak> = Vec::new();
    'outer: for peak in peaks.iter().copied() {
        for kept_peak in kept.iter() {
            let dx = peak.x.abs_diff(kept_peak.x);
            let dy = peak.y.abs_diff(kept_peak.y);
            if dx.max(dy) <= radius {
                continue 'outer;
            }
        }
        kept.push(peak);
    }

    kept
}

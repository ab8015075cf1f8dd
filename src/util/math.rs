//! Small numeric helpers shared by the detectors and the scorer.

/// Squared Euclidean distance between two 2D points.
#[inline]
pub(crate) fn dist_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Returns a normalized 1D Gaussian kernel with `2 * radius + 1` taps.
pub(crate) fn gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let sigma = sigma.max(1e-3);
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Eigenvalues of the symmetric 2x2 matrix `[[a, c], [c, b]]`, largest first.
pub(crate) fn sym2_eigen(a: f32, b: f32, c: f32) -> (f32, f32) {
    let half_trace = 0.5 * (a + b);
    let diff = 0.5 * (a - b);
    let disc = (diff * diff + c * c).sqrt();
    (half_trace + disc, half_trace - disc)
}

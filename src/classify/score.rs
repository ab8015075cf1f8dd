//! Corner-set similarity.

use crate::geometry::CornerSet;
use crate::util::math::dist_sq;

/// Similarity of `test` against `candidate` in `[0, 1]`.
///
/// Every point of `test` takes its best match in `candidate`, contributing
/// `max(0, 1 - d^2 / radius^2)`. The sum is divided by the size of the larger
/// set, so unmatched extra points on either side lower the score. The score
/// is directional: swapping the arguments generally changes it.
///
/// Either set being empty yields `0`.
pub fn score(test: &CornerSet, candidate: &CornerSet, radius: f32) -> f32 {
    if test.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let radius_sq = radius * radius;

    let mut total = 0.0f32;
    for a in test {
        let mut best = 0.0f32;
        for b in candidate {
            let c = 1.0 - dist_sq(a.x, a.y, b.x, b.y) / radius_sq;
            if c > best {
                best = c;
            }
        }
        total += best;
    }
    total / test.len().max(candidate.len()) as f32
}

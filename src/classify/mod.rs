//! Brute-force classification against the training index.
//!
//! The candidate's corners are scored against every reference example in
//! index order. A later example replaces the current best only with a
//! strictly greater score, so ties keep the first example encountered.

mod score;
mod topk;

pub use score::score;

use crate::config::Config;
use crate::detect::{CornerDetector, EdgeDetector, GradientEdgeDetector, HarrisCornerDetector};
use crate::extract::CornerExtractor;
use crate::geometry::CornerSet;
use crate::index::TrainingIndex;
use crate::raster::{AutoBackground, BackgroundRemoval};
use crate::trace::{trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};
use std::path::Path;
use topk::TopK;

/// Best-matching reference example.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Category of the matching example.
    pub category: String,
    /// File name of the matching example.
    pub example: String,
    /// Confidence in `[0, 1]`.
    pub score: f32,
}

/// Classifies images by corner-set similarity to a training library.
pub struct Classifier<E = GradientEdgeDetector, C = HarrisCornerDetector, B = AutoBackground> {
    extractor: CornerExtractor<E, C, B>,
    index: TrainingIndex,
    match_radius: f32,
}

impl Classifier {
    /// Builds the training index from `training_dir` with the bundled
    /// detectors.
    pub fn train(cfg: Config, training_dir: &Path) -> SilMatchResult<Self> {
        let extractor = CornerExtractor::new(cfg)?;
        Self::train_with(extractor, training_dir)
    }
}

impl<E: EdgeDetector, C: CornerDetector, B: BackgroundRemoval> Classifier<E, C, B> {
    /// Builds the training index from `training_dir` using `extractor`.
    ///
    /// Cache and artifact paths are mirrored relative to `training_dir`.
    pub fn train_with(
        extractor: CornerExtractor<E, C, B>,
        training_dir: &Path,
    ) -> SilMatchResult<Self> {
        let extractor = extractor.with_source_root(training_dir);
        let index = TrainingIndex::build(training_dir, &extractor)?;
        Ok(Self::from_parts(extractor, index))
    }

    /// Wraps an existing index.
    pub fn from_parts(extractor: CornerExtractor<E, C, B>, index: TrainingIndex) -> Self {
        let match_radius = extractor.config().match_radius();
        Self {
            extractor,
            index,
            match_radius,
        }
    }

    pub fn index(&self) -> &TrainingIndex {
        &self.index
    }

    pub fn extractor(&self) -> &CornerExtractor<E, C, B> {
        &self.extractor
    }

    /// Effective match radius.
    pub fn match_radius(&self) -> f32 {
        self.match_radius
    }

    /// Extracts the corners of `candidate` (uncached) and classifies them.
    ///
    /// Returns `None` when nothing could be matched: the candidate has no
    /// corners or the index has no examples.
    pub fn classify(&self, candidate: &Path) -> SilMatchResult<Option<Match>> {
        let corners = self.candidate_corners(candidate)?;
        Ok(self.classify_corners(&corners))
    }

    /// Extracts the corners of `candidate` and ranks categories.
    pub fn rank(&self, candidate: &Path, k: usize) -> SilMatchResult<Vec<Match>> {
        let corners = self.candidate_corners(candidate)?;
        Ok(self.rank_corners(&corners, k))
    }

    /// Classifies an already extracted corner set.
    pub fn classify_corners(&self, corners: &CornerSet) -> Option<Match> {
        let _span = trace_span!("classify", points = corners.len()).entered();
        if corners.is_empty() {
            return None;
        }

        let mut best: Option<Match> = None;
        for (category, examples) in self.index.categories() {
            for example in examples {
                let s = score(corners, &example.corners, self.match_radius);
                let better = best.as_ref().map_or(true, |b| s > b.score);
                if better {
                    trace_event!("best_match", category = category, score = s);
                    best = Some(Match {
                        category: category.to_string(),
                        example: example.id.clone(),
                        score: s,
                    });
                }
            }
        }
        best
    }

    /// Best example per category, best category first, at most `k` entries.
    ///
    /// Ties keep index order, both within and across categories.
    pub fn rank_corners(&self, corners: &CornerSet, k: usize) -> Vec<Match> {
        if corners.is_empty() {
            return Vec::new();
        }
        let mut topk = TopK::new(k);
        for (category, examples) in self.index.categories() {
            let mut best: Option<(f32, &str)> = None;
            for example in examples {
                let s = score(corners, &example.corners, self.match_radius);
                if best.map_or(true, |(b, _)| s > b) {
                    best = Some((s, example.id.as_str()));
                }
            }
            if let Some((s, id)) = best {
                topk.push(
                    s,
                    Match {
                        category: category.to_string(),
                        example: id.to_string(),
                        score: s,
                    },
                );
            }
        }
        topk.into_sorted_desc()
    }

    fn candidate_corners(&self, candidate: &Path) -> SilMatchResult<CornerSet> {
        if !candidate.is_file() {
            return Err(SilMatchError::Configuration(format!(
                "candidate {} is not a readable file",
                candidate.display()
            )));
        }
        self.extractor.extract(candidate, false)
    }
}

//! silmatch classifies images by the shape of their subject.
//!
//! Every image is normalized into a fixed-size binary silhouette, reduced to
//! a set of corner points, and compared against a library of labelled
//! training silhouettes. Extracted corner sets are cached on disk next to a
//! mirror of the training tree and reused while newer than their source.
//!
//! Edge and corner detection sit behind the [`EdgeDetector`] and
//! [`CornerDetector`] traits; the bundled implementations are used unless
//! the host supplies its own. Enable the `tracing` feature for spans and
//! events around each pipeline stage.

pub mod cache;
pub mod classify;
pub mod config;
pub mod detect;
pub mod extract;
pub mod geometry;
pub mod index;
pub mod raster;
pub mod silhouette;
mod trace;
pub mod util;

pub use cache::FeatureCache;
pub use classify::{score, Classifier, Match};
pub use config::{Config, CornerParams, DebugLevel, EdgeParams};
pub use detect::{CornerDetector, EdgeDetector, GradientEdgeDetector, HarrisCornerDetector};
pub use extract::CornerExtractor;
pub use geometry::{CornerSet, Point};
pub use index::{TrainingExample, TrainingIndex};
pub use silhouette::{Silhouette, SilhouetteBuilder};
pub use util::{SilMatchError, SilMatchResult};

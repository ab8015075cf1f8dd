//! Classifier configuration.
//!
//! `Config` is a plain value: build it with struct-update syntax over
//! `Config::default()`, then hand it to a component. Components validate on
//! construction and keep their own copy, so a running classifier never sees
//! its configuration change.

use crate::util::{SilMatchError, SilMatchResult};
use std::path::PathBuf;

/// Debug artifact verbosity. Levels are cumulative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebugLevel {
    /// No debug artifacts.
    #[default]
    Off,
    /// Annotated composite (original, edges and corner markers).
    Composite,
    /// Composite plus the raw silhouette and raw edge mask.
    CompositeAndStages,
    /// All of the above plus the clipped pre-binarization subject.
    CompositeStagesAndClip,
}

impl DebugLevel {
    /// Maps a numeric verbosity (0..=3) to a level; larger values saturate.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Off,
            1 => Self::Composite,
            2 => Self::CompositeAndStages,
            _ => Self::CompositeStagesAndClip,
        }
    }

    /// Numeric verbosity of this level.
    pub fn level(self) -> u8 {
        self as u8
    }

    /// True from `Composite` upward.
    pub fn writes_composite(self) -> bool {
        self >= Self::Composite
    }

    /// True from `CompositeAndStages` upward; implies `writes_composite`.
    pub fn writes_stages(self) -> bool {
        self >= Self::CompositeAndStages
    }

    /// True only at `CompositeStagesAndClip`, the highest level.
    pub fn writes_clip(self) -> bool {
        self >= Self::CompositeStagesAndClip
    }
}

/// Parameters forwarded to the edge detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeParams {
    /// Smoothing kernel half-size in pixels.
    pub kernel_radius: usize,
    /// Smoothing kernel width (Gaussian sigma).
    pub kernel_width: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            kernel_radius: 2,
            kernel_width: 1.0,
        }
    }
}

/// Parameters forwarded to the corner detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerParams {
    /// Harris sensitivity `k`; lower values admit more corners.
    pub sensitivity: f32,
    /// Response threshold as a fraction of the strongest response.
    pub contrast: f32,
    /// Minimum contour turning angle, in degrees, for a point to count.
    pub turn_angle_deg: f32,
    /// Non-maximum suppression radius (Chebyshev, pixels).
    pub nms_radius: usize,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            sensitivity: 0.04,
            contrast: 0.1,
            turn_angle_deg: 30.0,
            nms_radius: 4,
        }
    }
}

/// Configuration shared by every stage of the classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Side of the square normalized silhouette in pixels.
    pub size: u32,
    /// Empty border kept around the subject in pixels.
    pub border: u32,
    /// Match radius for scoring; `None` means `size / 20`.
    pub match_radius: Option<f32>,
    /// Debug artifact verbosity.
    pub debug: DebugLevel,
    /// Ignore existing cache entries and recompute everything.
    pub force_refresh: bool,
    /// Edge detector parameters.
    pub edge: EdgeParams,
    /// Corner detector parameters.
    pub corner: CornerParams,
    /// Writable directory for cache files and debug artifacts.
    pub work_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: 200,
            border: 4,
            match_radius: None,
            debug: DebugLevel::Off,
            force_refresh: false,
            edge: EdgeParams::default(),
            corner: CornerParams::default(),
            work_dir: PathBuf::from("work"),
        }
    }
}

impl Config {
    /// Effective match radius.
    pub fn match_radius(&self) -> f32 {
        self.match_radius.unwrap_or(self.size as f32 / 20.0)
    }

    /// Side of the box the subject is scaled into.
    pub fn inner_size(&self) -> u32 {
        self.size.saturating_sub(2 * self.border)
    }

    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> SilMatchResult<()> {
        if self.size == 0 {
            return Err(SilMatchError::Configuration("size must be positive".into()));
        }
        if self.border.saturating_mul(2) >= self.size {
            return Err(SilMatchError::Configuration(format!(
                "border {} leaves no room inside a {}px canvas",
                self.border, self.size
            )));
        }
        if let Some(radius) = self.match_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(SilMatchError::Configuration(format!(
                    "match radius must be a positive number, got {radius}"
                )));
            }
        }
        if !self.edge.kernel_width.is_finite() || self.edge.kernel_width <= 0.0 {
            return Err(SilMatchError::Configuration(
                "edge kernel width must be positive".into(),
            ));
        }
        let corner = &self.corner;
        if !corner.sensitivity.is_finite() || corner.sensitivity < 0.0 {
            return Err(SilMatchError::Configuration(
                "corner sensitivity must be non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&corner.contrast) {
            return Err(SilMatchError::Configuration(
                "corner contrast must lie in [0, 1]".into(),
            ));
        }
        if !(0.0..180.0).contains(&corner.turn_angle_deg) {
            return Err(SilMatchError::Configuration(
                "corner turn angle must lie in [0, 180) degrees".into(),
            ));
        }
        Ok(())
    }
}

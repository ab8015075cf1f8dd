//! Corner extraction pipeline.
//!
//! `extract` runs silhouette normalization, edge detection and corner
//! detection for one image file, consulting the feature cache first when the
//! caller allows it and writing debug artifacts according to the configured
//! [`DebugLevel`](crate::config::DebugLevel).

use crate::cache::FeatureCache;
use crate::config::Config;
use crate::detect::{CornerDetector, EdgeDetector, GradientEdgeDetector, HarrisCornerDetector};
use crate::geometry::CornerSet;
use crate::raster::io::{load_image, save_artifact};
use crate::raster::{darken, fill_square, lighten, AutoBackground, BackgroundRemoval};
use crate::silhouette::{Silhouette, SilhouetteBuilder};
use crate::trace::{trace_event, trace_span};
use crate::util::SilMatchResult;
use image::{DynamicImage, GrayImage, Rgb};
use std::path::{Path, PathBuf};

/// Half-width of the corner markers drawn on the debug composite.
const MARKER_HALF_WIDTH: i64 = 2;
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Extracts corner sets from image files.
pub struct CornerExtractor<E = GradientEdgeDetector, C = HarrisCornerDetector, B = AutoBackground>
{
    cfg: Config,
    builder: SilhouetteBuilder<B>,
    edges: E,
    corners: C,
    cache: FeatureCache,
}

impl CornerExtractor {
    /// Creates an extractor with the bundled detectors.
    pub fn new(cfg: Config) -> SilMatchResult<Self> {
        Self::with_detectors(cfg, GradientEdgeDetector, HarrisCornerDetector)
    }
}

impl<E: EdgeDetector, C: CornerDetector> CornerExtractor<E, C> {
    /// Creates an extractor with custom detectors.
    pub fn with_detectors(cfg: Config, edges: E, corners: C) -> SilMatchResult<Self> {
        let builder = SilhouetteBuilder::new(&cfg)?;
        let cache = FeatureCache::new(cfg.work_dir.clone(), cfg.force_refresh);
        Ok(Self {
            cfg,
            builder,
            edges,
            corners,
            cache,
        })
    }
}

impl<E: EdgeDetector, C: CornerDetector, B: BackgroundRemoval> CornerExtractor<E, C, B> {
    /// Replaces the background removal strategy.
    pub fn with_background<B2: BackgroundRemoval>(
        self,
        background: B2,
    ) -> SilMatchResult<CornerExtractor<E, C, B2>> {
        Ok(CornerExtractor {
            builder: SilhouetteBuilder::with_background(&self.cfg, background)?,
            cfg: self.cfg,
            edges: self.edges,
            corners: self.corners,
            cache: self.cache,
        })
    }

    /// Mirrors cache and artifact paths relative to `root`.
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache = self.cache.with_source_root(root);
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    /// Returns the corner set of the image at `source`.
    ///
    /// With `cacheable`, a fresh cache entry short-circuits the pipeline and a
    /// recomputed set is written back. One-off queries pass `false` and never
    /// touch the cache.
    pub fn extract(&self, source: &Path, cacheable: bool) -> SilMatchResult<CornerSet> {
        self.extract_with(&self.cache, source, cacheable)
    }

    /// Like [`extract`](Self::extract), but cache entries and artifacts
    /// mirror `source` relative to `root` regardless of the extractor's own
    /// source root.
    pub fn extract_under(
        &self,
        root: &Path,
        source: &Path,
        cacheable: bool,
    ) -> SilMatchResult<CornerSet> {
        let cache = self.cache.clone().with_source_root(root);
        self.extract_with(&cache, source, cacheable)
    }

    /// Runs the pipeline on an already decoded image. No cache or artifacts.
    pub fn extract_image(&self, img: &DynamicImage) -> SilMatchResult<CornerSet> {
        self.run(img, None)
    }

    fn extract_with(
        &self,
        cache: &FeatureCache,
        source: &Path,
        cacheable: bool,
    ) -> SilMatchResult<CornerSet> {
        let _span = trace_span!("extract", cacheable = cacheable).entered();
        if cacheable {
            match cache.fetch(source) {
                Ok(set) => return Ok(set),
                Err(err) if err.is_cache_miss() => {}
                Err(err) => return Err(err),
            }
        }

        let img = load_image(source)?;
        let set = self.run(&img, Some((cache, source)))?;
        if cacheable {
            cache.store(source, &set)?;
        }
        Ok(set)
    }

    fn run(
        &self,
        img: &DynamicImage,
        artifacts: Option<(&FeatureCache, &Path)>,
    ) -> SilMatchResult<CornerSet> {
        let silhouette = self.builder.normalize(img)?;
        let edges = self.edges.detect_edges(&silhouette.mask, &self.cfg.edge)?;
        let set = self.corners.detect_corners(&edges, &self.cfg.corner)?;
        trace_event!("corners", count = set.len());

        if let Some((cache, source)) = artifacts {
            self.write_artifacts(cache, source, &silhouette, &edges, &set)?;
        }
        Ok(set)
    }

    fn write_artifacts(
        &self,
        cache: &FeatureCache,
        source: &Path,
        silhouette: &Silhouette,
        edges: &GrayImage,
        set: &CornerSet,
    ) -> SilMatchResult<()> {
        let debug = self.cfg.debug;
        if debug.writes_composite() {
            let mut overlay = darken(&silhouette.composite, 0.5);
            lighten(&mut overlay, edges);
            for p in set {
                fill_square(&mut overlay, p.x, p.y, MARKER_HALF_WIDTH, MARKER_COLOR);
            }
            let path = cache.work_file(source, "composite", "png");
            save_artifact(&DynamicImage::ImageRgb8(overlay), path)?;
        }
        if debug.writes_stages() {
            let path = cache.work_file(source, "silhouette", "png");
            save_artifact(&DynamicImage::ImageLuma8(silhouette.mask.clone()), path)?;
            let path = cache.work_file(source, "edges", "png");
            save_artifact(&DynamicImage::ImageLuma8(edges.clone()), path)?;
        }
        if debug.writes_clip() {
            let path = cache.work_file(source, "clip", "png");
            save_artifact(&DynamicImage::ImageRgba8(silhouette.clipped.clone()), path)?;
        }
        Ok(())
    }
}

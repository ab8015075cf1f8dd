//! Training index: labelled reference corner sets.
//!
//! The training directory holds one subdirectory per category, each holding
//! that category's example images. Categories and files are visited in
//! lexicographic order so equal match scores resolve the same way on every
//! run.

use crate::detect::{CornerDetector, EdgeDetector};
use crate::extract::CornerExtractor;
use crate::geometry::CornerSet;
use crate::raster::BackgroundRemoval;
use crate::trace::{trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One reference image and its corners.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingExample {
    /// Source file name, kept for "closest match" reporting only.
    pub id: String,
    /// Extracted corners.
    pub corners: CornerSet,
}

/// Category name to reference examples, in deterministic order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingIndex {
    categories: BTreeMap<String, Vec<TrainingExample>>,
}

impl TrainingIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `dir` and extracts (with caching) every example image.
    ///
    /// Cache entries mirror each file's path relative to `dir`, so equally
    /// named files in different categories never share an entry. Hidden
    /// entries are skipped, as are plain files at the top level and nested
    /// directories inside a category. Any extraction failure aborts.
    pub fn build<E, C, B>(dir: &Path, extractor: &CornerExtractor<E, C, B>) -> SilMatchResult<Self>
    where
        E: EdgeDetector,
        C: CornerDetector,
        B: BackgroundRemoval,
    {
        if !dir.is_dir() {
            return Err(SilMatchError::Configuration(format!(
                "training directory {} does not exist",
                dir.display()
            )));
        }
        let _span = trace_span!("build_index").entered();

        let mut index = Self::new();
        for category_dir in sorted_entries(dir, true)? {
            let category = file_name(&category_dir);
            let examples = index.categories.entry(category).or_default();
            for file in sorted_entries(&category_dir, false)? {
                let corners = extractor.extract_under(dir, &file, true)?;
                examples.push(TrainingExample {
                    id: file_name(&file),
                    corners,
                });
            }
        }

        trace_event!(
            "index_built",
            categories = index.len(),
            examples = index.example_count()
        );
        Ok(index)
    }

    /// Builds an index from in-memory `(category, id, corners)` triples.
    pub fn from_examples<I, S, T>(examples: I) -> Self
    where
        I: IntoIterator<Item = (S, T, CornerSet)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut index = Self::new();
        for (category, id, corners) in examples {
            index.insert(category, id, corners);
        }
        index
    }

    /// Appends an example to `category`, creating the category if needed.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        id: impl Into<String>,
        corners: CornerSet,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .push(TrainingExample {
                id: id.into(),
                corners,
            });
    }

    /// Iterates categories in lexicographic order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[TrainingExample])> {
        self.categories
            .iter()
            .map(|(name, examples)| (name.as_str(), examples.as_slice()))
    }

    /// Examples of `category`.
    pub fn get(&self, category: &str) -> Option<&[TrainingExample]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of examples across categories.
    pub fn example_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Non-hidden directories (`dirs`) or files (`!dirs`) of `dir`, sorted by name.
fn sorted_entries(dir: &Path, dirs: bool) -> SilMatchResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| SilMatchError::artifact_io(dir, err))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SilMatchError::artifact_io(dir, err))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() == dirs {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::TrainingIndex;
    use crate::geometry::{CornerSet, Point};

    #[test]
    fn categories_iterate_lexicographically() {
        let set = CornerSet::new(vec![Point::new(1.0, 1.0)]);
        let index = TrainingIndex::from_examples([
            ("zebra", "z1.png", set.clone()),
            ("apple", "a2.png", set.clone()),
            ("apple", "a1.png", set.clone()),
        ]);
        let names: Vec<_> = index.categories().map(|(name, _)| name).collect();
        assert_eq!(names, ["apple", "zebra"]);
        let ids: Vec<_> = index
            .get("apple")
            .unwrap()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, ["a2.png", "a1.png"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.example_count(), 3);
    }
}

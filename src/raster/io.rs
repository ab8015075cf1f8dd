//! Image decoding and debug artifact encoding.

use crate::util::{SilMatchError, SilMatchResult};
use image::DynamicImage;
use std::fs;
use std::path::Path;

/// Decodes an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> SilMatchResult<DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|err| SilMatchError::ImageDecode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Writes an image artifact, creating parent directories as needed.
///
/// The encoder is chosen from the file extension.
pub fn save_artifact<P: AsRef<Path>>(img: &DynamicImage, path: P) -> SilMatchResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| SilMatchError::artifact_io(parent, err))?;
    }
    img.save(path)
        .map_err(|err| SilMatchError::artifact_io(path, err))
}

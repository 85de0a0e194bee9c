use std::fs;
use std::path::{Path, PathBuf};

use opencv::core::Mat;
use opencv::{imgcodecs, prelude::*};
use tracing::{debug, warn};

use crate::constants::GALLERY_EXTENSIONS;
use crate::error::{Error, Result};
use crate::pipeline::convert_to_grayscale;

/// A labelled grayscale image that detected faces are compared against.
pub struct ReferenceImage {
    label: String,
    image: Mat,
}

impl ReferenceImage {
    pub fn new(label: impl Into<String>, image: Mat) -> Self {
        Self {
            label: label.into(),
            image,
        }
    }

    /// File name of the source image, extension included.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn image(&self) -> &Mat {
        &self.image
    }
}

/// Reference images loaded once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct Gallery {
    references: Vec<ReferenceImage>,
}

impl Gallery {
    /// Loads every decodable `jpg`, `jpeg`, `png` or `bmp` file in `dir`.
    ///
    /// Entries are visited in file-name order. Files that fail to decode are
    /// logged and skipped; an unreadable directory is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let gallery_error = |source| Error::Gallery {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = fs::read_dir(dir)
            .map_err(gallery_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()
            .map_err(gallery_error)?;
        paths.sort();

        let mut references = Vec::new();
        for path in paths.into_iter().filter(|p| has_image_extension(p)) {
            let Some(label) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            match read_grayscale(&path) {
                Ok(Some(image)) => {
                    debug!(label = label.as_str(), "loaded reference image");
                    references.push(ReferenceImage::new(label, image));
                }
                Ok(None) => warn!("Failed to read image: {label}"),
                Err(err) => warn!(error = %err, "Failed to read image: {label}"),
            }
        }

        Ok(Self::from_references(references))
    }

    pub fn from_references(references: Vec<ReferenceImage>) -> Self {
        Self { references }
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceImage> {
        self.references.iter()
    }
}

/// Exact, case-sensitive match against [`GALLERY_EXTENSIONS`].
fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GALLERY_EXTENSIONS.contains(&ext))
}

/// Decodes `path` and converts it to grayscale. `Ok(None)` means the file
/// could not be decoded as an image.
fn read_grayscale(path: &Path) -> opencv::Result<Option<Mat>> {
    let Some(path) = path.to_str() else {
        return Ok(None);
    };
    let image = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Ok(None);
    }
    convert_to_grayscale(&image).map(Some)
}

use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::{objdetect, objdetect::CascadeClassifier, prelude::*, types::VectorOfRect};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::region::Region;

/// Finds face candidates in a grayscale frame.
///
/// Every returned region lies inside the frame and has a positive size.
pub trait RegionDetector {
    fn detect(&mut self, gray: &Mat) -> Result<Vec<Region>>;
}

/// Viola-Jones detector backed by an OpenCV Haar cascade.
pub struct CascadeDetector {
    classifier: CascadeClassifier,
}

impl CascadeDetector {
    pub fn load(path: &Path) -> Result<Self> {
        let model_error = |source| Error::ModelLoad {
            path: path.to_path_buf(),
            source,
        };
        let file = path.to_str().ok_or_else(|| model_error(None))?;

        let mut classifier =
            CascadeClassifier::new(file).map_err(|err| model_error(Some(err)))?;
        if !classifier.load(file).map_err(|err| model_error(Some(err)))? {
            return Err(model_error(None));
        }
        Ok(Self { classifier })
    }
}

impl RegionDetector for CascadeDetector {
    fn detect(&mut self, gray: &Mat) -> Result<Vec<Region>> {
        let mut faces = VectorOfRect::new();
        self.classifier.detect_multi_scale(
            gray,
            &mut faces,
            CASCADE_SCALE_FACTOR,
            CASCADE_MIN_NEIGHBORS,
            objdetect::CASCADE_SCALE_IMAGE,
            Size::new(CASCADE_MIN_SIZE, CASCADE_MIN_SIZE),
            Size::new(0, 0),
        )?;

        let (width, height) = (gray.cols(), gray.rows());
        Ok(faces
            .iter()
            .filter_map(|face| Region::clamped(face, width, height))
            .collect())
    }
}

use opencv::core::Mat;
use opencv::{imgproc, prelude::*};
use tracing::{debug, warn};

use crate::error::Result;
use crate::gallery::Gallery;
use crate::region::Region;

/// The highest-scoring reference for a region.
#[derive(Clone, Debug, PartialEq)]
pub struct BestMatch {
    pub label: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// `None` when no reference could be compared.
    pub best: Option<BestMatch>,
    pub matched: bool,
}

impl MatchResult {
    pub fn unmatched() -> Self {
        Self {
            best: None,
            matched: false,
        }
    }

    /// Label of the identified reference, only set for a match.
    pub fn label(&self) -> Option<&str> {
        self.best
            .as_ref()
            .filter(|_| self.matched)
            .map(|best| best.label.as_str())
    }

    pub fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|best| best.score)
    }
}

/// Identifies regions by normalized cross-correlation against a gallery.
#[derive(Clone, Copy, Debug)]
pub struct RegionMatcher {
    threshold: f64,
}

impl RegionMatcher {
    /// A region matches when its best score is strictly above `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn match_region(&self, gray: &Mat, region: &Region, gallery: &Gallery) -> Result<MatchResult> {
        if region.is_empty() {
            debug!(?region, "skipping degenerate region");
            return Ok(MatchResult::unmatched());
        }
        if gallery.is_empty() {
            return Ok(MatchResult::unmatched());
        }

        let candidate = Mat::roi(gray, region.rect())?;

        let mut best: Option<BestMatch> = None;
        for reference in gallery.iter() {
            let score = match similarity(reference.image(), &candidate) {
                Ok(score) if score.is_finite() => score,
                Ok(score) => {
                    warn!(label = reference.label(), score, "ignoring non-finite similarity");
                    continue;
                }
                Err(err) => {
                    warn!(label = reference.label(), error = %err, "Error occurred during template matching");
                    continue;
                }
            };
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(BestMatch {
                    label: reference.label().to_string(),
                    score,
                });
            }
        }

        let matched = best.as_ref().is_some_and(|b| b.score > self.threshold);
        Ok(MatchResult { best, matched })
    }
}

/// Resizes `reference` to the size of `candidate`, ignoring aspect ratio,
/// and returns their `TM_CCOEFF_NORMED` score in [-1, 1].
///
/// OpenCV scores a zero-variance (flat) candidate as 1.0 against any reference.
pub fn similarity(reference: &Mat, candidate: &Mat) -> opencv::Result<f64> {
    let mut resized = Mat::default();
    imgproc::resize(
        reference,
        &mut resized,
        candidate.size()?,
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut result = Mat::default();
    imgproc::match_template(
        &resized,
        candidate,
        &mut result,
        imgproc::TM_CCOEFF_NORMED,
        &Mat::default(),
    )?;
    Ok(f64::from(*result.at_2d::<f32>(0, 0)?))
}

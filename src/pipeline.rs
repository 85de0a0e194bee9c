use opencv::core::Mat;
use opencv::{imgproc, prelude::*};
use tracing::{debug, warn};

use crate::annotate::annotate;
use crate::detector::RegionDetector;
use crate::error::Result;
use crate::gallery::Gallery;
use crate::matcher::{MatchResult, RegionMatcher};
use crate::region::Region;

/// A detected region together with its identification outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub region: Region,
    pub result: MatchResult,
}

/// Per-frame detect, match and annotate.
///
/// Holds no per-frame state: the gallery and matcher are read-only and each
/// call to [`Pipeline::process`] depends only on the frame it is given.
pub struct Pipeline<D> {
    detector: D,
    gallery: Gallery,
    matcher: RegionMatcher,
}

impl<D: RegionDetector> Pipeline<D> {
    pub fn new(detector: D, gallery: Gallery, matcher: RegionMatcher) -> Self {
        Self {
            detector,
            gallery,
            matcher,
        }
    }

    /// Annotates `frame` in place and returns what was drawn.
    pub fn process(&mut self, frame: &mut Mat) -> Result<Vec<Detection>> {
        let gray = convert_to_grayscale(frame)?;
        let regions = self.detector.detect(&gray)?;

        let detections: Vec<Detection> = regions
            .into_iter()
            .map(|region| {
                let result = self
                    .matcher
                    .match_region(&gray, &region, &self.gallery)
                    .unwrap_or_else(|err| {
                        warn!(?region, error = %err, "failed to match region");
                        MatchResult::unmatched()
                    });
                debug!(
                    ?region,
                    label = result.label(),
                    score = result.score(),
                    "region evaluated"
                );
                Detection { region, result }
            })
            .collect();

        annotate(frame, &detections)?;

        debug!(
            detected = detections.len(),
            matched = detections.iter().filter(|d| d.result.matched).count(),
            "frame processed"
        );
        Ok(detections)
    }
}

/// Single-channel copy of `frame`; accepts gray, BGR and BGRA input.
pub fn convert_to_grayscale(frame: &Mat) -> opencv::Result<Mat> {
    let code = match frame.channels() {
        1 => return frame.try_clone(),
        4 => imgproc::COLOR_BGRA2GRAY,
        _ => imgproc::COLOR_BGR2GRAY,
    };
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, code, 0)?;
    Ok(gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MATCH_THRESHOLD;
    use crate::test_support::{noise_image, paste, to_bgr, uniform_image, write_image};
    use approx::assert_relative_eq;
    use opencv::core::Vec3b;

    /// Returns the same regions for every frame.
    struct StubDetector {
        regions: Vec<Region>,
    }

    impl RegionDetector for StubDetector {
        fn detect(&mut self, _gray: &Mat) -> Result<Vec<Region>> {
            Ok(self.regions.clone())
        }
    }

    fn pipeline(regions: Vec<Region>, gallery: Gallery) -> Pipeline<StubDetector> {
        Pipeline::new(
            StubDetector { regions },
            gallery,
            RegionMatcher::new(DEFAULT_MATCH_THRESHOLD),
        )
    }

    fn pixel(frame: &Mat, x: i32, y: i32) -> [u8; 3] {
        frame.at_2d::<Vec3b>(y, x).unwrap().0
    }

    #[test]
    fn test_known_face_is_identified_in_scene() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "alice.jpg", &noise_image(64, 64, 2));
        let gallery = Gallery::load(dir.path()).unwrap();
        let alice = gallery.iter().next().unwrap().image().try_clone().unwrap();

        let face = Region::new(100, 60, 64, 64);
        let mut scene = noise_image(320, 240, 1);
        paste(&mut scene, &alice, face.x, face.y);
        let mut frame = to_bgr(&scene);

        let background = [Region::new(10, 10, 64, 64), Region::new(220, 150, 64, 64)];
        let mut regions = background.to_vec();
        regions.insert(1, face);
        let detections = pipeline(regions, gallery).process(&mut frame).unwrap();

        let matched: Vec<&Detection> = detections.iter().filter(|d| d.result.matched).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].region, face);
        assert_eq!(matched[0].result.label(), Some("alice.jpg"));
        assert_relative_eq!(matched[0].result.score().unwrap(), 1.0, epsilon = 1e-4);

        for region in background {
            let detection = detections.iter().find(|d| d.region == region).unwrap();
            assert!(!detection.result.matched);
        }

        assert_eq!(pixel(&frame, face.x, face.y + 30), [0, 165, 255]);
        assert_eq!(pixel(&frame, 10, 40), [255, 0, 0]);
    }

    #[test]
    fn test_empty_gallery_leaves_every_region_unmatched() {
        let regions = vec![Region::new(0, 0, 40, 40), Region::new(50, 50, 40, 40)];
        let mut frame = to_bgr(&noise_image(120, 120, 3));

        let detections = pipeline(regions.clone(), Gallery::default())
            .process(&mut frame)
            .unwrap();

        assert_eq!(detections.len(), regions.len());
        assert!(detections.iter().all(|d| d.result == MatchResult::unmatched()));
        assert_eq!(pixel(&frame, 50, 70), [255, 0, 0]);
    }

    #[test]
    fn test_no_regions_leaves_frame_untouched() {
        let original = to_bgr(&uniform_image(80, 60, 42));
        let mut frame = original.try_clone().unwrap();

        let detections = pipeline(Vec::new(), Gallery::default())
            .process(&mut frame)
            .unwrap();

        assert!(detections.is_empty());
        assert_eq!(pixel(&frame, 0, 0), pixel(&original, 0, 0));
        assert_eq!(pixel(&frame, 79, 59), pixel(&original, 79, 59));
    }

    #[test]
    fn test_process_is_stateless() {
        let face = noise_image(40, 40, 4);
        let mut scene = noise_image(160, 120, 5);
        paste(&mut scene, &face, 30, 30);
        let gallery = Gallery::from_references(vec![crate::gallery::ReferenceImage::new(
            "alice.png",
            face,
        )]);
        let mut pipeline = pipeline(vec![Region::new(30, 30, 40, 40)], gallery);

        let mut first = to_bgr(&scene);
        let mut second = to_bgr(&scene);
        let a = pipeline.process(&mut first).unwrap();
        let b = pipeline.process(&mut second).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_convert_to_grayscale_accepts_common_layouts() {
        let gray = uniform_image(8, 6, 77);
        let bgr = to_bgr(&gray);
        let mut bgra = Mat::default();
        imgproc::cvt_color(&bgr, &mut bgra, imgproc::COLOR_BGR2BGRA, 0).unwrap();

        for input in [&gray, &bgr, &bgra] {
            let out = convert_to_grayscale(input).unwrap();
            assert_eq!(out.channels(), 1);
            assert_eq!((out.cols(), out.rows()), (8, 6));
            assert_eq!(*out.at_2d::<u8>(3, 4).unwrap(), 77);
        }
    }
}

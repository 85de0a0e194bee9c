use opencv::core::{Mat, Point, Scalar};
use opencv::imgproc;

use crate::constants::*;
use crate::pipeline::Detection;

fn detected_color() -> Scalar {
    Scalar::new(255., 0., 0., 0.)
}

fn matched_color() -> Scalar {
    Scalar::new(0., 165., 255., 0.)
}

/// Draws every detection onto `frame`: blue boxes for unknown faces,
/// orange boxes plus the label for identified ones.
///
/// Boxes reaching past the frame edge are clipped by OpenCV.
pub fn annotate(frame: &mut Mat, detections: &[Detection]) -> opencv::Result<()> {
    for detection in detections {
        draw_detection(frame, detection)?;
    }
    Ok(())
}

fn draw_detection(frame: &mut Mat, detection: &Detection) -> opencv::Result<()> {
    let rect = detection.region.rect();
    let Some(label) = detection.result.label() else {
        return imgproc::rectangle(frame, rect, detected_color(), BOX_THICKNESS, imgproc::LINE_8, 0);
    };

    imgproc::rectangle(frame, rect, matched_color(), BOX_THICKNESS, imgproc::LINE_8, 0)?;
    imgproc::put_text(
        frame,
        label,
        Point::new(rect.x, rect.y - LABEL_OFFSET_Y),
        imgproc::FONT_HERSHEY_SIMPLEX,
        LABEL_FONT_SCALE,
        matched_color(),
        LABEL_THICKNESS,
        imgproc::LINE_8,
        false,
    )
}

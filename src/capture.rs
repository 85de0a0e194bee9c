use opencv::core::Mat;
use opencv::{prelude::*, videoio, videoio::VideoCapture};

use crate::error::{Error, Result};

pub(crate) struct Capture {
    capture: VideoCapture,
}

impl Capture {
    pub fn create(index: i32, width: i32, height: i32) -> Result<Self> {
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraOpen(index));
        }
        // Only a hint; drivers fall back to the nearest supported mode.
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
        Ok(Self { capture })
    }

    /// Reads the next frame. `Ok(None)` marks the end of the stream.
    pub fn grab_frame(&mut self) -> opencv::Result<Option<Mat>> {
        let mut frame = Mat::default();
        self.capture.read(&mut frame)?;
        if frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

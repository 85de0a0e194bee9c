use opencv::core::{Point, Scalar};
use opencv::imgproc;
use opencv::{highgui, prelude::*};

use crate::constants::{ESC_KEY_CODE, Q_KEY_CODE};

type Result<T> = opencv::Result<T>;

pub(crate) struct Window {
    name: String,
}

impl Window {
    pub fn create(name: &'_ str, width: i32, height: i32) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_GUI_NORMAL | highgui::WINDOW_KEEPRATIO)?;
        highgui::resize_window(name, width, height)?;
        Ok(Self {
            name: name.to_owned(),
        })
    }

    pub fn show_image(&self, frame: &mut Mat, fps: Option<f64>) -> Result<()> {
        if let Some(fps) = fps {
            imgproc::put_text(
                frame,
                &format!("FPS: {:.2}", fps),
                Point::new(10, 20),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.5,
                Scalar::new(0., 0., 255., 0.),
                1,
                imgproc::LINE_8,
                false,
            )?;
        }

        highgui::imshow(&self.name, frame)
    }

    /// Pumps window events for a millisecond and reports whether the
    /// operator asked to quit.
    pub fn poll_quit(&self) -> Result<bool> {
        Ok(is_quit_key(highgui::wait_key(1)?))
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}

fn is_quit_key(key: i32) -> bool {
    key >= 0 && matches!(key & 0xFF, ESC_KEY_CODE | Q_KEY_CODE)
}

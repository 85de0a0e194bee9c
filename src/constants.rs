pub const DEFAULT_SETTINGS_FILE: &str = "settings.conf";

pub const CAPTURE_WIDTH: i32 = 640;
pub const CAPTURE_HEIGHT: i32 = 480;

pub const WINDOW_NAME: &str = "Face Detection";

pub const CASCADE_SCALE_FACTOR: f64 = 1.1;
pub const CASCADE_MIN_NEIGHBORS: i32 = 2;
pub const CASCADE_MIN_SIZE: i32 = 30;

/// Deliberately permissive; raise it for fewer false positives.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.1;

pub const GALLERY_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

pub const BOX_THICKNESS: i32 = 2;
pub const LABEL_FONT_SCALE: f64 = 0.9;
pub const LABEL_THICKNESS: i32 = 2;
pub const LABEL_OFFSET_Y: i32 = 10;

pub const ESC_KEY_CODE: i32 = 27;
pub const Q_KEY_CODE: i32 = 113;

pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 30;

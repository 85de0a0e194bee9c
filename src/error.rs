use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not load cascade model: {}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: Option<opencv::Error>,
    },
    #[error("could not read gallery directory {}: {source}", .path.display())]
    Gallery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not open camera {0}")]
    CameraOpen(i32),
    #[error("opencv: {0}")]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

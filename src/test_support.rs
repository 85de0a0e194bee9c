//! Synthetic image helpers shared by the unit tests.

use std::path::{Path, PathBuf};

use opencv::core::{self, Mat, Scalar, Vector};
use opencv::{imgcodecs, imgproc, prelude::*};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn uniform_image(width: i32, height: i32, value: u8) -> Mat {
    Mat::new_rows_cols_with_default(height, width, core::CV_8UC1, Scalar::all(value as f64))
        .unwrap()
}

pub fn noise_image(width: i32, height: i32, seed: u64) -> Mat {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = uniform_image(width, height, 0);
    for row in 0..height {
        for col in 0..width {
            *image.at_2d_mut::<u8>(row, col).unwrap() = rng.gen();
        }
    }
    image
}

pub fn inverted(image: &Mat) -> Mat {
    let mut out = image.try_clone().unwrap();
    for row in 0..image.rows() {
        for col in 0..image.cols() {
            let value = *image.at_2d::<u8>(row, col).unwrap();
            *out.at_2d_mut::<u8>(row, col).unwrap() = 255 - value;
        }
    }
    out
}

/// Copies `src` into `dst` with its top-left corner at (`x`, `y`).
pub fn paste(dst: &mut Mat, src: &Mat, x: i32, y: i32) {
    for row in 0..src.rows() {
        for col in 0..src.cols() {
            let value = *src.at_2d::<u8>(row, col).unwrap();
            *dst.at_2d_mut::<u8>(y + row, x + col).unwrap() = value;
        }
    }
}

pub fn to_bgr(gray: &Mat) -> Mat {
    let mut bgr = Mat::default();
    imgproc::cvt_color(gray, &mut bgr, imgproc::COLOR_GRAY2BGR, 0).unwrap();
    bgr
}

pub fn write_image(dir: &Path, name: &str, image: &Mat) -> PathBuf {
    let path = dir.join(name);
    let written = imgcodecs::imwrite(path.to_str().unwrap(), image, &Vector::<i32>::new()).unwrap();
    assert!(written, "failed to write {}", path.display());
    path
}

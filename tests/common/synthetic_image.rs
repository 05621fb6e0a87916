use image::{Rgb, RgbImage};
use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;
use std::path::{Path, PathBuf};

/// Tube ends laid out as two rows: three at y=30, two at y=70.
pub const TUBE_CENTERS: [(i32, i32); 5] = [(30, 30), (70, 30), (110, 30), (30, 70), (70, 70)];
pub const TUBE_RADIUS: i32 = 4;

/// Light tube sheet with dark filled discs at `centers`.
pub fn tube_sheet(width: u32, height: u32, centers: &[(i32, i32)], radius: i32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = centers.iter().any(|&(cx, cy)| {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            dx * dx + dy * dy <= radius * radius
        });
        if inside {
            Rgb([20, 20, 20])
        } else {
            Rgb([230, 230, 230])
        }
    })
}

pub fn default_tube_sheet() -> RgbImage {
    tube_sheet(140, 100, &TUBE_CENTERS, TUBE_RADIUS)
}

pub fn blank_sheet(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([180, 180, 180]))
}

/// Save `image` as PNG under `dir` and return its path.
pub fn save_png(image: &RgbImage, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

/// Uniform BGR canvas for session tests.
pub fn gray_canvas(width: i32, height: i32) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(128.0)).unwrap()
}

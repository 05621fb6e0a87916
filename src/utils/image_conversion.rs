use crate::pipeline::{PipelineError, PipelineResult};
use image::{GrayImage, Rgb, RgbImage};
use opencv::core::{Mat, Vec3b, VecN};
use opencv::prelude::*;
use std::path::Path;

/// Decode an image file into RGB pixels.
///
/// Missing, unreadable and undecodable files all surface as
/// `PipelineError::InputDecode`.
pub fn load_rgb_image(path: &Path) -> PipelineResult<RgbImage> {
    let img = image::open(path).map_err(|source| PipelineError::InputDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Convert an RgbImage to a BGR OpenCV Mat
pub fn rgbimage_to_mat(image: &RgbImage) -> PipelineResult<Mat> {
    let (width, height) = image.dimensions();
    let mut mat = Mat::zeros(height as i32, width as i32, opencv::core::CV_8UC3)?.to_mat()?;

    for (x, y, Rgb([r, g, b])) in image.enumerate_pixels() {
        *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? = VecN([*b, *g, *r]);
    }

    Ok(mat)
}

/// Convert a GrayImage to a single-channel OpenCV Mat
pub fn grayimage_to_mat(image: &GrayImage) -> PipelineResult<Mat> {
    let (width, height) = image.dimensions();
    let data = image.as_raw();

    let mut mat = Mat::zeros(height as i32, width as i32, opencv::core::CV_8UC1)?.to_mat()?;

    for y in 0..height {
        for x in 0..width {
            let pixel = data[(y * width + x) as usize];
            *mat.at_2d_mut::<u8>(y as i32, x as i32)? = pixel;
        }
    }

    Ok(mat)
}

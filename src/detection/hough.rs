use crate::config::DetectorConfig;
use crate::pipeline::{Feature, FeatureDetector, PipelineResult};
use opencv::core::{Mat, Size, Vec3f, VecN, Vector};
use opencv::imgproc;
use opencv::prelude::*;

/// Finds small circular tube ends with OpenCV's gradient Hough transform.
///
/// The image is reduced to intensity, smoothed with a Gaussian kernel and
/// then searched for circles inside the configured radius band. Thresholds
/// are deliberately low so faint, low-contrast tube rims still vote.
pub struct HoughCircleDetector {
    config: DetectorConfig,
}

impl Default for HoughCircleDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl HoughCircleDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn to_gray(&self, image: &Mat) -> PipelineResult<Mat> {
        let code = match image.channels() {
            1 => return Ok(image.try_clone()?),
            4 => imgproc::COLOR_BGRA2GRAY,
            _ => imgproc::COLOR_BGR2GRAY,
        };
        let mut gray = Mat::default();
        imgproc::cvt_color_def(image, &mut gray, code)?;
        Ok(gray)
    }

    fn smooth(&self, gray: &Mat) -> PipelineResult<Mat> {
        let mut blurred = Mat::default();
        let k = self.config.blur_kernel_size;
        imgproc::gaussian_blur_def(gray, &mut blurred, Size::new(k, k), self.config.blur_sigma)?;
        Ok(blurred)
    }

    fn find_circles(&self, blurred: &Mat) -> PipelineResult<Vector<Vec3f>> {
        let mut circles = Vector::<Vec3f>::new();
        imgproc::hough_circles(
            blurred,
            &mut circles,
            imgproc::HOUGH_GRADIENT,
            self.config.dp,
            self.config.min_center_distance,
            self.config.canny_threshold,
            self.config.accumulator_threshold,
            self.config.min_radius,
            self.config.max_radius,
        )?;
        Ok(circles)
    }
}

impl FeatureDetector for HoughCircleDetector {
    fn name(&self) -> &str {
        "HoughCircles"
    }

    fn detect(&self, image: &Mat) -> PipelineResult<Vec<Feature>> {
        if image.empty() {
            tracing::warn!("Empty image passed to detector");
            return Ok(Vec::new());
        }

        let gray = self.to_gray(image)?;
        let blurred = self.smooth(&gray)?;
        let circles = self.find_circles(&blurred)?;

        let features: Vec<Feature> = circles
            .iter()
            .map(|VecN([cx, cy, r])| {
                Feature::new(cx.round() as i32, cy.round() as i32, r.round() as i32)
            })
            .collect();

        for feature in &features {
            tracing::trace!(x = feature.x, y = feature.y, radius = feature.radius, "Circle candidate");
        }
        tracing::debug!(
            width = image.cols(),
            height = image.rows(),
            candidates = features.len(),
            "Hough circle detection finished"
        );

        Ok(features)
    }
}

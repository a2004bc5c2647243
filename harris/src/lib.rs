//! # Harris
//!
//! Harris corner detection and patch-based feature matching on grayscale
//! float images.
//!
//! [`Harris`] turns an image into keypoints ranked by corner response, and
//! [`PatchMatcher`] pairs up keypoints of two images one-to-one by comparing
//! the image patches around them. The two are independent; the output of
//! one is simply fed to the other.
//!
//! ```
//! use harris::{GrayFloatImage, Harris, PatchMatcher};
//!
//! let image = GrayFloatImage::from_fn(32, 32, |x, y| {
//!     if (8..20).contains(&x) && (10..24).contains(&y) { 1.0 } else { 0.0 }
//! });
//! let keypoints = Harris::default().detect(&image);
//! assert_eq!(keypoints.len(), 4);
//! let matches = PatchMatcher::ssd(7)
//!     .unwrap()
//!     .match_features(&image, &keypoints, &image, &keypoints);
//! assert_eq!(matches.len(), 4);
//! ```

mod assignment;
pub mod derivatives;
mod descriptors;
mod detector_response;
mod distance;
mod error;
pub mod image;
mod matcher;
mod maxima;

pub use assignment::{greedy_assignment, optimal_assignment};
pub use cv_core::{FeatureMatch, KeyPoint};
pub use distance::{match_ncc, match_ssd};
pub use error::Error;
pub use image::{BorderMode, GrayFloatImage};
pub use matcher::{Assignment, MatcherParams, MatchingMethod, PatchMatcher};

use crate::error::{ensure_odd, ensure_positive};
use ::image::{DynamicImage, ImageResult};
use log::*;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Contains the configuration parameters of the Harris corner detector.
///
/// The defaults work well for images with intensities in `[0, 1]`.
/// [`Harris::with_max_features`] can be used to change only the cap on the
/// number of returned keypoints.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarrisParams {
    /// Standard deviation of the Gaussian window that weights the structure tensor
    pub gaussian_sigma: f32,

    /// Side length of the non-maximum suppression window. Must be odd.
    pub maxfilter_window_size: usize,

    /// Sensitivity constant `k` in `det - k * trace^2`, typically 0.04 to 0.06
    pub harris_corner_k: f32,

    /// Maximum number of keypoints returned
    pub max_num_features: usize,

    /// How samples outside of the image are produced by every filter
    pub border: BorderMode,
}

impl Default for HarrisParams {
    fn default() -> HarrisParams {
        HarrisParams {
            gaussian_sigma: 1.0,
            maxfilter_window_size: 5,
            harris_corner_k: 0.05,
            max_num_features: 500,
            border: BorderMode::default(),
        }
    }
}

/// The Harris corner detector.
///
/// Construct it with validated [`HarrisParams`] through [`Harris::new`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Harris {
    params: HarrisParams,
}

impl Harris {
    /// Validate `params` and build a detector.
    pub fn new(params: HarrisParams) -> Result<Self, Error> {
        ensure_positive("gaussian_sigma", f64::from(params.gaussian_sigma))?;
        ensure_odd("maxfilter_window_size", params.maxfilter_window_size)?;
        ensure_positive("harris_corner_k", f64::from(params.harris_corner_k))?;
        ensure_positive("max_num_features", params.max_num_features as f64)?;
        Ok(Self { params })
    }

    /// This convenience constructor is provided for the very common case
    /// that only the number of features needs to be modified.
    pub fn with_max_features(max_num_features: usize) -> Result<Self, Error> {
        Self::new(HarrisParams {
            max_num_features,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &HarrisParams {
        &self.params
    }

    /// Find the corners of an image.
    ///
    /// # Arguments
    /// * `image` - The input image.
    /// # Return value
    /// At most `max_num_features` keypoints, strongest response first.
    pub fn detect(&self, image: &GrayFloatImage) -> Vec<KeyPoint> {
        if image.is_empty() {
            debug!("Empty image, no keypoints.");
            return vec![];
        }
        let response = self.corner_response(image);
        trace!("Computing corner response finished.");
        let keypoints = self.keypoints_from_response(&response);
        info!("Detected {} corners", keypoints.len());
        keypoints
    }

    /// Find the corners of an image from the `image` crate.
    ///
    /// The image is converted to grayscale with intensities in `[0, 1]`.
    pub fn detect_dynamic(&self, image: &DynamicImage) -> Vec<KeyPoint> {
        self.detect(&GrayFloatImage::from_dynamic(image))
    }

    /// Find the corners of an image on disk.
    ///
    /// # Arguments
    /// * `path` - The input image path.
    ///
    /// Returns an `ImageResult` of the keypoints.
    pub fn detect_path(&self, path: impl AsRef<Path>) -> ImageResult<Vec<KeyPoint>> {
        Ok(self.detect_dynamic(&::image::open(path)?))
    }
}

use crate::error::{ensure_odd, Error};
use crate::image::{BorderMode, GrayFloatImage};
use core::str::FromStr;
use cv_core::{FeatureMatch, KeyPoint};
use log::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How two descriptors are compared. Lower distances are better for both.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchingMethod {
    /// Sum of squared differences, see [`match_ssd`](crate::match_ssd).
    Ssd,
    /// One minus normalized cross-correlation, see [`match_ncc`](crate::match_ncc).
    Ncc,
}

impl FromStr for MatchingMethod {
    type Err = Error;

    /// Parse `"ssd"` or `"ncc"`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ssd") {
            Ok(MatchingMethod::Ssd)
        } else if s.eq_ignore_ascii_case("ncc") {
            Ok(MatchingMethod::Ncc)
        } else {
            Err(Error::UnknownMatchingMethod(s.to_owned()))
        }
    }
}

/// The strategy used to turn a distance matrix into one-to-one matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Assignment {
    /// Minimum total distance over all one-to-one matchings.
    #[default]
    Optimal,
    /// Repeatedly match the closest remaining pair. Faster, but only an
    /// approximation of [`Assignment::Optimal`].
    Greedy,
}

/// Contains the configuration parameters of the patch matcher.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatcherParams {
    /// Side length of the square patch around each keypoint. Must be odd.
    pub window_size: usize,

    /// Descriptor distance.
    pub matching_method: MatchingMethod,

    /// How matches are chosen from the distance matrix.
    pub assignment: Assignment,

    /// How patch samples outside of the image are produced.
    pub border: BorderMode,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            window_size: 7,
            matching_method: MatchingMethod::Ncc,
            assignment: Assignment::default(),
            border: BorderMode::default(),
        }
    }
}

/// Matches keypoints between two images by comparing the image patches
/// around them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PatchMatcher {
    pub(crate) params: MatcherParams,
}

impl PatchMatcher {
    /// Validate `params` and build a matcher.
    pub fn new(params: MatcherParams) -> Result<Self, Error> {
        ensure_odd("window_size", params.window_size)?;
        Ok(Self { params })
    }

    /// Build a matcher from a window size and a method name such as `"NCC"`.
    pub fn from_names(window_size: usize, method_name: &str) -> Result<Self, Error> {
        Self::new(MatcherParams {
            window_size,
            matching_method: method_name.parse()?,
            ..Default::default()
        })
    }

    /// A sum of squared differences matcher with `window_size` patches.
    pub fn ssd(window_size: usize) -> Result<Self, Error> {
        Self::new(MatcherParams {
            window_size,
            matching_method: MatchingMethod::Ssd,
            ..Default::default()
        })
    }

    /// A normalized cross-correlation matcher with `window_size` patches.
    pub fn ncc(window_size: usize) -> Result<Self, Error> {
        Self::new(MatcherParams {
            window_size,
            matching_method: MatchingMethod::Ncc,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &MatcherParams {
        &self.params
    }

    /// Match keypoints of one image to keypoints of another.
    ///
    /// This performs all operations end-to-end: descriptor extraction,
    /// distance computation and one-to-one assignment. Every returned
    /// `FeatureMatch(i, j)` pairs `keypoints1[i]` with `keypoints2[j]`.
    ///
    /// # Example
    /// ```
    /// use harris::{GrayFloatImage, PatchMatcher};
    /// use cv_core::{FeatureMatch, KeyPoint};
    ///
    /// let image = GrayFloatImage::from_fn(16, 16, |x, y| ((x * 3 + y * 5) % 7) as f32);
    /// let keypoints = [KeyPoint::new(4, 4), KeyPoint::new(9, 6)];
    /// let matcher = PatchMatcher::from_names(3, "ssd").unwrap();
    /// let matches = matcher.match_features(&image, &keypoints, &image, &keypoints);
    /// assert_eq!(matches, vec![FeatureMatch(0, 0), FeatureMatch(1, 1)]);
    /// ```
    pub fn match_features(
        &self,
        image1: &GrayFloatImage,
        keypoints1: &[KeyPoint],
        image2: &GrayFloatImage,
        keypoints2: &[KeyPoint],
    ) -> Vec<FeatureMatch<usize>> {
        let descriptors1 = self.get_descriptors(image1, keypoints1);
        let descriptors2 = self.get_descriptors(image2, keypoints2);
        trace!("Extracting descriptors finished.");
        let distances = self
            .params
            .matching_method
            .distance_matrix(&descriptors1, &descriptors2);
        trace!("Computing distance matrix finished.");
        let matches = self.compute_matches(&distances);
        info!(
            "Matched {} of {} x {} keypoints",
            matches.len(),
            keypoints1.len(),
            keypoints2.len()
        );
        matches
    }
}

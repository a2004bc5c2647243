use crate::image::{maximum_filter, GrayFloatImage};
use crate::Harris;
use core::cmp::Reverse;
use cv_core::KeyPoint;
use float_ord::FloatOrd;
use log::*;

impl Harris {
    /// Turn a corner response into ranked keypoints.
    ///
    /// A pixel survives when it is the maximum of the
    /// `maxfilter_window_size` window around it and its response is
    /// strictly positive. Survivors are ordered by descending response,
    /// with ties left in row-major scan order, and truncated to
    /// `max_num_features`.
    ///
    /// # Arguments
    /// * `response` - A corner response, usually from [`Harris::corner_response`].
    /// # Return value
    /// The strongest keypoints.
    pub fn keypoints_from_response(&self, response: &GrayFloatImage) -> Vec<KeyPoint> {
        let maxima = maximum_filter(
            response,
            self.params.maxfilter_window_size,
            self.params.border,
        );
        let mut candidates: Vec<(f32, KeyPoint)> = response
            .ref_array2()
            .indexed_iter()
            .zip(maxima.ref_array2().iter())
            .filter(|&((_, &r), &max)| r > 0.0 && r == max)
            .map(|(((y, x), &r), _)| (r, KeyPoint::new(x as u32, y as u32)))
            .collect();
        debug!("Found {} local maxima.", candidates.len());
        // Stable, so equal responses stay in scan order.
        candidates.sort_by_key(|&(r, _)| Reverse(FloatOrd(r)));
        candidates.truncate(self.params.max_num_features);
        candidates.into_iter().map(|(_, keypoint)| keypoint).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{image::GrayFloatImage, Harris, HarrisParams};
    use cv_core::KeyPoint;

    fn harris(window: usize, cap: usize) -> Harris {
        Harris::new(HarrisParams {
            maxfilter_window_size: window,
            max_num_features: cap,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn isolated_peaks_ranked_by_response() {
        let response = GrayFloatImage::from_fn(10, 10, |x, y| match (x, y) {
            (2, 2) => 1.0,
            (7, 3) => 3.0,
            (4, 8) => 2.0,
            _ => 0.0,
        });
        let keypoints = harris(3, 10).keypoints_from_response(&response);
        assert_eq!(
            keypoints,
            vec![
                KeyPoint::new(7, 3),
                KeyPoint::new(4, 8),
                KeyPoint::new(2, 2)
            ]
        );
    }

    #[test]
    fn non_positive_maxima_are_dropped() {
        let response = GrayFloatImage::from_fn(6, 6, |x, y| if (x, y) == (3, 3) { 0.0 } else { -1.0 });
        assert!(harris(3, 10).keypoints_from_response(&response).is_empty());
    }

    #[test]
    fn plateau_ties_keep_scan_order() {
        // Both pixels equal their neighbourhood maximum.
        let response = GrayFloatImage::from_fn(8, 4, |x, y| {
            if y == 1 && (x == 1 || x == 2) {
                5.0
            } else {
                0.0
            }
        });
        let keypoints = harris(3, 10).keypoints_from_response(&response);
        assert_eq!(keypoints, vec![KeyPoint::new(1, 1), KeyPoint::new(2, 1)]);
    }

    #[test]
    fn window_suppresses_weaker_neighbours() {
        let response = GrayFloatImage::from_fn(9, 9, |x, y| match (x, y) {
            (3, 3) => 2.0,
            (5, 3) => 1.0,
            _ => 0.0,
        });
        assert_eq!(harris(3, 10).keypoints_from_response(&response).len(), 2);
        assert_eq!(
            harris(5, 10).keypoints_from_response(&response),
            vec![KeyPoint::new(3, 3)]
        );
    }

    #[test]
    fn cap_truncates_to_strongest() {
        let response = GrayFloatImage::from_fn(20, 1, |x, _| if x % 4 == 0 { x as f32 + 1.0 } else { 0.0 });
        let keypoints = harris(3, 2).keypoints_from_response(&response);
        assert_eq!(keypoints, vec![KeyPoint::new(16, 0), KeyPoint::new(12, 0)]);
    }
}

use crate::{image::GrayFloatImage, PatchMatcher};
use cv_core::KeyPoint;
use log::*;
use ndarray::{Array2, ArrayView1, ArrayViewMut1, Zip};

impl PatchMatcher {
    /// Extract a square patch descriptor around every keypoint.
    ///
    /// Row `i` of the result holds the `window_size` x `window_size` patch
    /// centred on `keypoints[i]`, flattened top row first. Pixels outside the
    /// image are filled according to the configured border mode, so there is
    /// always exactly one descriptor per keypoint.
    ///
    /// # Arguments
    /// * `image` - The image the keypoints were detected in.
    /// * `keypoints` - The keypoints to describe.
    /// # Return value
    /// An array of shape `(keypoints.len(), window_size^2)`.
    pub fn get_descriptors(&self, image: &GrayFloatImage, keypoints: &[KeyPoint]) -> Array2<f32> {
        let window = self.params.window_size;
        let mut descriptors = Array2::zeros((keypoints.len(), window * window));
        let fill = |row: ArrayViewMut1<f32>, keypoint: &KeyPoint| {
            self.fill_patch(row, image, keypoint);
        };
        let zip = Zip::from(descriptors.rows_mut()).and(ArrayView1::<KeyPoint>::from(keypoints));
        #[cfg(not(feature = "rayon"))]
        zip.for_each(fill);
        #[cfg(feature = "rayon")]
        zip.par_for_each(fill);
        debug!(
            "Extracted {} descriptors of length {}.",
            keypoints.len(),
            window * window
        );
        descriptors
    }

    fn fill_patch(&self, mut row: ArrayViewMut1<f32>, image: &GrayFloatImage, keypoint: &KeyPoint) {
        let window = self.params.window_size;
        let half = (window / 2) as isize;
        let (cx, cy) = (keypoint.x as isize, keypoint.y as isize);
        for (i, value) in row.iter_mut().enumerate() {
            let dx = (i % window) as isize - half;
            let dy = (i / window) as isize - half;
            *value = image.sample(cx + dx, cy + dy, self.params.border);
        }
    }
}

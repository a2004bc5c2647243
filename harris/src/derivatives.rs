use crate::image::{separable_filter, BorderMode, GrayFloatImage};

/// Compute the Sobel derivative horizontally.
///
/// Positive values mean that intensity increases to the right.
///
/// # Arguments
/// * `image` - the input image.
/// * `border` - How samples outside of the image are produced.
///
/// # Return value
/// Output image derivative (an image.)
pub fn sobel_horizontal(image: &GrayFloatImage, border: BorderMode) -> GrayFloatImage {
    // similar to cv::Sobel with xorder=1, yorder=0, ksize=3
    GrayFloatImage(separable_filter(
        &image.0,
        &[-1., 0., 1.],
        &[1., 2., 1.],
        border,
    ))
}

/// Compute the Sobel derivative vertically.
///
/// Positive values mean that intensity increases downward.
pub fn sobel_vertical(image: &GrayFloatImage, border: BorderMode) -> GrayFloatImage {
    // similar to cv::Sobel with xorder=0, yorder=1, ksize=3
    GrayFloatImage(separable_filter(
        &image.0,
        &[1., 2., 1.],
        &[-1., 0., 1.],
        border,
    ))
}

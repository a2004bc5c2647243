use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Allows the retrieval of the point on the image the feature came from.
pub trait ImagePoint {
    /// Retrieves the point on the image
    fn image_point(&self) -> Point2<f64>;
}

/// An integer pixel location on an image frame.
///
/// `x` is the column and `y` is the row, both counted from the top-left
/// pixel. Detectors in this workspace only ever produce whole-pixel
/// locations, so the coordinates are unsigned integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsMut, AsRef, Deref, DerefMut, From, Into,
)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KeyPoint(pub Point2<u32>);

impl KeyPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self(Point2::new(x, y))
    }

    /// Returns the same keypoint moved by `(dx, dy)`, or `None` if it would
    /// leave the non-negative quadrant.
    pub fn offset(&self, dx: i64, dy: i64) -> Option<Self> {
        let x = u32::try_from(i64::from(self.x) + dx).ok()?;
        let y = u32::try_from(i64::from(self.y) + dy).ok()?;
        Some(Self::new(x, y))
    }
}

impl ImagePoint for KeyPoint {
    fn image_point(&self) -> Point2<f64> {
        Point2::new(f64::from(self.x), f64::from(self.y))
    }
}

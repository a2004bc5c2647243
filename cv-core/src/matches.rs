/// A correspondence between two features.
///
/// The first element refers to the first image and the second element to the
/// second image. When `P` is `usize` the pair holds indices into the two
/// keypoint sequences that were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureMatch<P>(pub P, pub P);

impl<P> From<(P, P)> for FeatureMatch<P> {
    fn from((a, b): (P, P)) -> Self {
        Self(a, b)
    }
}

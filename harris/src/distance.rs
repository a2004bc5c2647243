use crate::MatchingMethod;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Zip};

/// Fill an `(d1.nrows(), d2.nrows())` matrix with `distance(d1[i], d2[j])`.
fn pairwise<F>(d1: ArrayView2<f32>, d2: ArrayView2<f32>, distance: F) -> Array2<f32>
where
    F: Fn(usize, usize) -> f32 + Sync + Send,
{
    assert_eq!(
        d1.ncols(),
        d2.ncols(),
        "descriptors must have the same length"
    );
    let mut distances = Array2::zeros((d1.nrows(), d2.nrows()));
    let row = |i: usize, mut out: ArrayViewMut1<f32>| {
        for (j, value) in out.iter_mut().enumerate() {
            *value = distance(i, j);
        }
    };
    let zip = Zip::indexed(distances.rows_mut());
    #[cfg(not(feature = "rayon"))]
    zip.for_each(row);
    #[cfg(feature = "rayon")]
    zip.par_for_each(row);
    distances
}

/// Sum of squared differences between every pair of descriptors.
///
/// Entry `(i, j)` is `sum_k (d1[i, k] - d2[j, k])^2`.
///
/// # Panics
/// If the descriptor lengths differ.
pub fn match_ssd(d1: &Array2<f32>, d2: &Array2<f32>) -> Array2<f32> {
    pairwise(d1.view(), d2.view(), |i, j| {
        d1.row(i)
            .iter()
            .zip(d2.row(j).iter())
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum()
    })
}

/// Mean-subtracted descriptors, accumulated in `f64`.
struct Centred {
    rows: Array2<f64>,
    /// Squared norm of each centred row, `None` when the row has no variance.
    norms: Vec<Option<f64>>,
}

impl Centred {
    fn new(descriptors: ArrayView2<f32>) -> Self {
        let mut rows = descriptors.mapv(f64::from);
        let norms = rows
            .rows_mut()
            .into_iter()
            .map(|mut row| {
                let energy = row.iter().map(|v| v * v).sum::<f64>();
                let mean = row.mean().unwrap_or(0.0);
                row.mapv_inplace(|v| v - mean);
                let norm = dot(row.view(), row.view());
                // A constant row only keeps rounding noise after centring.
                (norm > f64::EPSILON * energy).then_some(norm)
            })
            .collect();
        Self { rows, norms }
    }
}

fn dot(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(a, b)| a * b).sum()
}

/// One minus the normalized cross-correlation between every pair of
/// descriptors.
///
/// The correlation is clamped to `[-1, 1]`, so distances lie in `[0, 2]`.
/// A descriptor without variance has no defined correlation and is given the
/// maximal distance `2.0` to everything, itself included.
///
/// # Panics
/// If the descriptor lengths differ.
pub fn match_ncc(d1: &Array2<f32>, d2: &Array2<f32>) -> Array2<f32> {
    let c1 = Centred::new(d1.view());
    let c2 = Centred::new(d2.view());
    pairwise(d1.view(), d2.view(), |i, j| match (c1.norms[i], c2.norms[j]) {
        (Some(n1), Some(n2)) => {
            let ncc = dot(c1.rows.row(i), c2.rows.row(j)) / (n1 * n2).sqrt();
            (1.0 - ncc.clamp(-1.0, 1.0)) as f32
        }
        _ => 2.0,
    })
}

impl MatchingMethod {
    /// Compute the `(d1.nrows(), d2.nrows())` distance matrix of this method.
    pub fn distance_matrix(self, d1: &Array2<f32>, d2: &Array2<f32>) -> Array2<f32> {
        match self {
            MatchingMethod::Ssd => match_ssd(d1, d2),
            MatchingMethod::Ncc => match_ncc(d1, d2),
        }
    }
}

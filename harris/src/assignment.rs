//! One-to-one assignment of rows to columns of a distance matrix.

use crate::{Assignment, PatchMatcher};
use cv_core::FeatureMatch;
use float_ord::FloatOrd;
use log::*;
use ndarray::{Array2, ArrayView2};

/// Minimum-cost assignment with the shortest augmenting path Hungarian
/// method, `O(n^2 m)` for `n <= m`.
///
/// Returns `min(rows, cols)` pairs `(row, col)` in no particular order.
/// Non-finite costs are treated as the largest finite `f32`.
pub fn optimal_assignment(costs: ArrayView2<f32>) -> Vec<(usize, usize)> {
    let (rows, cols) = costs.dim();
    if rows > cols {
        return optimal_assignment(costs.t())
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect();
    }
    let cost = |i: usize, j: usize| {
        let c = costs[(i, j)];
        if c.is_finite() {
            f64::from(c)
        } else {
            f64::from(f32::MAX)
        }
    };
    // Potentials and the current matching, with index 0 as a virtual column.
    let mut u = vec![0f64; rows + 1];
    let mut v = vec![0f64; cols + 1];
    let mut col_owner = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];
    for i in 1..=rows {
        col_owner[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];
        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=cols {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }
        // Flip the augmenting path.
        loop {
            let j1 = way[j0];
            col_owner[j0] = col_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }
    col_owner
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, &i)| i != 0)
        .map(|(j, &i)| (i - 1, j - 1))
        .collect()
}

/// Repeatedly take the smallest remaining entry and retire its row and
/// column. Ties go to the smaller row, then the smaller column.
///
/// Returns `min(rows, cols)` pairs `(row, col)` in the order they were taken.
pub fn greedy_assignment(costs: ArrayView2<f32>) -> Vec<(usize, usize)> {
    let (rows, cols) = costs.dim();
    let mut entries: Vec<(FloatOrd<f32>, usize, usize)> = costs
        .indexed_iter()
        .map(|((i, j), &c)| (FloatOrd(c), i, j))
        .collect();
    entries.sort_unstable();
    let mut row_used = vec![false; rows];
    let mut col_used = vec![false; cols];
    let mut pairs = Vec::with_capacity(rows.min(cols));
    for (_, i, j) in entries {
        if pairs.len() == rows.min(cols) {
            break;
        }
        if !row_used[i] && !col_used[j] {
            row_used[i] = true;
            col_used[j] = true;
            pairs.push((i, j));
        }
    }
    pairs
}

impl Assignment {
    /// Assign rows to columns of `distances`, sorted by row.
    pub fn solve(self, distances: ArrayView2<f32>) -> Vec<FeatureMatch<usize>> {
        let mut pairs = match self {
            Assignment::Optimal => optimal_assignment(distances),
            Assignment::Greedy => greedy_assignment(distances),
        };
        pairs.sort_unstable();
        pairs.into_iter().map(FeatureMatch::from).collect()
    }
}

impl PatchMatcher {
    /// Compute a one-to-one matching from a distance matrix.
    ///
    /// Exactly `min(N1, N2)` matches are returned, sorted by their first
    /// index, and no index appears twice on either side. With
    /// [`Assignment::Optimal`] the total distance is globally minimal.
    pub fn compute_matches(&self, distances: &Array2<f32>) -> Vec<FeatureMatch<usize>> {
        let matches = self.params.assignment.solve(distances.view());
        debug!(
            "Assigned {} matches from a {:?} distance matrix.",
            matches.len(),
            distances.dim()
        );
        matches
    }
}

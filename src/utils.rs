use ndarray::{s, ArrayBase, Data, Ix2, NdFloat};
use ndarray_stats::DeviationExt;
use num_traits::Signed;

/// Aggregated spread between two trajectories: the sum over all row pairs
/// (one row from `xa`, one from `xb`) of the squared Euclidean distance
/// between the two k-dimensional points.
///
/// The square root is omitted on purpose: selection only ever compares
/// aggregate spreads, and the squared variant skips rows*rows sqrt calls per
/// trajectory pair. This weighs large inter-point distances more heavily than
/// the textbook Euclidean criterion would.
pub fn trajectory_spread<F: NdFloat + Signed>(
    xa: &ArrayBase<impl Data<Elem = F>, Ix2>,
    xb: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> F {
    let na = xa.ncols();
    let nb = xb.ncols();
    if na != nb {
        panic!(
            "trajectory_spread: operands should have same nb of columns. Found {} and {}",
            na, nb
        );
    }
    let mut total = F::zero();
    for i in 0..xa.nrows() {
        for j in 0..xb.nrows() {
            let a = xa.slice(s![i, ..]);
            let b = xb.slice(s![j, ..]);
            total += F::from(a.sq_l2_dist(&b).unwrap()).unwrap();
        }
    }
    total
}

/// Lexicographic enumeration of all size-`r` combinations of `0..n`.
///
/// Yields nothing when `r > n`; yields the single empty combination when
/// `r == 0`.
pub fn combinations(n: usize, r: usize) -> Combinations {
    Combinations {
        n,
        r,
        state: (0..r).collect(),
        done: r > n,
    }
}

/// Iterator over index combinations, see [combinations]
pub struct Combinations {
    n: usize,
    r: usize,
    state: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.state.clone();
        // Advance: bump the rightmost index that still has headroom,
        // then reset everything to its right.
        let mut i = self.r;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.state[i] < self.n - self.r + i {
                self.state[i] += 1;
                for j in (i + 1)..self.r {
                    self.state[j] = self.state[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

use crate::errors::{Result, ScreeningError};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1};
use ndarray_rand::rand::{seq::SliceRandom, Rng};

/// Canonical Morris step size `p / (2 * (p - 1))` for a `p`-level grid.
pub fn step_size<F: Float>(p: usize) -> F {
    F::cast(p) / (F::cast(2.) * (F::cast(p) - F::one()))
}

/// Generates one Morris trajectory: a `(k+1, k)` matrix describing a
/// randomized stepwise path through the `p`-level discretized parameter
/// space, starting from `x0` (a length-k point on the grid).
///
/// Each pair of consecutive rows differs in exactly one column, by `delta`
/// in magnitude. Which coordinate moves at which step, and in which
/// direction, is drawn from `rng` (a random sign per coordinate plus a
/// random coordinate order); everything else is deterministic.
///
/// This is the `B* = ((2B - J)D + J)(delta/2) + J x0) P` construction of
/// Morris/Saltelli with `B` the strictly lower triangular orientation
/// matrix, `D` the random sign diagonal and `P` the random column
/// permutation, expressed row by row instead of as explicit matrix
/// products.
///
/// Fails with [ScreeningError::InvalidValue] when `p` is odd; the design
/// requires an even level count for symmetric step selection.
pub fn generate_trajectory<F: Float, R: Rng>(
    x0: &ArrayBase<impl Data<Elem = F>, Ix1>,
    p: usize,
    delta: F,
    rng: &mut R,
) -> Result<Array2<F>> {
    if p % 2 != 0 {
        return Err(ScreeningError::InvalidValue(format!(
            "number of quantization levels p must be even, got {p}"
        )));
    }
    let k = x0.len();

    let signs: Vec<F> = (0..k)
        .map(|_| {
            if rng.gen::<f64>() > 0.5 {
                F::one()
            } else {
                -F::one()
            }
        })
        .collect();
    let mut perm: Vec<usize> = (0..k).collect();
    perm.shuffle(rng);

    let half = delta / F::cast(2.);
    let mut traj = Array2::zeros((k + 1, k));
    for i in 0..=k {
        for j in 0..k {
            // Entry of 2B - J: the jth coordinate has already moved once
            // the row index exceeds j.
            let orient = if j < i { F::one() } else { -F::one() };
            traj[[i, perm[j]]] = x0[j] + half * (orient * signs[j] + F::one());
        }
    }
    Ok(traj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_step_size() {
        assert_abs_diff_eq!(step_size::<f64>(4), 2. / 3., epsilon = 1e-12);
        assert_abs_diff_eq!(step_size::<f64>(6), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_one_coordinate_per_step() {
        for seed in 0..20 {
            let mut rng = Xoshiro256Plus::seed_from_u64(seed);
            for (k, p) in [(2, 4), (4, 4), (6, 4), (7, 8)] {
                let delta = step_size::<f64>(p);
                let x0 = Array1::from_elem(k, 1. / (p - 1) as f64);
                let traj = generate_trajectory(&x0, p, delta, &mut rng).unwrap();
                assert_eq!(traj.dim(), (k + 1, k));
                for i in 1..=k {
                    let changed: Vec<usize> = (0..k)
                        .filter(|&j| traj[[i, j]] != traj[[i - 1, j]])
                        .collect();
                    assert_eq!(
                        changed.len(),
                        1,
                        "rows {} and {} of a trajectory should differ in one column",
                        i - 1,
                        i
                    );
                    let step = traj[[i, changed[0]]] - traj[[i - 1, changed[0]]];
                    assert_abs_diff_eq!(step.abs(), delta, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_each_coordinate_moves_once() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let k = 5;
        let x0 = Array1::from_elem(k, 0.);
        let traj = generate_trajectory(&x0, 4, 2. / 3., &mut rng).unwrap();
        let mut moved = vec![false; k];
        for i in 1..=k {
            for j in 0..k {
                if traj[[i, j]] != traj[[i - 1, j]] {
                    assert!(!moved[j], "coordinate {} moved twice", j);
                    moved[j] = true;
                }
            }
        }
        assert!(moved.iter().all(|&m| m));
    }

    #[test]
    fn test_odd_p_rejected() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let x0 = array![0., 0.5, 1.];
        let res = generate_trajectory(&x0, 5, 0.625, &mut rng);
        assert!(matches!(res, Err(ScreeningError::InvalidValue(_))));
    }

    #[test]
    fn test_seeded_reproducibility() {
        let x0 = array![0., 1. / 3., 2. / 3., 1.];
        let mut rng1 = Xoshiro256Plus::seed_from_u64(42);
        let mut rng2 = Xoshiro256Plus::seed_from_u64(42);
        let t1 = generate_trajectory(&x0, 4, 2. / 3., &mut rng1).unwrap();
        let t2 = generate_trajectory(&x0, 4, 2. / 3., &mut rng2).unwrap();
        assert_abs_diff_eq!(t1, t2, epsilon = 1e-15);
    }
}

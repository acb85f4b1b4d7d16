use crate::errors::{ModelResult, Result, ScreeningError};
use crate::selection::select_trajectories;
use crate::trajectory::generate_trajectory;
use linfa::Float;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix1};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::str::FromStr;

/// Trajectory sampling scheme used by [MorrisScreening]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// Plain Morris sampling: the thinned trajectory pool is used as is
    Morris,
    /// Campolongo selection: the pool is reduced to a high-spread subset
    /// of size `r` (see [select_trajectories](crate::select_trajectories))
    Campolongo,
}

impl FromStr for Sampling {
    type Err = ScreeningError;

    /// Accepts exactly `"Morris"`, or `"campolongo"` in any capitalization.
    fn from_str(s: &str) -> Result<Self> {
        if s == "Morris" {
            Ok(Sampling::Morris)
        } else if s.eq_ignore_ascii_case("campolongo") {
            Ok(Sampling::Campolongo)
        } else {
            Err(ScreeningError::InvalidValue(format!(
                "unknown sampling scheme {s:?}, expected \"Morris\" or \"Campolongo\""
            )))
        }
    }
}

/// Per-coordinate summary statistics of the elementary effects collected
/// during a screening run. All three arrays have length k and are
/// index-aligned with the model's parameter vector.
#[derive(Clone, Debug)]
pub struct ScreeningResult<F: Float> {
    /// Mean of the absolute elementary effects, the overall influence of
    /// each parameter
    pub mu_star: Array1<F>,
    /// Mean of the signed elementary effects; cancellation against
    /// `mu_star` reveals non-monotonic behavior
    pub mu: Array1<F>,
    /// Population standard deviation of the elementary effects, the
    /// interaction/nonlinearity indicator
    pub sigma: Array1<F>,
}

/// Global sensitivity screening of a black-box model with the Morris
/// elementary effects method.
///
/// Start points are drawn from the k-fold Cartesian product of a level
/// range `drange`, thinned with probability 1/2; a randomized
/// one-at-a-time trajectory is generated per retained start point until
/// `num_traj` trajectories are available (fewer when the grid runs out
/// first). The model is then evaluated along every trajectory and the
/// per-coordinate output differences are reduced to
/// [ScreeningResult] statistics.
pub struct MorrisScreening<F: Float, R: Rng + Clone> {
    /// Number of model parameters
    k: usize,
    /// Number of quantization levels per parameter, must be even
    p: usize,
    /// Elementary step size, typically [step_size](crate::step_size)`(p)`
    delta: F,
    /// Candidate per-coordinate start values spanning the grid
    drange: Array1<F>,
    /// Upper bound on the number of generated trajectories
    num_traj: usize,
    sampling: Sampling,
    /// Campolongo subset size, required nonzero under [Sampling::Campolongo]
    subset_size: usize,
    /// Random generator used for reproducibility
    rng: R,
}

/// Screening with default random generator
impl<F: Float> MorrisScreening<F, Xoshiro256Plus> {
    /// Constructor of a k-parameter screening on the grid spanned by `drange`,
    /// with `p` quantization levels and elementary step `delta`.
    ///
    /// ```
    /// use morris_screening::MorrisScreening;
    /// use ndarray::array;
    ///
    /// let screening = MorrisScreening::new(6, 4, 2. / 3., &array![0., 1. / 3., 2. / 3., 1.]);
    /// ```
    pub fn new(k: usize, p: usize, delta: F, drange: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Self {
        Self::new_with_rng(k, p, delta, drange, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> MorrisScreening<F, R> {
    /// Constructor with given screening space and random generator for
    /// reproducibility; see [MorrisScreening::new].
    pub fn new_with_rng(
        k: usize,
        p: usize,
        delta: F,
        drange: &ArrayBase<impl Data<Elem = F>, Ix1>,
        rng: R,
    ) -> Self {
        MorrisScreening {
            k,
            p,
            delta,
            drange: drange.to_owned(),
            num_traj: 10,
            sampling: Sampling::Morris,
            subset_size: 0,
            rng,
        }
    }

    /// Sets the targeted number of trajectories (an upper bound, see [MorrisScreening])
    pub fn num_trajectories(mut self, num_traj: usize) -> Self {
        self.num_traj = num_traj;
        self
    }

    /// Sets the trajectory sampling scheme
    pub fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets the Campolongo subset size `r`; ignored under plain Morris sampling
    pub fn subset_size(mut self, r: usize) -> Self {
        self.subset_size = r;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> MorrisScreening<F, R2> {
        MorrisScreening {
            k: self.k,
            p: self.p,
            delta: self.delta,
            drange: self.drange,
            num_traj: self.num_traj,
            sampling: self.sampling,
            subset_size: self.subset_size,
            rng,
        }
    }

    /// Runs the screening: samples trajectories, evaluates `func` along each
    /// of them and reduces the collected elementary effects.
    ///
    /// `func` is treated as an opaque, potentially expensive, pure function
    /// of a length-k parameter vector; its failures abort the run and are
    /// propagated verbatim as [ScreeningError::ModelFailure]. No partial
    /// statistics are ever returned.
    pub fn run<M>(&self, func: M) -> Result<ScreeningResult<F>>
    where
        M: Fn(&ArrayView1<F>) -> ModelResult<F>,
    {
        self.validate()?;
        let mut rng = self.rng.clone();

        let pool = self.sample_trajectories(&mut rng)?;
        info!(
            "Generated {} trajectories over a {}^{} start-point grid",
            pool.len(),
            self.drange.len(),
            self.k
        );
        let pool = match self.sampling {
            Sampling::Morris => pool,
            Sampling::Campolongo => {
                let kept = select_trajectories(&pool, self.subset_size)?;
                info!(
                    "Campolongo selection kept {} of {} trajectories",
                    kept.len(),
                    pool.len()
                );
                kept
            }
        };
        self.elementary_effects(&pool, func)
    }

    /// All parameter validation happens here, before any trajectory or model
    /// work is started.
    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(ScreeningError::InvalidValue(
                "number of parameters k must be nonzero".to_string(),
            ));
        }
        if self.p % 2 != 0 {
            return Err(ScreeningError::InvalidValue(format!(
                "number of quantization levels p must be even, got {}",
                self.p
            )));
        }
        if self.drange.is_empty() {
            return Err(ScreeningError::InvalidValue(
                "drange must hold at least one start level".to_string(),
            ));
        }
        if self.sampling == Sampling::Campolongo && self.subset_size == 0 {
            return Err(ScreeningError::InvalidValue(
                "Campolongo sampling requires a nonzero subset size r".to_string(),
            ));
        }
        Ok(())
    }

    /// Walks the k-fold Cartesian product of `drange` in lexicographic order,
    /// keeps each candidate start point with probability 1/2 and generates a
    /// trajectory per kept candidate, stopping at `num_traj` trajectories or
    /// grid exhaustion.
    ///
    /// The thinning filter decorrelates the retained start points from the
    /// grid ordering; together with the early exit it makes `num_traj` an
    /// upper bound rather than an exact count.
    fn sample_trajectories(&self, rng: &mut R) -> Result<Vec<Array2<F>>> {
        let nlevels = self.drange.len();
        let mut levels = vec![0usize; self.k];
        let mut pool = Vec::with_capacity(self.num_traj);
        'grid: loop {
            if rng.gen::<f64>() > 0.5 {
                let x0 = Array1::from_shape_fn(self.k, |j| self.drange[levels[j]]);
                pool.push(generate_trajectory(&x0, self.p, self.delta, rng)?);
                if pool.len() >= self.num_traj {
                    break 'grid;
                }
            }
            // Advance the mixed-radix counter over the start-point grid,
            // rightmost coordinate fastest.
            let mut pos = self.k;
            loop {
                if pos == 0 {
                    break 'grid;
                }
                pos -= 1;
                levels[pos] += 1;
                if levels[pos] < nlevels {
                    break;
                }
                levels[pos] = 0;
            }
        }
        Ok(pool)
    }

    /// Evaluates `func` along every trajectory, attributes each output
    /// difference to the single coordinate perturbed at that step and
    /// reduces the per-coordinate effect sets to their summary moments.
    fn elementary_effects<M>(&self, pool: &[Array2<F>], func: M) -> Result<ScreeningResult<F>>
    where
        M: Fn(&ArrayView1<F>) -> ModelResult<F>,
    {
        let mut effects: Vec<Vec<F>> = vec![Vec::new(); self.k];
        for traj in pool {
            let mut previous = func(&traj.row(0)).map_err(ScreeningError::ModelFailure)?;
            for step in 1..traj.nrows() {
                let row = traj.row(step);
                let output = func(&row).map_err(ScreeningError::ModelFailure)?;
                let moved = row
                    .iter()
                    .zip(traj.row(step - 1).iter())
                    .position(|(a, b)| a != b)
                    .ok_or_else(|| {
                        ScreeningError::InvalidValue(format!(
                            "trajectory rows {} and {} are identical",
                            step - 1,
                            step
                        ))
                    })?;
                effects[moved].push(output - previous);
                previous = output;
            }
        }
        debug!(
            "Collected {} elementary effects over {} trajectories",
            effects.iter().map(Vec::len).sum::<usize>(),
            pool.len()
        );

        let mut mu_star = Array1::zeros(self.k);
        let mut mu = Array1::zeros(self.k);
        let mut sigma = Array1::zeros(self.k);
        for (coord, set) in effects.iter().enumerate() {
            if set.is_empty() {
                return Err(ScreeningError::EmptyEffects(coord));
            }
            let count = F::cast(set.len());
            let mean = set.iter().fold(F::zero(), |acc, &e| acc + e) / count;
            let mean_abs = set.iter().fold(F::zero(), |acc, &e| acc + e.abs()) / count;
            let variance = set
                .iter()
                .fold(F::zero(), |acc, &e| acc + (e - mean) * (e - mean))
                / count;
            mu_star[coord] = mean_abs;
            mu[coord] = mean;
            sigma[coord] = variance.sqrt();
        }
        Ok(ScreeningResult { mu_star, mu, sigma })
    }
}

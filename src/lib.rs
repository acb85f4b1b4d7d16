/*!
This library implements global sensitivity screening of a black-box numeric
model with the [Morris method](https://en.wikipedia.org/wiki/Morris_method)
of elementary effects, optionally refined by Campolongo's trajectory
selection heuristic.

The model is screened by walking randomized one-at-a-time trajectories
through a discretized parameter space: each trajectory perturbs one
coordinate per step, and the resulting model output differences (the
elementary effects) are reduced per coordinate into three index-aligned
statistics: `mu_star` (mean absolute effect, overall influence), `mu`
(mean signed effect) and `sigma` (standard deviation, an interaction and
nonlinearity indicator).

Example:
```
use morris_screening::{step_size, MorrisScreening};
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Screen a 6-parameter model on a 4-level grid.
let delta = step_size::<f64>(4);
let result = MorrisScreening::new(6, 4, delta, &array![0., 1. / 3., 2. / 3., 1.])
    .num_trajectories(10)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .run(|x| Ok(x.sum()))
    .expect("screening succeeded");
// Every parameter of a plain sum is equally influential.
println!("mu_star = {}", result.mu_star);
```

This library contains the three building blocks of the method:
* [trajectory generation](crate::generate_trajectory),
* [Campolongo trajectory selection](crate::select_trajectories),
* the [screening driver](crate::MorrisScreening) tying them together.

Argument plumbing beyond the parameter vector (the `*args` of the usual
formulation) is a closure capture concern; memoization of expensive models
is the caller's affair as well.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod errors;
mod screening;
mod selection;
mod trajectory;
mod utils;

pub use errors::*;
pub use screening::*;
pub use selection::*;
pub use trajectory::*;
pub use utils::*;

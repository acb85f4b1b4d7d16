use crate::errors::{Result, ScreeningError};
use crate::utils::{combinations, trajectory_spread};
use linfa::Float;
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Number of contiguous batches used by the coarse phase of the search.
const NUM_BATCHES: usize = 8;

/// Selects, out of `pool`, a high-spread subset of roughly `r` trajectories
/// following Campolongo's criterion, and returns the selected pool indices in
/// increasing order.
///
/// The spread of a candidate subset is the sum, over all trajectory pairs in
/// the subset, of the cached pairwise score computed by
/// [trajectory_spread](crate::trajectory_spread) (squared Euclidean
/// distances, no square root). An exhaustive search over all size-`r`
/// subsets is intractable for realistic pools, so the search runs in two
/// phases:
///
/// 1. pool indices are split into up to 8 contiguous batches and
///    the best size-`r` combination of each batch is retained;
/// 2. the batch winners' indices form a reduced candidate set over which all
///    size-`r` combinations are enumerated again, keeping every combination
///    that improves on the running maximum of this pass.
///
/// The union of the member indices of the `r + 1` best retained combinations
/// is returned, so the result may hold slightly more than `r` indices.
///
/// Fails with [ScreeningError::InvalidValue] when `r == 0` or `r` is not
/// smaller than the pool size, before any distance work is done.
pub fn select_indices<F: Float>(pool: &[Array2<F>], r: usize) -> Result<Vec<usize>> {
    let n = pool.len();
    if r == 0 {
        return Err(ScreeningError::InvalidValue(
            "subset size r must be nonzero".to_string(),
        ));
    }
    if r >= n {
        return Err(ScreeningError::InvalidValue(format!(
            "subset size r={} should be smaller than the pool size {}",
            r, n
        )));
    }

    let spread = pairwise_spread_matrix(pool);

    // Coarse phase: best combination within each contiguous batch.
    // Batches are at least r wide; a pool too small for 8 of them just
    // gets fewer, larger batches.
    let width = usize::max(n.div_ceil(NUM_BATCHES), r);
    let mut batches: Vec<Vec<usize>> = (0..n)
        .collect::<Vec<usize>>()
        .chunks(width)
        .map(|c| c.to_vec())
        .collect();
    if batches.len() > 1 && batches.last().map_or(false, |b| b.len() < r) {
        let tail = batches.pop().unwrap();
        batches.last_mut().unwrap().extend(tail);
    }

    let mut candidates: BTreeSet<usize> = BTreeSet::new();
    for batch in &batches {
        let mut best: Option<(F, Vec<usize>)> = None;
        for combo in combinations(batch.len(), r) {
            let ids: Vec<usize> = combo.iter().map(|&i| batch[i]).collect();
            let score = subset_spread(&spread, &ids);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, ids));
            }
        }
        if let Some((score, ids)) = best {
            debug!("Batch winner {ids:?} with spread {score}");
            candidates.extend(ids);
        }
    }

    // Refinement phase: running-max acceptance sweep over the reduced
    // candidate set. Every combination improving on the best seen so far
    // during this pass is kept, so the retained list ends up sorted by
    // score.
    let candidates: Vec<usize> = candidates.into_iter().collect();
    let mut retained: Vec<(F, Vec<usize>)> = Vec::new();
    let mut best_spread = F::neg_infinity();
    for combo in combinations(candidates.len(), r) {
        let ids: Vec<usize> = combo.iter().map(|&i| candidates[i]).collect();
        let score = subset_spread(&spread, &ids);
        if score > best_spread {
            best_spread = score;
            retained.push((score, ids));
        }
    }
    retained.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let top = retained.len().saturating_sub(r + 1);
    let mut selected: BTreeSet<usize> = BTreeSet::new();
    for (_, ids) in &retained[top..] {
        selected.extend(ids.iter().copied());
    }
    debug!(
        "Kept {} trajectories out of {} with subset spread {best_spread}",
        selected.len(),
        n
    );
    Ok(selected.into_iter().collect())
}

/// Same as [select_indices] but materializes the selected trajectories.
pub fn select_trajectories<F: Float>(pool: &[Array2<F>], r: usize) -> Result<Vec<Array2<F>>> {
    let indices = select_indices(pool, r)?;
    Ok(indices.iter().map(|&i| pool[i].to_owned()).collect())
}

/// Cached pairwise spread scores for the whole pool, as a symmetric
/// (n, n) matrix with a zero diagonal. This is the dominant cost of the
/// selection, O(n^2 k^2), and each pair is independent, hence the rayon
/// parallelization over the strict upper triangle.
fn pairwise_spread_matrix<F: Float>(pool: &[Array2<F>]) -> Array2<F> {
    let n = pool.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|m| ((m + 1)..n).map(move |l| (m, l)))
        .collect();
    let scores: Vec<F> = pairs
        .par_iter()
        .map(|&(m, l)| trajectory_spread(&pool[m], &pool[l]))
        .collect();
    let mut mat = Array2::zeros((n, n));
    for (&(m, l), &score) in pairs.iter().zip(scores.iter()) {
        mat[[m, l]] = score;
        mat[[l, m]] = score;
    }
    mat
}

/// Total cached spread over all 2-subsets of `ids`.
fn subset_spread<F: Float>(spread: &Array2<F>, ids: &[usize]) -> F {
    let mut total = F::zero();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            total += spread[[ids[i], ids[j]]];
        }
    }
    total
}

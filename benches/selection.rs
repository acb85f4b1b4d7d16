use criterion::{black_box, criterion_group, criterion_main, Criterion};
use env_logger::{Builder, Env};
use morris_screening::{generate_trajectory, select_trajectories, step_size};
use ndarray::{Array1, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

fn trajectory_pool(n: usize, k: usize) -> Vec<Array2<f64>> {
    let p = 4;
    let delta = step_size::<f64>(p);
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let x0 =
                Array1::from_shape_fn(k, |_| rng.gen_range(0..p / 2) as f64 / (p - 1) as f64);
            generate_trajectory(&x0, p, delta, &mut rng).unwrap()
        })
        .collect()
}

fn criterion_selection(c: &mut Criterion) {
    let dims = [4, 8];
    let sizes = [16, 32];

    let mut group = c.benchmark_group("selection");
    group.sample_size(10);
    let env = Env::default().default_filter_or("error");
    Builder::from_env(env).try_init().ok();
    for dim in dims {
        for size in sizes {
            group.bench_function(format!("campolongo-{dim}-dim-{size}-pool"), |b| {
                let pool = trajectory_pool(size, dim);
                b.iter(|| black_box(select_trajectories(&pool, 4).unwrap()));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_selection);
criterion_main!(benches);

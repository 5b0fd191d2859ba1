use bbfmm::direct::evaluate_all;
use bbfmm::expansions::BlackBoxExpansions;
use bbfmm::kernels::InverseMultiquadric;
use bbfmm::{Fmm, FmmOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn random_points(npoints: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..npoints).map(|_| [rng.gen(), rng.gen()]).collect()
}

pub fn fmm_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    group.sample_size(10);

    let kernel = InverseMultiquadric::new(0.01);
    for npoints in [2000, 8000] {
        let points = random_points(npoints);
        let charges = vec![1.0; npoints];

        let mut options = FmmOptions::default();
        options.set_n_crit(32);
        let fmm = Fmm::new(
            BlackBoxExpansions::<2, 5, _>::new(kernel),
            &points,
            &points,
            options,
        )
        .unwrap();

        group.bench_function(format!("FMM with {npoints} points"), |b| {
            b.iter(|| black_box(fmm.evaluate(&charges).unwrap()))
        });
        group.bench_function(format!("Direct evaluation with {npoints} points"), |b| {
            b.iter(|| black_box(evaluate_all(&kernel, &points, &points, &charges, true).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, fmm_benchmark);
criterion_main!(benches);

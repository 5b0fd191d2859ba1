use approx::assert_relative_eq;
use bbfmm::chebyshev::ChebyshevRn;
use bbfmm::direct::evaluate_all;
use bbfmm::expansions::BlackBoxExpansions;
use bbfmm::geometry::{Bbox, LatticeIterator};
use bbfmm::kernels::{Gaussian, InverseMultiquadric};
use bbfmm::traits::Expansions;
use bbfmm::{Fmm, FmmOptions};
use itertools::Itertools;
use paste::paste;
use rand::prelude::*;

fn random_points<const D: usize>(npoints: usize, seed: u64) -> Vec<[f64; D]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..npoints)
        .map(|_| std::array::from_fn(|_| rng.gen()))
        .collect()
}

fn random_charges(npoints: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..npoints).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn relative_error(approximation: &[f64], exact: &[f64]) -> f64 {
    let diff: f64 = approximation
        .iter()
        .zip(exact)
        .map(|(a, e)| (a - e).powi(2))
        .sum();
    let norm: f64 = exact.iter().map(|e| e.powi(2)).sum();
    (diff / norm).sqrt()
}

#[test]
fn test_particle_at_node() {
    const N: usize = 4;
    let expansions = BlackBoxExpansions::<2, N, _>::new(Gaussian::new(1.0));
    let bbox = Bbox::unit();
    let position = ChebyshevRn::<2, N>::node_position(&[1, 1], &bbox);

    let mut expansion = vec![0.0; expansions.ncoeffs()];
    expansions.p2m(&mut expansion, &bbox, &position, 1.0);

    for index in LatticeIterator::<2>::new(N) {
        let node = ChebyshevRn::<2, N>::node_position(&index, &bbox);
        let expected = if index == [1, 1] { 1.0 } else { 0.0 };
        assert_relative_eq!(
            expansions.l2p(&node, &bbox, &expansion),
            expected,
            epsilon = 1e-12
        );
    }
}

macro_rules! test_sampled_polynomial {
    ($($dim:literal),+) => {
        $(
            paste! {
                #[test]
                fn [<test_sampled_polynomial_ $dim d>]() {
                    const N: usize = 4;
                    let expansions = BlackBoxExpansions::<$dim, N, _>::new(Gaussian::new(1.0));
                    let bbox = Bbox::new([-0.5; $dim], [2.0; $dim]);
                    // Degree N - 1 in every dimension
                    let f = |x: &[f64; $dim]| {
                        x.iter()
                            .enumerate()
                            .map(|(d, xi)| 1.0 + xi.powi(3) - (d as f64) * xi)
                            .product::<f64>()
                    };

                    let nodes = expansions.node_positions(&bbox);
                    let mut expansion = vec![0.0; expansions.ncoeffs()];
                    for node in &nodes {
                        expansions.p2m(&mut expansion, &bbox, node, f(node));
                    }
                    for node in &nodes {
                        assert_relative_eq!(
                            expansions.l2p(node, &bbox, &expansion),
                            f(node),
                            epsilon = 1e-10
                        );
                    }
                    let point = [0.3; $dim];
                    assert_relative_eq!(
                        expansions.l2p(&point, &bbox, &expansion),
                        f(&point),
                        epsilon = 1e-10
                    );
                }
            }
        )*
    };
}

test_sampled_polynomial!(1, 2, 3);

#[test]
fn test_error_decreases_with_order() {
    let points = random_points::<2>(1000, 0);
    let charges = random_charges(1000, 1);
    let kernel = InverseMultiquadric::new(0.1);
    let exact = evaluate_all(&kernel, &points, &points, &charges, true).unwrap();

    let mut options = FmmOptions::default();
    options.set_n_crit(16);

    let errors = [
        relative_error(
            &Fmm::new(
                BlackBoxExpansions::<2, 3, _>::new(kernel),
                &points,
                &points,
                options.clone(),
            )
            .unwrap()
            .evaluate(&charges)
            .unwrap(),
            &exact,
        ),
        relative_error(
            &Fmm::new(
                BlackBoxExpansions::<2, 5, _>::new(kernel),
                &points,
                &points,
                options.clone(),
            )
            .unwrap()
            .evaluate(&charges)
            .unwrap(),
            &exact,
        ),
        relative_error(
            &Fmm::new(
                BlackBoxExpansions::<2, 7, _>::new(kernel),
                &points,
                &points,
                options,
            )
            .unwrap()
            .evaluate(&charges)
            .unwrap(),
            &exact,
        ),
    ];

    assert!(errors[0] > errors[1]);
    assert!(errors[1] > errors[2]);
    assert!(errors[2] < 1e-3);
}

#[test]
fn test_clustered_sources_and_separate_targets() {
    // Two clusters leave most boxes of the source tree empty
    let mut sources = random_points::<3>(300, 2)
        .into_iter()
        .map(|p| p.map(|x| 0.1 * x))
        .collect_vec();
    sources.extend(
        random_points::<3>(300, 3)
            .into_iter()
            .map(|p| p.map(|x| 0.9 + 0.1 * x)),
    );
    let targets = random_points::<3>(400, 4);
    let charges = random_charges(600, 5);
    let kernel = InverseMultiquadric::new(0.2);

    let fmm = Fmm::new(
        BlackBoxExpansions::<3, 5, _>::new(kernel),
        &sources,
        &targets,
        FmmOptions::default(),
    )
    .unwrap();
    assert!(fmm.interaction_lists().nfar() > 0);

    let potentials = fmm.evaluate(&charges).unwrap();
    assert_eq!(potentials.len(), 400);
    let exact = evaluate_all(&kernel, &targets, &sources, &charges, true).unwrap();
    assert!(relative_error(&potentials, &exact) < 1e-2);
}

#[test]
fn test_no_sources_or_targets() {
    let points = random_points::<2>(50, 6);
    let expansions = BlackBoxExpansions::<2, 3, _>::new(Gaussian::new(1.0));

    let fmm = Fmm::new(expansions.clone(), &[], &points, FmmOptions::default()).unwrap();
    let potentials = fmm.evaluate(&[]).unwrap();
    assert_eq!(potentials, vec![0.0; 50]);

    let fmm = Fmm::new(expansions, &points, &[], FmmOptions::default()).unwrap();
    assert!(fmm.evaluate(&[1.0; 50]).unwrap().is_empty());
}

//! Fast multipole method driver.
//!
//! Sources and targets are each sorted into a [BoxTree]. A dual tree walk splits every
//! interaction into far field box pairs, which are handled by the expansion operators, and
//! near field leaf pairs, which are summed directly. Evaluation then runs the five phases
//! P2M, M2M, M2L, L2L and L2P in order, with every box written by a single task inside a phase.
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::admissibility::ThetaCondition;
use crate::direct::evaluate_direct;
use crate::traits::Expansions;
use crate::tree::{BoxTree, TreeNode};
use crate::types::{Error, Result};

/// Options for an [Fmm].
#[derive(Debug, Clone)]
pub struct FmmOptions {
    /// Maximum number of points in a leaf box
    n_crit: usize,
    /// Maximum depth of the trees
    max_level: usize,
    /// Run the phases on the global rayon thread pool
    multithreaded: bool,
}

impl Default for FmmOptions {
    fn default() -> Self {
        Self {
            n_crit: 10,
            max_level: 12,
            multithreaded: true,
        }
    }
}

impl FmmOptions {
    /// Maximum number of points in a leaf box.
    pub fn n_crit(&self) -> usize {
        self.n_crit
    }

    /// Set the maximum number of points in a leaf box.
    pub fn set_n_crit(&mut self, n_crit: usize) {
        self.n_crit = n_crit;
    }

    /// Maximum depth of the trees.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Set the maximum depth of the trees.
    pub fn set_max_level(&mut self, max_level: usize) {
        self.max_level = max_level;
    }

    /// Whether evaluation is parallel.
    pub fn multithreaded(&self) -> bool {
        self.multithreaded
    }

    /// Enable or disable parallel evaluation.
    pub fn set_multithreaded(&mut self, multithreaded: bool) {
        self.multithreaded = multithreaded;
    }
}

/// Far and near field interactions of every target box.
#[derive(Debug, Clone)]
pub struct InteractionLists {
    far: Vec<Vec<usize>>,
    near: Vec<Vec<usize>>,
}

impl InteractionLists {
    /// Walk both trees from the roots down.
    ///
    /// Each target box inherits the source boxes its parent could not resolve. A source box
    /// that is admissible from the target's point of view goes to the far field. Otherwise a
    /// target leaf opens the source box until it reaches source leaves, which go to the near
    /// field, and a target that is not a leaf defers the source box to its children.
    pub fn new<const D: usize>(targets: &BoxTree<D>, sources: &BoxTree<D>) -> Self {
        let nboxes = targets.nodes().len();
        let mut far = vec![Vec::new(); nboxes];
        let mut near = vec![Vec::new(); nboxes];
        let mut deferred: Vec<Vec<usize>> = vec![Vec::new(); nboxes];

        for level in 0..targets.depth() {
            let range = targets.level(level);
            let lists = range
                .clone()
                .into_par_iter()
                .map(|t| {
                    let node = targets.node(t);
                    let candidates = match node.parent {
                        None => vec![0],
                        Some(parent) => deferred[parent]
                            .iter()
                            .flat_map(|&s| match &sources.node(s).children {
                                Some(children) => children.clone().collect_vec(),
                                None => vec![s],
                            })
                            .collect_vec(),
                    };
                    Self::classify(node, sources, candidates)
                })
                .collect::<Vec<_>>();
            for (t, (f, n, d)) in range.zip(lists) {
                far[t] = f;
                near[t] = n;
                deferred[t] = d;
            }
        }

        Self { far, near }
    }

    /// Split candidate source boxes into far field, near field and deferred boxes.
    fn classify<const D: usize>(
        target: &TreeNode<D>,
        sources: &BoxTree<D>,
        candidates: Vec<usize>,
    ) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        let mut far = Vec::new();
        let mut near = Vec::new();
        let mut deferred = Vec::new();
        if target.npoints() == 0 {
            return (far, near, deferred);
        }

        let theta = ThetaCondition::from_bbox(&target.bbox);
        let mut stack = candidates;
        while let Some(s) = stack.pop() {
            let source = sources.node(s);
            if source.npoints() == 0 {
                continue;
            }
            if theta.check_bbox(&source.bbox) {
                far.push(s);
            } else if !target.is_leaf() {
                deferred.push(s);
            } else if let Some(children) = &source.children {
                stack.extend(children.clone());
            } else {
                near.push(s);
            }
        }
        (far, near, deferred)
    }

    /// Source boxes whose multipole expansions are translated into the local expansion of a
    /// target box.
    pub fn far_field(&self, target: usize) -> &[usize] {
        &self.far[target]
    }

    /// Source leaves summed directly at the points of a target leaf.
    pub fn near_field(&self, target: usize) -> &[usize] {
        &self.near[target]
    }

    /// Total number of far field box pairs.
    pub fn nfar(&self) -> usize {
        self.far.iter().map(Vec::len).sum()
    }

    /// Total number of near field box pairs.
    pub fn nnear(&self) -> usize {
        self.near.iter().map(Vec::len).sum()
    }
}

/// A fast multipole evaluator for fixed source and target points.
pub struct Fmm<const D: usize, E: Expansions<D>> {
    expansions: E,
    sources: BoxTree<D>,
    targets: BoxTree<D>,
    lists: InteractionLists,
    options: FmmOptions,
    pool: Option<ThreadPool>,
}

fn install<R: Send>(pool: Option<&ThreadPool>, op: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

impl<const D: usize, E: Expansions<D>> Fmm<D, E> {
    /// Build the trees and interaction lists.
    pub fn new(
        expansions: E,
        sources: &[[f64; D]],
        targets: &[[f64; D]],
        options: FmmOptions,
    ) -> Result<Self> {
        let pool = if options.multithreaded {
            None
        } else {
            Some(ThreadPoolBuilder::new().num_threads(1).build()?)
        };

        let (sources, targets, lists) = install(pool.as_ref(), || {
            let sources = BoxTree::new(sources, options.n_crit, options.max_level);
            let targets = BoxTree::new(targets, options.n_crit, options.max_level);
            let lists = InteractionLists::new(&targets, &sources);
            (sources, targets, lists)
        });
        info!(
            "Created interaction lists with {} far field and {} near field pairs",
            lists.nfar(),
            lists.nnear()
        );

        Ok(Self {
            expansions,
            sources,
            targets,
            lists,
            options,
            pool,
        })
    }

    /// The expansions used for the far field.
    pub fn expansions(&self) -> &E {
        &self.expansions
    }

    /// Tree over the source points.
    pub fn sources(&self) -> &BoxTree<D> {
        &self.sources
    }

    /// Tree over the target points.
    pub fn targets(&self) -> &BoxTree<D> {
        &self.targets
    }

    /// The interaction lists.
    pub fn interaction_lists(&self) -> &InteractionLists {
        &self.lists
    }

    /// The options.
    pub fn options(&self) -> &FmmOptions {
        &self.options
    }

    /// Approximate `Σ_j K(s_j - t_i, t_i, s_j) q_j` at every target `t_i`.
    ///
    /// `charges` are given in the order of the source points passed to [Fmm::new], and the
    /// potentials are returned in the order of the target points.
    pub fn evaluate(&self, charges: &[f64]) -> Result<Vec<f64>> {
        if charges.len() != self.sources.npoints() {
            return Err(Error::ChargeCount {
                expected: self.sources.npoints(),
                found: charges.len(),
            });
        }
        Ok(install(self.pool.as_ref(), || self.run(charges)))
    }

    fn run(&self, charges: &[f64]) -> Vec<f64> {
        let charges = self
            .sources
            .indices()
            .iter()
            .map(|&j| charges[j])
            .collect_vec();

        let multipoles = self.upward_pass(&charges);
        let locals = self.downward_pass(&multipoles);
        let sorted = self.evaluate_leaves(&charges, &locals);

        let mut potentials = vec![0.0; sorted.len()];
        for (&j, value) in self.targets.indices().iter().zip(sorted) {
            potentials[j] = value;
        }
        potentials
    }

    /// P2M at the source leaves followed by M2M up to the root.
    fn upward_pass(&self, charges: &[f64]) -> Vec<f64> {
        let nc = self.expansions.ncoeffs();
        let tree = &self.sources;
        let mut multipoles = vec![0.0; tree.nodes().len() * nc];

        debug!("P2M");
        multipoles
            .par_chunks_exact_mut(nc)
            .zip(tree.nodes().par_iter())
            .filter(|(_, node)| node.is_leaf())
            .for_each(|(multipole, node)| {
                for k in node.points.clone() {
                    self.expansions
                        .p2m(multipole, &node.bbox, &tree.points()[k], charges[k]);
                }
            });

        debug!("M2M");
        for level in (0..tree.depth() - 1).rev() {
            let range = tree.level(level);
            let (parents, children) = multipoles.split_at_mut(range.end * nc);
            let children = &*children;
            let offset = range.end;
            parents[range.start * nc..]
                .par_chunks_exact_mut(nc)
                .zip(tree.nodes()[range].par_iter())
                .for_each(|(multipole, node)| {
                    let Some(child_range) = &node.children else {
                        return;
                    };
                    for child in child_range.clone() {
                        let child_node = tree.node(child);
                        if child_node.npoints() == 0 {
                            continue;
                        }
                        let start = (child - offset) * nc;
                        self.expansions.m2m(
                            multipole,
                            &node.bbox,
                            &child_node.bbox,
                            &children[start..start + nc],
                        );
                    }
                });
        }
        multipoles
    }

    /// M2L into every target box followed by L2L down to the leaves.
    fn downward_pass(&self, multipoles: &[f64]) -> Vec<f64> {
        let nc = self.expansions.ncoeffs();
        let tree = &self.targets;
        let mut locals = vec![0.0; tree.nodes().len() * nc];

        debug!("M2L");
        locals
            .par_chunks_exact_mut(nc)
            .enumerate()
            .for_each(|(t, local)| {
                let target = tree.node(t);
                for &s in self.lists.far_field(t) {
                    self.expansions.m2l(
                        local,
                        &target.bbox,
                        &self.sources.node(s).bbox,
                        &multipoles[s * nc..(s + 1) * nc],
                    );
                }
            });

        debug!("L2L");
        for level in 1..tree.depth() {
            let range = tree.level(level);
            let nlevel = range.len();
            let (parents, children) = locals.split_at_mut(range.start * nc);
            let parents = &*parents;
            children[..nlevel * nc]
                .par_chunks_exact_mut(nc)
                .zip(tree.nodes()[range].par_iter())
                .for_each(|(local, node)| {
                    if let Some(p) = node.parent {
                        self.expansions.l2l(
                            local,
                            &node.bbox,
                            &tree.node(p).bbox,
                            &parents[p * nc..(p + 1) * nc],
                        );
                    }
                });
        }
        locals
    }

    /// L2P and the direct near field at the target leaves, in tree order.
    fn evaluate_leaves(&self, charges: &[f64], locals: &[f64]) -> Vec<f64> {
        let nc = self.expansions.ncoeffs();
        let kernel = self.expansions.kernel();
        let sources = &self.sources;
        let targets = &self.targets;

        debug!("L2P and P2P");
        let leaf_values = targets
            .leaves()
            .par_iter()
            .map(|&t| {
                let node = targets.node(t);
                let local = &locals[t * nc..(t + 1) * nc];
                let values = targets
                    .node_points(t)
                    .iter()
                    .map(|point| {
                        let near: f64 = self
                            .lists
                            .near_field(t)
                            .iter()
                            .map(|&s| {
                                let range = sources.node(s).points.clone();
                                evaluate_direct(
                                    kernel,
                                    point,
                                    &sources.points()[range.clone()],
                                    &charges[range],
                                )
                            })
                            .sum();
                        self.expansions.l2p(point, &node.bbox, local) + near
                    })
                    .collect_vec();
                (node.points.start, values)
            })
            .collect::<Vec<_>>();

        let mut potentials = vec![0.0; targets.npoints()];
        for (start, values) in leaf_values {
            potentials[start..start + values.len()].copy_from_slice(&values);
        }
        potentials
    }
}

//! Adaptive 2^D-trees for the fast multipole method.
//!
//! Boxes are stored breadth first so that the boxes of every level are contiguous. Points are
//! permuted so that every box owns a contiguous range of the sorted points.
use std::ops::Range;

use itertools::Itertools;
use log::info;

use crate::geometry::Bbox;

/// A box in a [BoxTree].
#[derive(Debug, Clone)]
pub struct TreeNode<const D: usize> {
    /// The region covered by the box.
    pub bbox: Bbox<D>,
    /// Depth of the box, the root has level 0.
    pub level: usize,
    /// Index of the parent box.
    pub parent: Option<usize>,
    /// Indices of the 2^D children, if the box was split.
    pub children: Option<Range<usize>>,
    /// Range of the box's points in the sorted point array.
    pub points: Range<usize>,
}

impl<const D: usize> TreeNode<D> {
    /// Return true if the box has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of points in the box.
    pub fn npoints(&self) -> usize {
        self.points.len()
    }
}

/// An adaptive tree over a point set.
#[derive(Debug, Clone)]
pub struct BoxTree<const D: usize> {
    nodes: Vec<TreeNode<D>>,
    levels: Vec<Range<usize>>,
    leaves: Vec<usize>,
    points: Vec<[f64; D]>,
    indices: Vec<usize>,
}

impl<const D: usize> BoxTree<D> {
    /// Build a tree, splitting every box that holds more than `n_crit` points until
    /// `max_level` is reached.
    pub fn new(points: &[[f64; D]], n_crit: usize, max_level: usize) -> Self {
        let nchildren = 1 << D;
        let mut indices = (0..points.len()).collect_vec();
        let mut nodes = vec![TreeNode {
            bbox: Bbox::from_points(points),
            level: 0,
            parent: None,
            children: None,
            points: 0..points.len(),
        }];
        let mut levels = vec![0..1];

        for level in 0..max_level {
            let next_start = nodes.len();
            for i in levels[level].clone() {
                if nodes[i].npoints() <= n_crit {
                    continue;
                }
                let bbox = nodes[i].bbox;
                let range = nodes[i].points.clone();

                // Group the points of this box by child
                let slice = &mut indices[range.clone()];
                slice.sort_by_key(|&j| bbox.child_index(&points[j]));
                let mut counts = vec![0; nchildren];
                for &j in slice.iter() {
                    counts[bbox.child_index(&points[j])] += 1;
                }

                let first_child = nodes.len();
                let mut start = range.start;
                for (c, count) in counts.into_iter().enumerate() {
                    nodes.push(TreeNode {
                        bbox: bbox.child(c),
                        level: level + 1,
                        parent: Some(i),
                        children: None,
                        points: start..start + count,
                    });
                    start += count;
                }
                nodes[i].children = Some(first_child..first_child + nchildren);
            }
            if nodes.len() == next_start {
                break;
            }
            levels.push(next_start..nodes.len());
        }

        let leaves = (0..nodes.len())
            .filter(|&i| nodes[i].is_leaf())
            .collect_vec();
        let sorted_points = indices.iter().map(|&j| points[j]).collect_vec();

        info!(
            "Built tree with {} points, {} boxes, {} leaves and depth {}",
            points.len(),
            nodes.len(),
            leaves.len(),
            levels.len()
        );

        Self {
            nodes,
            levels,
            leaves,
            points: sorted_points,
            indices,
        }
    }

    /// All boxes, breadth first.
    pub fn nodes(&self) -> &[TreeNode<D>] {
        &self.nodes
    }

    /// A single box.
    pub fn node(&self, index: usize) -> &TreeNode<D> {
        &self.nodes[index]
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Indices of the boxes on a level.
    pub fn level(&self, level: usize) -> Range<usize> {
        self.levels[level].clone()
    }

    /// Indices of all leaf boxes.
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    /// Points in tree order.
    pub fn points(&self) -> &[[f64; D]] {
        &self.points
    }

    /// Points of a box.
    pub fn node_points(&self, index: usize) -> &[[f64; D]] {
        &self.points[self.nodes[index].points.clone()]
    }

    /// Position in the input of every point in tree order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of points.
    pub fn npoints(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    fn points_fixture(npoints: usize) -> Vec<[f64; 3]> {
        let mut rng = StdRng::seed_from_u64(0);
        (0..npoints)
            .map(|_| [rng.gen(), rng.gen(), rng.gen()])
            .collect()
    }

    #[test]
    fn test_leaves_partition_points() {
        let points = points_fixture(1000);
        let tree = BoxTree::new(&points, 20, 10);

        let mut covered = vec![false; points.len()];
        for &leaf in tree.leaves() {
            let node = tree.node(leaf);
            assert!(node.npoints() <= 20);
            for k in node.points.clone() {
                assert!(!covered[k]);
                covered[k] = true;
                assert!(node.bbox.contains(&tree.points()[k]));
            }
        }
        assert!(covered.iter().all(|&c| c));

        for (k, &j) in tree.indices().iter().enumerate() {
            assert_eq!(tree.points()[k], points[j]);
        }
    }

    #[test]
    fn test_levels_are_contiguous() {
        let tree = BoxTree::new(&points_fixture(500), 10, 10);
        let mut expected_start = 0;
        for level in 0..tree.depth() {
            let range = tree.level(level);
            assert_eq!(range.start, expected_start);
            expected_start = range.end;
            for i in range {
                assert_eq!(tree.node(i).level, level);
                if let Some(parent) = tree.node(i).parent {
                    assert_eq!(tree.node(parent).level + 1, level);
                    assert!(tree.node(parent).children.clone().unwrap().contains(&i));
                }
            }
        }
        assert_eq!(expected_start, tree.nodes().len());
    }

    #[test]
    fn test_children_share_parent_points() {
        let tree = BoxTree::new(&points_fixture(300), 5, 10);
        for node in tree.nodes() {
            if let Some(children) = node.children.clone() {
                let total: usize = children.map(|c| tree.node(c).npoints()).sum();
                assert_eq!(total, node.npoints());
            }
        }
    }

    #[test]
    fn test_max_level() {
        let points = vec![[0.5, 0.5]; 50];
        let tree = BoxTree::new(&points, 10, 3);
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.npoints(), 50);
    }

    #[test]
    fn test_small_and_empty() {
        let tree = BoxTree::<2>::new(&[], 10, 5);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaves(), &[0]);

        let tree = BoxTree::new(&[[0.1, 0.2], [0.3, 0.4]], 10, 5);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.node_points(0).len(), 2);
    }
}

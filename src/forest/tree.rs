//! CART classification tree with Gini impurity.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::dataset::label::{N_CLASSES, argmax};

/// Class tallies of the samples reaching a node.
pub type ClassCounts = [usize; N_CLASSES];

/// Growth limits of a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features examined per split (already resolved).
    pub max_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        counts: ClassCounts,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted decision tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

/// Best split found for a node.
struct Split {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity `(n_l * gini_l + n_r * gini_r) / n`.
    impurity: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Node awaiting construction.
struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

impl DecisionTree {
    /// Grow a tree over `samples` (row indices, repeats allowed for bootstrap
    /// draws).
    ///
    /// Returns the tree and its raw per-feature impurity decrease, where each
    /// split contributes `(n * gini - n_l * gini_l - n_r * gini_r) / N` with `N`
    /// the number of samples at the root.
    pub fn fit<R: Rng>(
        rows: &[&[f64]],
        labels: &[usize],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> (Self, Vec<f64>) {
        let n_features = rows.first().map_or(0, |r| r.len());
        let mut importances = vec![0.0; n_features];
        let total = samples.len().max(1) as f64;

        let mut nodes = vec![Node::Leaf {
            counts: [0; N_CLASSES],
        }];
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let counts = class_counts(labels, &samples);
            let n = samples.len();
            let impurity = gini(&counts, n);

            let stop = impurity == 0.0
                || n < params.min_samples_split
                || n < 2 * params.min_samples_leaf
                || params.max_depth.is_some_and(|d| depth >= d);

            let split = if stop {
                None
            } else {
                find_best_split(rows, labels, &samples, &counts, params, n_features, rng)
            };

            match split {
                Some(split) => {
                    importances[split.feature] += n as f64 * (impurity - split.impurity) / total;

                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf {
                        counts: [0; N_CLASSES],
                    });
                    nodes.push(Node::Leaf {
                        counts: [0; N_CLASSES],
                    });
                    nodes[node] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };

                    stack.push(Pending {
                        node: right,
                        samples: split.right,
                        depth: depth + 1,
                    });
                    stack.push(Pending {
                        node: left,
                        samples: split.left,
                        depth: depth + 1,
                    });
                }
                None => nodes[node] = Node::Leaf { counts },
            }
        }

        (Self { nodes, n_features }, importances)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Class tallies of the leaf `row` falls into.
    pub fn leaf_counts(&self, row: &[f64]) -> &ClassCounts {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { counts } => return counts,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Majority class of the leaf `row` falls into.
    pub fn vote(&self, row: &[f64]) -> usize {
        let counts = self.leaf_counts(row);
        argmax(&counts.map(|c| c as f64))
    }

    /// Class distribution of the leaf `row` falls into.
    pub fn distribution(&self, row: &[f64]) -> [f64; N_CLASSES] {
        let counts = self.leaf_counts(row);
        let total: usize = counts.iter().sum();
        if total == 0 {
            return [0.0; N_CLASSES];
        }
        counts.map(|c| c as f64 / total as f64)
    }
}

fn class_counts(labels: &[usize], samples: &[usize]) -> ClassCounts {
    let mut counts = [0; N_CLASSES];
    for &i in samples {
        counts[labels[i]] += 1;
    }
    counts
}

/// Gini impurity `1 - sum(p_k^2)`.
fn gini(counts: &ClassCounts, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Search for the split with the lowest weighted child impurity.
///
/// Features are visited in a random order. After `max_features` features
/// have been examined the search stops as soon as a valid split is known;
/// otherwise it keeps going through the remaining features.
fn find_best_split<R: Rng>(
    rows: &[&[f64]],
    labels: &[usize],
    samples: &[usize],
    parent: &ClassCounts,
    params: &TreeParams,
    n_features: usize,
    rng: &mut R,
) -> Option<Split> {
    let mut order: Vec<usize> = (0..n_features).collect();
    order.shuffle(rng);

    let n = samples.len();
    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

    for (visited, &feature) in order.iter().enumerate() {
        if visited >= params.max_features && best.is_some() {
            break;
        }

        sorted.clear();
        sorted.extend(samples.iter().map(|&i| (rows[i][feature], labels[i])));
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = [0usize; N_CLASSES];
        let mut right = *parent;

        for i in 0..n - 1 {
            let (value, label) = sorted[i];
            left[label] += 1;
            right[label] -= 1;

            let next = sorted[i + 1].0;
            if value == next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;
            if best.is_none_or(|(_, _, b)| impurity < b) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some((feature, threshold, impurity));
            }
        }
    }

    let (feature, threshold, impurity) = best?;
    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);

    Some(Split {
        feature,
        threshold,
        impurity,
        left,
        right,
    })
}

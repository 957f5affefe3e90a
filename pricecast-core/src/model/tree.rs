//! CART regression tree with variance-reduction splits.
//!
//! Nodes live in a flat arena; children are indices into it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Growth limits for one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree over `samples` (row indices into `rows`, repeats allowed).
    pub fn fit(
        rows: &[Vec<f64>],
        target: &[f64],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(rows, target, samples, 0, params, rng);
        tree
    }

    /// Number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.depth_of(0)
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => return f64::NAN,
            }
        }
    }

    fn depth_of(&self, idx: usize) -> usize {
        match self.nodes.get(idx) {
            Some(Node::Split { left, right, .. }) => {
                1 + self.depth_of(*left).max(self.depth_of(*right))
            }
            Some(Node::Leaf { .. }) => 0,
            None => 0,
        }
    }

    /// Returns the index of the node just built.
    fn grow(
        &mut self,
        rows: &[Vec<f64>],
        target: &[f64],
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let n = samples.len();
        let sum: f64 = samples.iter().map(|&i| target[i]).sum();
        let mean = if n == 0 { 0.0 } else { sum / n as f64 };
        let sse: f64 = samples.iter().map(|&i| (target[i] - mean).powi(2)).sum();

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= params.max_depth || n < params.min_samples_split || sse < 1e-10 {
            return idx;
        }

        let Some(split) = best_split(rows, target, &samples, params, rng) else {
            return idx;
        };
        if split.gain <= 0.0 {
            return idx;
        }

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| rows[i][split.feature] <= split.threshold);

        let left = self.grow(rows, target, left_samples, depth + 1, params, rng);
        let right = self.grow(rows, target, right_samples, depth + 1, params, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }
}

/// Best variance-reduction split over a random subset of features.
///
/// Each candidate feature is sorted once and swept with running sums, so a
/// split costs O(n log n) per feature.
fn best_split(
    rows: &[Vec<f64>],
    target: &[f64],
    samples: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<Split> {
    let n_features = rows.first().map_or(0, |r| r.len());
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);
    features.truncate(params.max_features.clamp(1, n_features.max(1)));

    let n = samples.len();
    let total_sum: f64 = samples.iter().map(|&i| target[i]).sum();
    let total_sq: f64 = samples.iter().map(|&i| target[i] * target[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;
    let min_leaf = params.min_samples_leaf.max(1);

    let mut best: Option<Split> = None;
    let mut order = samples.to_vec();
    for feature in features {
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..n - 1 {
            let y = target[order[k]];
            left_sum += y;
            left_sq += y * y;

            let left_n = k + 1;
            let right_n = n - left_n;
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }
            let here = rows[order[k]][feature];
            let next = rows[order[k + 1]][feature];
            if here == next {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let left_sse = left_sq - left_sum * left_sum / left_n as f64;
            let right_sse = right_sq - right_sum * right_sum / right_n as f64;
            let gain = parent_sse - (left_sse + right_sse);

            if best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(Split {
                    feature,
                    threshold: (here + next) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}

//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children. Candidate
//! thresholds come from a single sort per feature plus prefix sums, so one
//! node costs `O(m · n log n)` for `m` candidate features and `n` samples.
//!
//! Nodes live in a flat arena (`Vec<Node>`); children are indices.

use rand::Rng;
use rand::seq::SliceRandom;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split (`None` = all).
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone)]
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

#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Total SSE reduction credited to each feature.
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` selected by `indices`.
    ///
    /// `indices` may contain repeats (bootstrap samples).
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut tree = Self {
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        let mut work = indices.to_vec();
        tree.grow(x, y, &mut work, 0, params, rng);
        tree
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    #[cfg(test)]
    fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    fn grow<R: Rng>(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &mut [usize],
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let node_idx = self.nodes.len();
        let mean = mean_of(y, indices);
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= params.max_depth
            || indices.len() < params.min_samples_split.max(2)
            || indices.len() < 2 * params.min_samples_leaf.max(1)
        {
            return node_idx;
        }

        let Some(best) = best_split(x, y, indices, params, rng) else {
            return node_idx;
        };

        // Partition in place: rows <= threshold first.
        let mut mid = 0;
        for i in 0..indices.len() {
            if x[indices[i]][best.feature] <= best.threshold {
                indices.swap(i, mid);
                mid += 1;
            }
        }
        if mid == 0 || mid == indices.len() {
            return node_idx;
        }

        self.importances[best.feature] += best.gain;
        let (left_rows, right_rows) = indices.split_at_mut(mid);
        let left = self.grow(x, y, left_rows, depth + 1, params, rng);
        let right = self.grow(x, y, right_rows, depth + 1, params, rng);
        self.nodes[node_idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_idx
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn best_split<R: Rng>(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut R,
) -> Option<BestSplit> {
    let n_features = x[indices[0]].len();
    let mut features: Vec<usize> = (0..n_features).collect();
    if let Some(m) = params.max_features {
        if m < n_features {
            features.shuffle(rng);
            features.truncate(m.max(1));
        }
    }

    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total * total / n as f64;
    let min_leaf = params.min_samples_leaf.max(1);

    let mut best: Option<BestSplit> = None;
    let mut sorted = indices.to_vec();
    for &f in &features {
        sorted.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let yi = y[sorted[k - 1]];
            left_sum += yi;
            left_sq += yi * yi;

            if k < min_leaf || n - k < min_leaf {
                continue;
            }
            let lo = x[sorted[k - 1]][f];
            let hi = x[sorted[k]][f];
            if lo >= hi {
                continue;
            }

            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let sse_left = left_sq - left_sum * left_sum / k as f64;
            let sse_right = right_sq - right_sum * right_sum / (n - k) as f64;
            let gain = parent_sse - sse_left - sse_right;

            if gain > 1e-12 && best.as_ref().map(|b| gain > b.gain).unwrap_or(true) {
                best = Some(BestSplit {
                    feature: f,
                    threshold: lo + (hi - lo) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}

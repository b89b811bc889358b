use agri_core::{AgriError, ErrorInfo, RngHandle};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of bootstrap trees.
    #[serde(default = "default_trees")]
    pub n_trees: usize,
    /// Nodes with fewer samples become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Optional depth limit.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Master seed; tree `i` draws from substream `i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_trees() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    50
}

fn default_seed() -> u64 {
    42
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: default_trees(),
            min_samples_split: default_min_samples_split(),
            max_depth: None,
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// CART regression tree stored as a node arena rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RegressionTree {
    fn grow(x: &[Vec<f64>], y: &[f64], mut sample: Vec<usize>, config: &ForestConfig) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(x, y, &mut sample, 0, config);
        tree
    }

    fn build(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &mut [usize],
        depth: usize,
        config: &ForestConfig,
    ) -> usize {
        let id = self.nodes.len();
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n;
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = config.max_depth.is_some_and(|max| depth >= max);
        if indices.len() < config.min_samples_split.max(2) || depth_reached {
            return id;
        }
        let sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = sq - sum * sum / n;
        if parent_sse <= 1e-12 {
            return id;
        }
        let Some(best) = best_split(x, y, indices, sum, sq) else {
            return id;
        };
        if best.sse >= parent_sse {
            return id;
        }

        let mut cut = 0;
        for k in 0..indices.len() {
            if x[indices[k]][best.feature] <= best.threshold {
                indices.swap(cut, k);
                cut += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(cut);
        let left = self.build(x, y, left_idx, depth + 1, config);
        let right = self.build(x, y, right_idx, depth + 1, config);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Lowest within-child squared error over every feature and threshold.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    total_sum: f64,
    total_sq: f64,
) -> Option<Candidate> {
    let n = indices.len();
    let width = x[indices[0]].len();
    let mut best: Option<Candidate> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
    for feature in 0..width {
        pairs.clear();
        pairs.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..n - 1 {
            let (value, target) = pairs[k];
            left_sum += target;
            left_sq += target * target;
            let next = pairs[k + 1].0;
            if value == next {
                continue;
            }
            let nl = (k + 1) as f64;
            let nr = (n - k - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
            if best.as_ref().map_or(true, |b| sse < b.sse) {
                let mid = value + (next - value) / 2.0;
                best = Some(Candidate {
                    feature,
                    threshold: if mid < next { mid } else { value },
                    sse,
                });
            }
        }
    }
    best
}

/// Bootstrap-aggregated CART regressor averaging its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fits the forest. Trees grow in parallel but depend only on their index.
    pub fn fit(x: &[Vec<f64>], y: &[f64], config: &ForestConfig) -> Result<Self, AgriError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(AgriError::Training(
                ErrorInfo::new("forest-shape", "features and targets must be non-empty and aligned")
                    .with_context("rows", x.len())
                    .with_context("targets", y.len()),
            ));
        }
        if config.n_trees == 0 {
            return Err(AgriError::validation("forest-config", "forest needs at least one tree"));
        }
        let n_features = x[0].len();
        if let Some((row, _)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(AgriError::Training(
                ErrorInfo::new("forest-shape", "feature rows have inconsistent widths")
                    .with_context("row", row),
            ));
        }
        let finite = x.iter().flatten().chain(y).all(|v| v.is_finite());
        if !finite {
            return Err(AgriError::Training(ErrorInfo::new(
                "non-finite-feature",
                "training data contains NaN or infinite values",
            )));
        }

        let n = x.len();
        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|tree| {
                let mut rng = RngHandle::substream(config.seed, tree as u64);
                let sample: Vec<usize> = (0..n).map(|_| rng.inner_mut().gen_range(0..n)).collect();
                RegressionTree::grow(x, y, sample, config)
            })
            .collect();
        Ok(Self { trees, n_features })
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean prediction of every tree for one row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, AgriError> {
        if row.len() != self.n_features {
            return Err(AgriError::Evaluation(
                ErrorInfo::new("feature-width", "row width does not match the forest")
                    .with_context("expected", self.n_features)
                    .with_context("actual", row.len()),
            ));
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Predictions for many rows.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, AgriError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

use thiserror::Error;

use super::model::{GbdtModel, RegressionTree, TreeNode, sigmoid};

/// Boosting hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Number of boosting rounds (one tree per round).
    pub n_estimators: usize,
    /// Shrinkage applied per tree.
    pub learning_rate: f32,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Maximum number of histogram bins used for split search.
    pub bins: usize,
    /// L2 penalty on leaf weights.
    pub l2_regularization: f32,
    /// Minimum hessian sum in each child of a split.
    pub min_child_weight: f32,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 4,
            bins: 32,
            l2_regularization: 1.0,
            min_child_weight: 1.0,
        }
    }
}

/// In-memory binary dataset used for training and evaluation.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Number of `f32` values in each feature vector.
    pub feature_len: usize,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Labels in `{0, 1}` aligned with `x`.
    pub y: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("mismatched X/Y lengths ({x} rows, {y} labels)")]
    LengthMismatch { x: usize, y: usize },
    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("empty dataset")]
    Empty,
    #[error("label {0} is not binary")]
    InvalidLabel(u8),
    #[error("training labels contain a single class ({0})")]
    SingleClass(u8),
}

/// Train a binary gradient-boosted tree model with logistic loss.
///
/// Each round fits a depth-limited tree to the loss gradients using
/// histogram split search and Newton leaf weights.
pub fn train_gbdt(dataset: &TrainDataset, options: &TrainOptions) -> Result<GbdtModel, TrainError> {
    validate_dataset(dataset)?;
    let n = dataset.x.len();
    let cuts = feature_cuts(&dataset.x, dataset.feature_len, options.bins);
    let binned = bin_features(&dataset.x, &cuts);

    let positives = dataset.y.iter().filter(|&&label| label == 1).count();
    let prior = (positives as f32 / n as f32).clamp(1e-6, 1.0 - 1e-6);
    let base_score = (prior / (1.0 - prior)).ln();

    let mut raw = vec![base_score; n];
    let mut grad = vec![0.0f32; n];
    let mut hess = vec![0.0f32; n];
    let mut trees = Vec::with_capacity(options.n_estimators);
    for round in 0..options.n_estimators {
        for i in 0..n {
            let p = sigmoid(raw[i]);
            grad[i] = p - dataset.y[i] as f32;
            hess[i] = (p * (1.0 - p)).max(1e-6);
        }
        let grower = TreeGrower {
            binned: &binned,
            cuts: &cuts,
            grad: &grad,
            hess: &hess,
            options,
        };
        let tree = grower.grow((0..n).collect());
        for (i, row) in dataset.x.iter().enumerate() {
            raw[i] += options.learning_rate * tree.predict(row);
        }
        if (round + 1) % 50 == 0 {
            tracing::debug!(round = round + 1, logloss = log_loss(&dataset.y, &raw), "Boosting progress");
        }
        trees.push(tree);
    }

    Ok(GbdtModel {
        feature_len: dataset.feature_len,
        learning_rate: options.learning_rate,
        base_score,
        trees,
    })
}

fn validate_dataset(dataset: &TrainDataset) -> Result<(), TrainError> {
    if dataset.x.len() != dataset.y.len() {
        return Err(TrainError::LengthMismatch {
            x: dataset.x.len(),
            y: dataset.y.len(),
        });
    }
    if dataset.x.is_empty() {
        return Err(TrainError::Empty);
    }
    for (row, values) in dataset.x.iter().enumerate() {
        if values.len() != dataset.feature_len {
            return Err(TrainError::RaggedRow {
                row,
                found: values.len(),
                expected: dataset.feature_len,
            });
        }
    }
    if let Some(&label) = dataset.y.iter().find(|&&label| label > 1) {
        return Err(TrainError::InvalidLabel(label));
    }
    let first = dataset.y[0];
    if dataset.y.iter().all(|&label| label == first) {
        return Err(TrainError::SingleClass(first));
    }
    Ok(())
}

fn log_loss(y: &[u8], raw: &[f32]) -> f64 {
    let total: f64 = y
        .iter()
        .zip(raw)
        .map(|(&label, &margin)| {
            let p = (sigmoid(margin) as f64).clamp(1e-12, 1.0 - 1e-12);
            if label == 1 { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / y.len().max(1) as f64
}

/// Quantile cut points per feature. A value falls in bin `b` when it is
/// `<= cuts[b]` and greater than every earlier cut; the last bin holds values
/// above all cuts.
fn feature_cuts(x: &[Vec<f32>], feature_len: usize, bins: usize) -> Vec<Vec<f32>> {
    let bins = bins.clamp(2, 256);
    (0..feature_len)
        .map(|j| {
            let mut values: Vec<f32> = x.iter().map(|row| row[j]).filter(|v| v.is_finite()).collect();
            values.sort_by(f32::total_cmp);
            let n = values.len();
            let Some(&max) = values.last() else {
                return Vec::new();
            };
            let mut cuts: Vec<f32> = (1..bins)
                .filter_map(|i| {
                    let rank = i * n / bins;
                    (rank > 0).then(|| values[rank - 1])
                })
                .filter(|&cut| cut < max)
                .collect();
            cuts.dedup();
            cuts
        })
        .collect()
}

fn bin_features(x: &[Vec<f32>], cuts: &[Vec<f32>]) -> Vec<Vec<u8>> {
    x.iter()
        .map(|row| {
            cuts.iter()
                .enumerate()
                .map(|(j, feature_cuts)| {
                    let value = row[j];
                    feature_cuts.partition_point(|&cut| cut < value) as u8
                })
                .collect()
        })
        .collect()
}

struct TreeGrower<'a> {
    binned: &'a [Vec<u8>],
    cuts: &'a [Vec<f32>],
    grad: &'a [f32],
    hess: &'a [f32],
    options: &'a TrainOptions,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    gain: f64,
    feature_index: usize,
    cut_index: usize,
}

impl TreeGrower<'_> {
    fn grow(&self, rows: Vec<usize>) -> RegressionTree {
        let mut nodes = Vec::new();
        self.build(rows, 0, &mut nodes);
        RegressionTree { nodes }
    }

    fn build(&self, rows: Vec<usize>, depth: usize, nodes: &mut Vec<TreeNode>) -> usize {
        let (g_sum, h_sum) = self.sums(&rows);
        let cover = rows.len() as f32;
        let idx = nodes.len();
        nodes.push(TreeNode::Leaf {
            value: self.leaf_value(g_sum, h_sum),
            cover,
        });
        if depth >= self.options.max_depth || rows.len() < 2 {
            return idx;
        }
        let Some(best) = self.best_split(&rows, g_sum, h_sum) else {
            return idx;
        };
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&row| (self.binned[row][best.feature_index] as usize) <= best.cut_index);
        let left = self.build(left_rows, depth + 1, nodes);
        let right = self.build(right_rows, depth + 1, nodes);
        nodes[idx] = TreeNode::Split {
            feature_index: best.feature_index,
            threshold: self.cuts[best.feature_index][best.cut_index],
            left,
            right,
            cover,
        };
        idx
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &row| {
            (g + self.grad[row] as f64, h + self.hess[row] as f64)
        })
    }

    fn leaf_value(&self, g_sum: f64, h_sum: f64) -> f32 {
        (-g_sum / (h_sum + self.options.l2_regularization as f64)) as f32
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.options.l2_regularization as f64)
    }

    fn best_split(&self, rows: &[usize], g_sum: f64, h_sum: f64) -> Option<BestSplit> {
        let parent_score = self.score(g_sum, h_sum);
        let min_child_weight = self.options.min_child_weight as f64;
        let mut best: Option<BestSplit> = None;
        for (feature_index, feature_cuts) in self.cuts.iter().enumerate() {
            if feature_cuts.is_empty() {
                continue;
            }
            let n_bins = feature_cuts.len() + 1;
            let mut grad_hist = vec![0f64; n_bins];
            let mut hess_hist = vec![0f64; n_bins];
            let mut count_hist = vec![0usize; n_bins];
            for &row in rows {
                let b = self.binned[row][feature_index] as usize;
                grad_hist[b] += self.grad[row] as f64;
                hess_hist[b] += self.hess[row] as f64;
                count_hist[b] += 1;
            }
            let (mut g_left, mut h_left, mut n_left) = (0f64, 0f64, 0usize);
            for cut_index in 0..feature_cuts.len() {
                g_left += grad_hist[cut_index];
                h_left += hess_hist[cut_index];
                n_left += count_hist[cut_index];
                let n_right = rows.len() - n_left;
                let h_right = h_sum - h_left;
                if n_left == 0 || n_right == 0 || h_left < min_child_weight || h_right < min_child_weight {
                    continue;
                }
                let gain = self.score(g_left, h_left) + self.score(g_sum - g_left, h_right) - parent_score;
                if gain > 1e-12 && best.is_none_or(|b| gain > b.gain) {
                    best = Some(BestSplit {
                        gain,
                        feature_index,
                        cut_index,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_dataset() -> TrainDataset {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let debt_ratio = i as f32 / 40.0;
            let noise = ((i * 7) % 5) as f32;
            x.push(vec![debt_ratio, noise]);
            y.push(u8::from(debt_ratio > 0.6));
        }
        TrainDataset { feature_len: 2, x, y }
    }

    #[test]
    fn learns_a_threshold_rule() {
        let dataset = separable_dataset();
        let options = TrainOptions {
            n_estimators: 30,
            min_child_weight: 0.0,
            ..TrainOptions::default()
        };
        let model = train_gbdt(&dataset, &options).unwrap();
        assert_eq!(model.trees.len(), 30);
        assert!(model.validate().is_ok());
        for (row, &label) in dataset.x.iter().zip(&dataset.y) {
            assert_eq!(model.predict_class(row), label, "row {row:?}");
        }
        assert!(model.predict_proba(&[0.95, 0.0]) > 0.8);
        assert!(model.predict_proba(&[0.05, 0.0]) < 0.2);
        assert!(model.trees.iter().all(|tree| tree.depth() <= options.max_depth));
    }

    #[test]
    fn training_is_deterministic() {
        let dataset = separable_dataset();
        let options = TrainOptions {
            n_estimators: 10,
            ..TrainOptions::default()
        };
        let a = train_gbdt(&dataset, &options).unwrap();
        let b = train_gbdt(&dataset, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_single_class_and_bad_shapes() {
        let dataset = TrainDataset {
            feature_len: 1,
            x: vec![vec![1.0], vec![2.0]],
            y: vec![0, 0],
        };
        assert_eq!(
            train_gbdt(&dataset, &TrainOptions::default()).unwrap_err(),
            TrainError::SingleClass(0)
        );
        let dataset = TrainDataset {
            feature_len: 2,
            x: vec![vec![1.0], vec![2.0, 3.0]],
            y: vec![0, 1],
        };
        assert!(matches!(
            train_gbdt(&dataset, &TrainOptions::default()).unwrap_err(),
            TrainError::RaggedRow { row: 0, .. }
        ));
        let dataset = TrainDataset {
            feature_len: 1,
            x: vec![],
            y: vec![],
        };
        assert_eq!(
            train_gbdt(&dataset, &TrainOptions::default()).unwrap_err(),
            TrainError::Empty
        );
    }

    #[test]
    fn node_cover_counts_training_rows() {
        let dataset = separable_dataset();
        let options = TrainOptions {
            n_estimators: 5,
            min_child_weight: 0.0,
            ..TrainOptions::default()
        };
        let model = train_gbdt(&dataset, &options).unwrap();
        for tree in &model.trees {
            assert_eq!(tree.nodes[0].cover(), dataset.x.len() as f32);
            for node in &tree.nodes {
                if let TreeNode::Split { left, right, cover, .. } = node {
                    assert_eq!(tree.nodes[*left].cover() + tree.nodes[*right].cover(), *cover);
                }
            }
        }
    }

    #[test]
    fn cuts_respect_bin_budget_and_exclude_max() {
        let x: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32, 1.0]).collect();
        let cuts = feature_cuts(&x, 2, 8);
        assert!(cuts[0].len() <= 7);
        assert!(cuts[0].windows(2).all(|w| w[0] < w[1]));
        assert!(cuts[0].iter().all(|&c| c < 99.0));
        assert!(cuts[1].is_empty());
        let binned = bin_features(&x, &cuts);
        assert_eq!(binned[0][0], 0);
        assert_eq!(binned[99][0] as usize, cuts[0].len());
    }
}

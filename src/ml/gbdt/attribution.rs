//! Exact path-dependent tree attributions (TreeSHAP).
//!
//! For every row, `expected_value() + attributions(row).sum()` equals the
//! model's raw margin for that row.

use super::model::{GbdtModel, RegressionTree, TreeNode};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` for the root sentinel.
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

impl GbdtModel {
    /// Per-feature contributions to the raw margin of `features`.
    pub fn attributions(&self, features: &[f32]) -> Vec<f64> {
        let mut phi = vec![0.0f64; self.feature_len];
        let scale = self.learning_rate as f64;
        for tree in &self.trees {
            tree.accumulate_attributions(features, scale, &mut phi);
        }
        phi
    }
}

impl RegressionTree {
    fn accumulate_attributions(&self, features: &[f32], scale: f64, phi: &mut [f64]) {
        let path = Vec::with_capacity(self.depth() + 2);
        self.recurse(0, features, scale, phi, path, 1.0, 1.0, None);
    }

    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &self,
        idx: usize,
        features: &[f32],
        scale: f64,
        phi: &mut [f64],
        mut path: Vec<PathElement>,
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) {
        extend_path(&mut path, zero_fraction, one_fraction, feature);
        match &self.nodes[idx] {
            TreeNode::Leaf { value, .. } => {
                for i in 1..path.len() {
                    let element = path[i];
                    if let Some(feature) = element.feature {
                        let weight = unwound_weight_sum(&path, i);
                        phi[feature] += weight
                            * (element.one_fraction - element.zero_fraction)
                            * *value as f64
                            * scale;
                    }
                }
            }
            TreeNode::Split {
                feature_index,
                threshold,
                left,
                right,
                cover,
            } => {
                let value = features.get(*feature_index).copied().unwrap_or(0.0);
                let (hot, cold) = if value <= *threshold {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let cover = *cover as f64;
                let hot_fraction = self.nodes[hot].cover() as f64 / cover;
                let cold_fraction = self.nodes[cold].cover() as f64 / cover;

                // A feature seen earlier on the path is merged into this split.
                let (mut incoming_zero, mut incoming_one) = (1.0, 1.0);
                if let Some(k) = path
                    .iter()
                    .skip(1)
                    .position(|e| e.feature == Some(*feature_index))
                    .map(|k| k + 1)
                {
                    incoming_zero = path[k].zero_fraction;
                    incoming_one = path[k].one_fraction;
                    path = unwind_path(&path, k);
                }
                self.recurse(
                    hot,
                    features,
                    scale,
                    phi,
                    path.clone(),
                    incoming_zero * hot_fraction,
                    incoming_one,
                    Some(*feature_index),
                );
                self.recurse(
                    cold,
                    features,
                    scale,
                    phi,
                    path,
                    incoming_zero * cold_fraction,
                    0.0,
                    Some(*feature_index),
                );
            }
        }
    }
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

fn unwind_path(path: &[PathElement], index: usize) -> Vec<PathElement> {
    let depth = path.len() - 1;
    let PathElement {
        zero_fraction,
        one_fraction,
        ..
    } = path[index];
    let denom = (depth + 1) as f64;
    let mut out = path.to_vec();
    let mut next = out[depth].weight;
    for j in (0..depth).rev() {
        if one_fraction != 0.0 {
            let current = out[j].weight;
            out[j].weight = next * denom / ((j + 1) as f64 * one_fraction);
            next = current - out[j].weight * zero_fraction * (depth - j) as f64 / denom;
        } else {
            out[j].weight = out[j].weight * denom / (zero_fraction * (depth - j) as f64);
        }
    }
    for j in index..depth {
        out[j].feature = out[j + 1].feature;
        out[j].zero_fraction = out[j + 1].zero_fraction;
        out[j].one_fraction = out[j + 1].one_fraction;
    }
    out.truncate(depth);
    out
}

fn unwound_weight_sum(path: &[PathElement], index: usize) -> f64 {
    unwind_path(path, index).iter().map(|e| e.weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::gbdt::{TrainDataset, TrainOptions, train_gbdt};

    fn leaf(value: f32, cover: f32) -> TreeNode {
        TreeNode::Leaf { value, cover }
    }

    #[test]
    fn single_split_attribution_matches_hand_computation() {
        let model = GbdtModel {
            feature_len: 2,
            learning_rate: 1.0,
            base_score: 0.0,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature_index: 0,
                        threshold: 0.5,
                        left: 1,
                        right: 2,
                        cover: 4.0,
                    },
                    leaf(-1.0, 3.0),
                    leaf(2.0, 1.0),
                ],
            }],
        };
        let phi = model.attributions(&[1.0, 7.0]);
        assert!((phi[0] - 2.25).abs() < 1e-12);
        assert_eq!(phi[1], 0.0);
        assert!((model.expected_value() + 0.25).abs() < 1e-12);
    }

    #[test]
    fn repeated_feature_on_path_keeps_local_accuracy() {
        // feature 0 is split twice along the same path
        let model = GbdtModel {
            feature_len: 2,
            learning_rate: 0.5,
            base_score: 0.3,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature_index: 0,
                        threshold: 1.0,
                        left: 1,
                        right: 2,
                        cover: 10.0,
                    },
                    TreeNode::Split {
                        feature_index: 1,
                        threshold: 0.0,
                        left: 3,
                        right: 4,
                        cover: 6.0,
                    },
                    leaf(3.0, 4.0),
                    TreeNode::Split {
                        feature_index: 0,
                        threshold: 0.0,
                        left: 5,
                        right: 6,
                        cover: 2.0,
                    },
                    leaf(-2.0, 4.0),
                    leaf(1.0, 1.0),
                    leaf(-4.0, 1.0),
                ],
            }],
        };
        for row in [[-1.0f32, -1.0], [0.5, -1.0], [0.5, 1.0], [2.0, -1.0]] {
            let phi = model.attributions(&row);
            let total = model.expected_value() + phi.iter().sum::<f64>();
            assert!(
                (total - model.predict_raw(&row) as f64).abs() < 1e-5,
                "row {row:?}: {total} vs {}",
                model.predict_raw(&row)
            );
        }
    }

    #[test]
    fn trained_model_attributions_sum_to_margin() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            let a = (i % 10) as f32;
            let b = ((i * 3) % 7) as f32;
            let c = (i / 6) as f32;
            x.push(vec![a, b, c]);
            y.push(u8::from(a + 0.5 * b > 6.0));
        }
        let dataset = TrainDataset { feature_len: 3, x, y };
        let options = TrainOptions {
            n_estimators: 20,
            ..TrainOptions::default()
        };
        let model = train_gbdt(&dataset, &options).unwrap();
        for row in dataset.x.iter().take(15) {
            let phi = model.attributions(row);
            let total = model.expected_value() + phi.iter().sum::<f64>();
            assert!((total - model.predict_raw(row) as f64).abs() < 1e-3);
        }
    }
}

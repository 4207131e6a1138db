use serde::{Deserialize, Serialize};

/// Node of a regression tree stored in a flat arena; the root is index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature_index: usize,
        /// Rows with `feature <= threshold` go left.
        threshold: f32,
        left: usize,
        right: usize,
        /// Training rows that reached this node.
        cover: f32,
    },
    Leaf { value: f32, cover: f32 },
}

impl TreeNode {
    pub fn cover(&self) -> f32 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

/// Weak learner of the boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Leaf value reached by `features`.
    pub fn predict(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = features.get(*feature_index).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value.
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, idx: usize) -> f64 {
        match &self.nodes[idx] {
            TreeNode::Leaf { value, .. } => *value as f64,
            TreeNode::Split {
                left, right, cover, ..
            } => {
                let left_cover = self.nodes[*left].cover() as f64;
                let right_cover = self.nodes[*right].cover() as f64;
                (left_cover * self.node_expectation(*left)
                    + right_cover * self.node_expectation(*right))
                    / *cover as f64
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }

    fn validate(&self, feature_len: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature_index,
                left,
                right,
                cover,
                ..
            } = node
            {
                if *feature_index >= feature_len {
                    return Err(format!(
                        "node {idx} splits on feature {feature_index} but model has {feature_len}"
                    ));
                }
                // Children are always allocated after their parent, which rules out cycles.
                if *left <= idx || *right <= idx || *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(format!("node {idx} has out-of-order children"));
                }
                if *cover <= 0.0 {
                    return Err(format!("node {idx} has non-positive cover"));
                }
            }
        }
        Ok(())
    }
}

/// Gradient-boosted binary classifier with a logistic link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtModel {
    /// Number of `f32` values per feature vector.
    pub feature_len: usize,
    /// Shrinkage applied to every tree output.
    pub learning_rate: f32,
    /// Initial raw margin (log-odds of the training prior).
    pub base_score: f32,
    pub trees: Vec<RegressionTree>,
}

impl GbdtModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_len == 0 {
            return Err("model expects zero features".to_string());
        }
        if !self.learning_rate.is_finite() || !self.base_score.is_finite() {
            return Err("non-finite learning rate or base score".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_len)
                .map_err(|err| format!("tree {tree_idx}: {err}"))?;
        }
        Ok(())
    }

    /// Raw margin (log-odds of the distressed class).
    pub fn predict_raw(&self, features: &[f32]) -> f32 {
        let sum: f32 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        self.base_score + self.learning_rate * sum
    }

    /// Probability of the positive (distressed) class.
    pub fn predict_proba(&self, features: &[f32]) -> f32 {
        sigmoid(self.predict_raw(features))
    }

    /// Hard label: `1` when the positive-class probability exceeds 0.5.
    pub fn predict_class(&self, features: &[f32]) -> u8 {
        u8::from(self.predict_raw(features) > 0.0)
    }

    /// Mean raw margin over the training distribution.
    pub fn expected_value(&self) -> f64 {
        let sum: f64 = self.trees.iter().map(RegressionTree::expected_value).sum();
        self.base_score as f64 + self.learning_rate as f64 * sum
    }
}

/// Numerically-stable logistic function.
pub fn sigmoid(raw: f32) -> f32 {
    if raw >= 0.0 {
        1.0 / (1.0 + (-raw).exp())
    } else {
        let e = raw.exp();
        e / (1.0 + e)
    }
}

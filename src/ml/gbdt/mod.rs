//! Deterministic gradient-boosted decision-tree classifier.
//!
//! A dependency-free binary learner:
//! - Logistic loss with Newton leaf weights and L2 regularization.
//! - Histogram split search over quantile cut points.
//! - Exact tree attributions for explaining predictions.
//! - Serde-friendly flat node arenas for JSON export/load.

mod attribution;
mod model;
mod train;

pub use model::{GbdtModel, RegressionTree, TreeNode, sigmoid};
pub use train::{TrainDataset, TrainError, TrainOptions, train_gbdt};

//! Evaluation metrics for the binary classifier.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Harmonic mean of precision and recall.
    pub f1: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
///
/// Undefined ratios (no predictions or no support) are reported as `0`.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f32;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f32;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        stats.push(PerClassStats {
            precision,
            recall,
            f1,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    let correct: u32 = (0..cm.n_classes).map(|c| cm.get(c, c)).sum();
    correct as f32 / total as f32
}

/// Area under the ROC curve for binary labels and positive-class scores.
///
/// Computed as the Mann-Whitney statistic with tied scores sharing their
/// average rank. `None` when either class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    if labels.len() != scores.len() {
        return None;
    }
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0f64;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based; a tie group shares the mean of its ranks
        let mean_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            if labels[idx] == 1 {
                positive_rank_sum += mean_rank;
            }
        }
        start = end;
    }
    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// Text classification report: per-class precision/recall/F1/support plus
/// accuracy, macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub class_names: Vec<String>,
    pub per_class: Vec<PerClassStats>,
    pub accuracy: f32,
    pub macro_avg: PerClassStats,
    pub weighted_avg: PerClassStats,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix, class_names: Vec<String>) -> Self {
        let per_class = precision_recall_by_class(cm);
        let total: u32 = per_class.iter().map(|s| s.support).sum();
        let k = per_class.len().max(1) as f32;
        let macro_avg = PerClassStats {
            precision: per_class.iter().map(|s| s.precision).sum::<f32>() / k,
            recall: per_class.iter().map(|s| s.recall).sum::<f32>() / k,
            f1: per_class.iter().map(|s| s.f1).sum::<f32>() / k,
            support: total,
        };
        let weight = |f: fn(&PerClassStats) -> f32| {
            if total == 0 {
                return 0.0;
            }
            per_class
                .iter()
                .map(|s| f(s) * s.support as f32)
                .sum::<f32>()
                / total as f32
        };
        let weighted_avg = PerClassStats {
            precision: weight(|s| s.precision),
            recall: weight(|s| s.recall),
            f1: weight(|s| s.f1),
            support: total,
        };
        Self {
            class_names,
            accuracy: accuracy(cm),
            per_class,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, stats) in self.class_names.iter().zip(&self.per_class) {
            write_row(f, name, stats, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg, width)?;
        write_row(f, "weighted avg", &self.weighted_avg, width)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, stats: &PerClassStats, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, stats.precision, stats.recall, stats.f1, stats.support
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(pairs: &[(usize, usize)]) -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new(2);
        for &(truth, predicted) in pairs {
            cm.add(truth, predicted);
        }
        cm
    }

    #[test]
    fn per_class_stats_and_accuracy() {
        // 3 TN, 1 FP, 1 FN, 3 TP
        let cm = matrix(&[(0, 0), (0, 0), (0, 0), (0, 1), (1, 0), (1, 1), (1, 1), (1, 1)]);
        let stats = precision_recall_by_class(&cm);
        assert!((stats[1].precision - 0.75).abs() < 1e-6);
        assert!((stats[1].recall - 0.75).abs() < 1e-6);
        assert!((stats[1].f1 - 0.75).abs() < 1e-6);
        assert_eq!(stats[0].support, 4);
        assert!((accuracy(&cm) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn report_averages_and_renders() {
        let cm = matrix(&[(0, 0), (0, 0), (0, 1), (1, 1)]);
        let report = ClassificationReport::from_confusion(&cm, vec!["0".into(), "1".into()]);
        assert_eq!(report.macro_avg.support, 4);
        // class 0: p=1, r=2/3; class 1: p=1/2, r=1
        assert!((report.macro_avg.precision - 0.75).abs() < 1e-6);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-6);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
    }

    #[test]
    fn roc_auc_handles_ties_and_degenerate_labels() {
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]), Some(0.75));
        assert_eq!(roc_auc(&[0, 1], &[0.5, 0.5]), Some(0.5));
        assert_eq!(roc_auc(&[0, 1, 1], &[0.1, 0.9, 0.8]), Some(1.0));
        assert_eq!(roc_auc(&[1, 1], &[0.1, 0.9]), None);
    }
}

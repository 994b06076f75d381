//! Confusion-matrix evaluation of a trained classifier.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::automata::Recognise;
use crate::dataset::LabeledSequence;

/// Quality and size figures for one evaluation run. The state counts and
/// the minimisation duration are filled in by the training pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub false_positive_rate: f64,
    pub false_negative_rate: f64,
    pub states_before: usize,
    pub states_after: usize,
    pub minimisation_time: Duration,
}

/// Classifies every test sequence and derives accuracy, false positive
/// rate and false negative rate. Rates with an empty denominator (no
/// negatives resp. positives in the test slice) are reported as 0 instead
/// of NaN. An empty test set yields zeroed metrics.
pub fn evaluate<C: Recognise>(classifier: &C, test_sequences: &[LabeledSequence]) -> Metrics {
    let mut metrics = Metrics::default();
    if test_sequences.is_empty() {
        return metrics;
    }

    let mut true_positive = 0usize;
    let mut true_negative = 0usize;
    let mut false_positive = 0usize;
    let mut false_negative = 0usize;

    for sample in test_sequences {
        let predicted = classifier.recognise(&sample.symbols);
        match (predicted, sample.label) {
            (true, true) => true_positive += 1,
            (false, false) => true_negative += 1,
            (true, false) => false_positive += 1,
            (false, true) => false_negative += 1,
        }
    }

    let total = test_sequences.len() as f64;
    metrics.accuracy = (true_positive + true_negative) as f64 / total;

    let fp_denom = (false_positive + true_negative) as f64;
    let fn_denom = (false_negative + true_positive) as f64;
    metrics.false_positive_rate = if fp_denom > 0.0 {
        false_positive as f64 / fp_denom
    } else {
        0.0
    };
    metrics.false_negative_rate = if fn_denom > 0.0 {
        false_negative as f64 / fn_denom
    } else {
        0.0
    };

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{Dfa, Pta};

    fn sample(id: &str, symbols: &[&str], label: bool) -> LabeledSequence {
        LabeledSequence {
            id: id.to_owned(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            label,
            ..LabeledSequence::default()
        }
    }

    #[test]
    fn perfect_classifier_scores_one() {
        let samples = vec![
            sample("m1", &["x"], true),
            sample("b1", &["y"], false),
        ];
        let dfa = Dfa::from_pta(&Pta::from_samples(&samples)).unwrap().minimise();
        let metrics = evaluate(&dfa, &samples);

        assert!((metrics.accuracy - 1.0).abs() < 1e-9);
        assert_eq!(metrics.false_positive_rate, 0.0);
        assert_eq!(metrics.false_negative_rate, 0.0);
    }

    #[test]
    fn rates_split_by_true_class() {
        let train = vec![
            sample("m1", &["x"], true),
            sample("b1", &["y"], false),
        ];
        let dfa = Dfa::from_pta(&Pta::from_samples(&train)).unwrap().minimise();

        // one false negative out of two positives, one false positive out
        // of two negatives
        let test = vec![
            sample("t1", &["x"], true),
            sample("t2", &["z"], true),
            sample("t3", &["y"], false),
            sample("t4", &["x"], false),
        ];
        let metrics = evaluate(&dfa, &test);
        assert!((metrics.accuracy - 0.5).abs() < 1e-9);
        assert!((metrics.false_positive_rate - 0.5).abs() < 1e-9);
        assert!((metrics.false_negative_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_test_set_yields_zeroed_metrics() {
        let dfa = Dfa::default();
        let metrics = evaluate(&dfa, &[]);
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.false_positive_rate, 0.0);
        assert_eq!(metrics.false_negative_rate, 0.0);
    }

    #[test]
    fn one_sided_test_set_has_zero_undefined_rate() {
        let train = vec![
            sample("m1", &["x"], true),
            sample("b1", &["y"], false),
        ];
        let dfa = Dfa::from_pta(&Pta::from_samples(&train)).unwrap().minimise();

        let positives_only = vec![sample("t1", &["x"], true)];
        let metrics = evaluate(&dfa, &positives_only);
        assert_eq!(metrics.false_positive_rate, 0.0);
    }
}

//! Prefix tree acceptor over labeled symbol sequences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::LabeledSequence;
use crate::Symbol;

/// A node of the prefix tree. Children are dense indices into the arena
/// owned by [`Pta`]; counts are non-zero only on nodes where at least one
/// full sample sequence ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PtaNode {
    pub id: usize,
    pub transitions: BTreeMap<Symbol, usize>,
    pub positive_count: usize,
    pub negative_count: usize,
}

/// Prefix tree acceptor: a trie of training sequences with per-leaf label
/// counts. Node ids are dense in `[0, node_count)` with the root at 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pta {
    start: usize,
    nodes: Vec<PtaNode>,
}

impl Default for Pta {
    fn default() -> Self {
        Pta {
            start: 0,
            nodes: vec![PtaNode::default()],
        }
    }
}

impl Pta {
    /// Builds the prefix tree for `samples`. Samples with identical symbol
    /// sequences aggregate their counts at the same node; a sample with an
    /// empty sequence updates the root counts directly.
    pub fn from_samples(samples: &[LabeledSequence]) -> Self {
        let mut pta = Pta::default();

        for sample in samples {
            let mut current = pta.start;
            for symbol in &sample.symbols {
                current = match pta.nodes[current].transitions.get(symbol).copied() {
                    Some(child) => child,
                    None => {
                        let child = pta.add_node();
                        pta.nodes[current].transitions.insert(symbol.clone(), child);
                        child
                    }
                };
            }

            if sample.label {
                pta.nodes[current].positive_count += 1;
            } else {
                pta.nodes[current].negative_count += 1;
            }
        }

        pta
    }

    fn add_node(&mut self) -> usize {
        let id = self.nodes.len();
        self.nodes.push(PtaNode {
            id,
            ..PtaNode::default()
        });
        id
    }

    pub fn nodes(&self) -> &[PtaNode] {
        &self.nodes
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, symbols: &[&str], label: bool) -> LabeledSequence {
        LabeledSequence {
            id: id.to_owned(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            label,
            ..LabeledSequence::default()
        }
    }

    #[test]
    fn shared_prefixes_branch() {
        let samples = vec![
            sample("s1", &["a", "b"], true),
            sample("s2", &["a", "c"], false),
        ];
        let pta = Pta::from_samples(&samples);

        // root, the shared "a" child, and one node per continuation
        assert_eq!(pta.node_count(), 4);
        let root = &pta.nodes()[pta.start()];
        assert!(root.transitions.contains_key("a"));

        let a = root.transitions["a"];
        assert_eq!(pta.nodes()[a].transitions.len(), 2);
    }

    #[test]
    fn identical_sequences_aggregate_counts() {
        let samples = vec![
            sample("s1", &["x"], true),
            sample("s2", &["x"], true),
            sample("s3", &["x"], false),
        ];
        let pta = Pta::from_samples(&samples);

        assert_eq!(pta.node_count(), 2);
        let leaf = pta.nodes()[pta.start()].transitions["x"];
        assert_eq!(pta.nodes()[leaf].positive_count, 2);
        assert_eq!(pta.nodes()[leaf].negative_count, 1);
    }

    #[test]
    fn empty_sequence_counts_on_root() {
        let samples = vec![sample("empty", &[], true)];
        let pta = Pta::from_samples(&samples);

        assert_eq!(pta.node_count(), 1);
        assert_eq!(pta.nodes()[0].positive_count, 1);
    }

    #[test]
    fn counts_sit_only_on_sequence_ends() {
        let samples = vec![sample("s1", &["a", "b", "c"], true)];
        let pta = Pta::from_samples(&samples);

        let ends: Vec<_> = pta
            .nodes()
            .iter()
            .filter(|n| n.positive_count + n.negative_count > 0)
            .collect();
        assert_eq!(ends.len(), 1);
        assert!(ends[0].transitions.is_empty());
    }
}

//! Transition table reconstructed from a grammar or DOT file.

mod from_cnf;
mod from_dot;

pub use self::from_cnf::load_cnf;
pub use self::from_dot::{load_dfa_dot, parse_dfa_dot};

use std::collections::BTreeMap;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use super::Recognise;
use crate::Symbol;

/// Name of the synthetic accepting state targeted by unit-terminal
/// productions (`A -> a`), which a state table cannot express otherwise.
pub const ACCEPT_STATE: &str = "Accept";

/// A classifier reconstructed from a CNF grammar or a DOT file.
///
/// Operationally equivalent to a DFA, but states carry human-readable
/// names (`S`, `A0`, `A1`, …) instead of dense indices, and acceptance of
/// unit-terminal productions is routed through the synthetic
/// [`ACCEPT_STATE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrammarDfa {
    names: Vec<String>,
    index: FnvHashMap<String, usize>,
    transitions: Vec<BTreeMap<Symbol, usize>>,
    accepting: Vec<bool>,
    start: usize,
}

impl GrammarDfa {
    pub fn add_state_if_missing(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        self.transitions.push(BTreeMap::new());
        self.accepting.push(false);
        id
    }

    pub fn set_start(&mut self, name: &str) {
        self.start = self.add_state_if_missing(name);
    }

    pub fn set_accepting(&mut self, name: &str) {
        let id = self.add_state_if_missing(name);
        self.accepting[id] = true;
    }

    pub fn add_transition(&mut self, from: &str, on: &str, to: &str) {
        let from = self.add_state_if_missing(from);
        let to = self.add_state_if_missing(to);
        self.transitions[from].insert(on.to_owned(), to);
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn is_accepting(&self, id: usize) -> bool {
        self.accepting.get(id).copied().unwrap_or(false)
    }

    /// Walks the table; a missing transition rejects.
    pub fn classify(&self, sequence: &[Symbol]) -> bool {
        self.classify_with_reason(sequence).0
    }

    /// Walks the table and reports why a sequence was rejected: the first
    /// missing transition (with its position) or the non-accepting final
    /// state. Never fails hard.
    pub fn classify_with_reason(&self, sequence: &[Symbol]) -> (bool, String) {
        if self.names.is_empty() {
            return (false, "empty grammar".to_owned());
        }

        let mut current = self.start;
        for (position, symbol) in sequence.iter().enumerate() {
            match self.transitions[current].get(symbol) {
                Some(&target) => current = target,
                None => {
                    return (
                        false,
                        format!(
                            "no transition on '{}' from state '{}' at position {}",
                            symbol, self.names[current], position
                        ),
                    );
                }
            }
        }

        if self.accepting[current] {
            (true, "accepted".to_owned())
        } else {
            (
                false,
                format!("ended in non-accepting state '{}'", self.names[current]),
            )
        }
    }
}

impl Recognise for GrammarDfa {
    fn recognise(&self, word: &[Symbol]) -> bool {
        self.classify(word)
    }
}

//! Deterministic finite automaton with per-state training counts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{Pta, Recognise};
use crate::{Error, Symbol};

/// A DFA state. The transition function is total over the automaton's
/// alphabet once the sink completion has run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DfaState {
    pub transitions: BTreeMap<Symbol, usize>,
    pub positive_count: usize,
    pub negative_count: usize,
    /// Majority vote: strictly more positive than negative samples.
    pub accepting: bool,
}

/// A complete DFA over the sorted training alphabet, with an optional
/// non-accepting absorbing sink. Immutable after minimisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dfa {
    pub(super) states: Vec<DfaState>,
    pub(super) start: usize,
    pub(super) alphabet: Vec<Symbol>,
    pub(super) sink: Option<usize>,
}

impl Dfa {
    /// Copies a prefix tree into a state table, derives accepting flags by
    /// majority vote and totalises the transition function with a sink.
    ///
    /// Fails with [`Error::InvalidPta`] if any PTA transition target lies
    /// outside the node arena.
    pub fn from_pta(pta: &Pta) -> Result<Self, Error> {
        let nodes = pta.nodes();
        let mut dfa = Dfa {
            states: vec![DfaState::default(); nodes.len()],
            start: pta.start(),
            alphabet: Vec::new(),
            sink: None,
        };

        let mut alphabet = BTreeSet::new();
        for node in nodes {
            let state = &mut dfa.states[node.id];
            state.positive_count = node.positive_count;
            state.negative_count = node.negative_count;
            state.accepting = state.positive_count > state.negative_count;

            for (symbol, &target) in &node.transitions {
                if target >= nodes.len() {
                    return Err(Error::InvalidPta {
                        target,
                        nodes: nodes.len(),
                    });
                }
                state.transitions.insert(symbol.clone(), target);
                alphabet.insert(symbol.clone());
            }
        }

        dfa.alphabet = alphabet.into_iter().collect();
        dfa.ensure_complete_transitions();
        Ok(dfa)
    }

    /// Appends a sink and redirects every missing `(state, symbol)` pair to
    /// it, so that the transition function is total. A DFA with an empty
    /// alphabet has no transitions and needs no sink.
    fn ensure_complete_transitions(&mut self) {
        if self.alphabet.is_empty() {
            self.sink = None;
            return;
        }

        let needs_sink = self.states.iter().any(|state| {
            self.alphabet
                .iter()
                .any(|symbol| !state.transitions.contains_key(symbol))
        });

        if !needs_sink {
            self.sink = None;
            return;
        }

        let sink_id = self.states.len();
        let mut sink = DfaState {
            negative_count: 1,
            ..DfaState::default()
        };
        for symbol in &self.alphabet {
            sink.transitions.insert(symbol.clone(), sink_id);
        }
        self.states.push(sink);
        self.sink = Some(sink_id);

        for state in &mut self.states {
            for symbol in &self.alphabet {
                state
                    .transitions
                    .entry(symbol.clone())
                    .or_insert(sink_id);
            }
        }
    }

    /// Walks the transition table and returns the accepting flag of the
    /// final state. A symbol outside the alphabet leads to the sink if one
    /// exists and rejects otherwise. The empty sequence returns the
    /// accepting flag of the start state.
    pub fn classify(&self, sequence: &[Symbol]) -> bool {
        if self.states.is_empty() || self.start >= self.states.len() {
            return false;
        }

        let mut current = self.start;
        for symbol in sequence {
            match self.states[current].transitions.get(symbol) {
                Some(&target) => current = target,
                None => match self.sink {
                    Some(sink) => current = sink,
                    None => return false,
                },
            }
        }

        self.states[current].accepting
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn sink(&self) -> Option<usize> {
        self.sink
    }

    /// Renders the automaton in DOT. Accepting states are double circles,
    /// the sink is dashed, and every state shows its training counts.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph DFA {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=circle];\n");
        out.push_str("  __start [shape=point];\n");
        let _ = writeln!(out, "  __start -> s{};", self.start);

        for (i, state) in self.states.iter().enumerate() {
            let _ = write!(
                out,
                "  s{} [label=\"s{}\\n+{} -{}\"",
                i, i, state.positive_count, state.negative_count
            );
            if state.accepting {
                out.push_str(", shape=doublecircle");
            }
            if self.sink == Some(i) {
                out.push_str(", style=dashed");
            }
            out.push_str("];\n");
        }

        for (i, state) in self.states.iter().enumerate() {
            for (symbol, target) in &state.transitions {
                let _ = writeln!(out, "  s{} -> s{} [label=\"{}\"];", i, target, symbol);
            }
        }

        out.push_str("}\n");
        out
    }

    /// Renders the formal definition (states, alphabet, start, accepting
    /// set, sink, sorted transition listing) as human-readable text.
    pub fn to_definition(&self) -> String {
        let mut out = String::new();
        out.push_str("DFA Definition\n");
        out.push_str("==============\n");

        out.push_str("States (Q): {");
        for i in 0..self.states.len() {
            if i != 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "s{}", i);
        }
        out.push_str("}\n");

        out.push_str("Alphabet (Σ): {");
        for (i, symbol) in self.alphabet.iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            out.push_str(symbol);
        }
        out.push_str("}\n");

        let _ = writeln!(out, "Start state (q0): s{}", self.start);

        out.push_str("Accepting states (F): {");
        let mut first_accepting = true;
        for (i, state) in self.states.iter().enumerate() {
            if state.accepting {
                if !first_accepting {
                    out.push_str(", ");
                }
                let _ = write!(out, "s{}", i);
                first_accepting = false;
            }
        }
        if first_accepting {
            out.push('∅');
        }
        out.push_str("}\n");

        if let Some(sink) = self.sink {
            let _ = writeln!(out, "Sink state: s{}", sink);
        }

        out.push_str("Transitions (δ):\n");
        for (i, state) in self.states.iter().enumerate() {
            for (symbol, target) in &state.transitions {
                let _ = writeln!(out, "  δ(s{}, {}) = s{}", i, symbol, target);
            }
        }

        out
    }
}

impl Recognise for Dfa {
    fn recognise(&self, word: &[Symbol]) -> bool {
        self.classify(word)
    }
}

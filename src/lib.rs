//! Learns a finite-state classifier from labeled symbol sequences and
//! evaluates unseen traffic against it.
//!
//! The pipeline builds a prefix tree acceptor from labeled samples,
//! derives a complete DFA with majority-vote accepting states, minimises
//! it by partition refinement, and exports the result as a Chomsky normal
//! form grammar. The grammar can be reloaded into a transition table that
//! classifies sequences with a rejection reason. A companion push-down
//! automaton simulator validates stack-disciplined sequences
//! non-deterministically with a best-progress trace.

#![warn(clippy::all)]

pub mod aggregate;
pub mod automata;
pub mod dataset;
pub mod dyck;
mod error;
pub mod evaluator;
pub mod grammars;
pub mod push_down_automaton;
pub mod util;

pub use crate::error::Error;

/// A terminal symbol. Symbols are compared byte-exact; no normalisation.
pub type Symbol = String;

/// Reserved literal for the empty symbol in grammars and PDA transitions.
/// A genuine terminal equal to this string is escaped by quoting.
pub const EPSILON: &str = "ε";

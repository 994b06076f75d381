//! Chomsky normal form encoding of a DFA.

mod from_dfa;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Symbol, EPSILON};

/// One right-hand-side alternative of a CNF production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CnfAlternative {
    /// `ε`, permitted on the start symbol only.
    Epsilon,
    /// A terminal atom, e.g. `A0 -> x`.
    Terminal(Symbol),
    /// A terminal helper followed by a nonterminal, e.g. `S -> T0 A1`.
    Binary { helper: usize, target: String },
}

/// A production with all alternatives of one nonterminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CnfRule {
    pub head: String,
    pub alternatives: Vec<CnfAlternative>,
}

/// A CNF grammar structurally encoding a DFA: terminal helpers `Ti -> a`
/// (one per alphabet symbol) plus binary and unit-terminal productions for
/// the states. Rendered through [`fmt::Display`] in the line-oriented
/// exchange format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CnfGrammar {
    /// Alphabet symbols in sorted order; index `i` names helper `Ti`.
    pub terminals: Vec<Symbol>,
    /// State productions in original-state-id order.
    pub rules: Vec<CnfRule>,
    /// Name of the start nonterminal.
    pub start: String,
}

/// Quotes a terminal for emission when it contains whitespace, a quote or
/// a backslash, escaping `"` and `\`. The reserved `ε` is always quoted so
/// it cannot be mistaken for the empty symbol.
pub fn escape_terminal(symbol: &str) -> String {
    let needs_quoting = symbol == EPSILON
        || symbol
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if !needs_quoting {
        return symbol.to_owned();
    }

    let mut out = String::with_capacity(symbol.len() + 2);
    out.push('"');
    for c in symbol.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl fmt::Display for CnfAlternative {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CnfAlternative::Epsilon => write!(f, "{}", EPSILON),
            CnfAlternative::Terminal(symbol) => write!(f, "{}", escape_terminal(symbol)),
            CnfAlternative::Binary { helper, target } => write!(f, "T{} {}", helper, target),
        }
    }
}

impl fmt::Display for CnfGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Terminals: {{ ")?;
        for (i, terminal) in self.terminals.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", escape_terminal(terminal))?;
        }
        writeln!(f, " }}")?;

        write!(f, "Nonterminals: {{ ")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", rule.head)?;
        }
        for i in 0..self.terminals.len() {
            if !self.rules.is_empty() || i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "T{}", i)?;
        }
        writeln!(f, " }}")?;

        writeln!(f, "Start: {}", self.start)?;

        for (i, terminal) in self.terminals.iter().enumerate() {
            writeln!(f, "T{} -> {}", i, escape_terminal(terminal))?;
        }

        for rule in &self.rules {
            if rule.alternatives.is_empty() {
                // The start state must stay visible to the loader even
                // when it derives nothing (empty alphabet, rejecting
                // start); other states cannot end up without alternatives.
                if rule.head == self.start {
                    writeln!(f, "{} ->", rule.head)?;
                }
                continue;
            }
            write!(f, "{} ->", rule.head)?;
            for (i, alternative) in rule.alternatives.iter().enumerate() {
                if i != 0 {
                    write!(f, " |")?;
                }
                write!(f, " {}", alternative)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

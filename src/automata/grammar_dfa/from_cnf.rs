//! Re-parses a CNF grammar file into a [`GrammarDfa`] transition table.

use std::fs;
use std::path::Path;

use fnv::FnvHashMap;
use log::warn;

use super::{GrammarDfa, ACCEPT_STATE};
use crate::util::parsing::{is_terminal_helper, tokenize_alternative, Token};
use crate::{Error, EPSILON};

enum TerminalAtom {
    Epsilon,
    Helper(String),
    Literal(String),
}

impl GrammarDfa {
    /// Builds the transition table for a CNF grammar.
    ///
    /// Blank lines, `#` comments and header lines without a rule arrow are
    /// ignored. Terminal helper rules (`Ti -> a`) populate the helper
    /// lookup without becoming states. Every other left-hand side becomes a
    /// state; `ε` alternatives mark it accepting and binary alternatives
    /// `Ti N` become a transition on the helper's terminal. A unit-terminal
    /// alternative marks the target of the matching transition accepting,
    /// or routes to the synthetic [`ACCEPT_STATE`] when the head has no
    /// transition on that terminal. A file without any nonterminal rule
    /// yields the empty grammar. Malformed alternatives are logged and
    /// skipped; this never fails.
    pub fn from_cnf_str(grammar: &str) -> GrammarDfa {
        let mut helper_terminals: FnvHashMap<String, String> = FnvHashMap::default();
        let mut terminal_rules: Vec<(String, TerminalAtom)> = Vec::new();
        let mut binary_rules: Vec<(String, Token, String)> = Vec::new();
        let mut nonterminals: Vec<String> = Vec::new();

        for line in grammar.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (lhs, rhs) = match line.split_once("->") {
                Some((lhs, rhs)) => (lhs.trim(), rhs.trim()),
                None => continue,
            };

            if is_terminal_helper(lhs) {
                match tokenize_alternative(rhs).and_then(|tokens| tokens.into_iter().next()) {
                    Some(token) => {
                        helper_terminals.insert(lhs.to_owned(), token.unquoted().to_owned());
                    }
                    None => warn!("skipping malformed terminal helper rule: {}", line),
                }
                continue;
            }

            if !nonterminals.iter().any(|nt| nt == lhs) {
                nonterminals.push(lhs.to_owned());
            }

            for alternative in rhs.split('|') {
                let alternative = alternative.trim();
                if alternative == EPSILON {
                    terminal_rules.push((lhs.to_owned(), TerminalAtom::Epsilon));
                    continue;
                }

                let tokens = match tokenize_alternative(alternative) {
                    Some(tokens) => tokens,
                    None => {
                        warn!("skipping malformed alternative '{}' of {}", alternative, lhs);
                        continue;
                    }
                };

                match tokens.as_slice() {
                    [] => {}
                    [Token::Bare(token)] if is_terminal_helper(token) => {
                        terminal_rules.push((lhs.to_owned(), TerminalAtom::Helper(token.clone())));
                    }
                    [token] => {
                        terminal_rules.push((
                            lhs.to_owned(),
                            TerminalAtom::Literal(token.unquoted().to_owned()),
                        ));
                    }
                    [first, second] => {
                        binary_rules.push((
                            lhs.to_owned(),
                            first.clone(),
                            second.unquoted().to_owned(),
                        ));
                    }
                    _ => {
                        warn!("ignoring alternative of unexpected arity: {}", alternative);
                    }
                }
            }
        }

        // A file with no nonterminal rules stays an empty grammar; the
        // synthetic accept state alone must not become the start state.
        if nonterminals.is_empty() {
            return GrammarDfa::default();
        }

        let mut gdfa = GrammarDfa::default();
        for nonterminal in &nonterminals {
            gdfa.add_state_if_missing(nonterminal);
        }
        gdfa.set_accepting(ACCEPT_STATE);

        for (lhs, first, target) in binary_rules {
            let label = match &first {
                Token::Bare(token) if is_terminal_helper(token) => helper_terminals
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| token.clone()),
                token => token.unquoted().to_owned(),
            };
            gdfa.add_transition(&lhs, &label, &target);
        }

        for (lhs, atom) in terminal_rules {
            match atom {
                TerminalAtom::Epsilon => gdfa.set_accepting(&lhs),
                TerminalAtom::Helper(helper) => match helper_terminals.get(&helper) {
                    Some(terminal) => gdfa.record_terminal_acceptance(&lhs, terminal),
                    None => warn!("unknown terminal helper {} in rule for {}", helper, lhs),
                },
                TerminalAtom::Literal(terminal) => {
                    gdfa.record_terminal_acceptance(&lhs, &terminal)
                }
            }
        }

        if let Some(start) = gdfa.state_index("S") {
            gdfa.start = start;
        } else {
            gdfa.start = 0;
        }

        gdfa
    }

    /// A unit-terminal production `lhs -> a` means: reading `a` in `lhs`
    /// may end an accepted word. When `lhs` already steps somewhere on
    /// `a`, that target is the accepting end; otherwise the production
    /// becomes a transition into the synthetic accept state.
    fn record_terminal_acceptance(&mut self, lhs: &str, terminal: &str) {
        let from = self.add_state_if_missing(lhs);
        match self.transitions[from].get(terminal).copied() {
            Some(target) => self.accepting[target] = true,
            None => self.add_transition(lhs, terminal, ACCEPT_STATE),
        }
    }
}

/// Reads and parses a CNF grammar file.
pub fn load_cnf<P: AsRef<Path>>(path: P) -> Result<GrammarDfa, Error> {
    let grammar = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::file_unavailable(path.as_ref(), e))?;
    Ok(GrammarDfa::from_cnf_str(&grammar))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn loads_binary_and_terminal_rules() {
        let gdfa = GrammarDfa::from_cnf_str(
            "# single accepted word\n\
             Terminals: { x }\n\
             Nonterminals: { S, A0, A1 }\n\
             Start: S\n\
             T0 -> x\n\
             S -> T0 A0 | x\n\
             A0 -> T0 A1\n\
             A1 -> T0 A1\n",
        );

        assert_eq!(gdfa.names()[gdfa.start()], "S");
        assert!(gdfa.classify(&word(&["x"])));
        assert!(!gdfa.classify(&word(&["x", "x"])));
        assert!(!gdfa.classify(&[]));
    }

    #[test]
    fn accepting_states_passed_through_keep_their_continuations() {
        // accepts exactly "x" and "x x"
        let gdfa = GrammarDfa::from_cnf_str(
            "T0 -> x\n\
             S -> T0 A0 | x\n\
             A0 -> T0 A1 | x\n\
             A1 -> T0 A2\n\
             A2 -> T0 A2\n",
        );
        assert!(gdfa.classify(&word(&["x"])));
        assert!(gdfa.classify(&word(&["x", "x"])));
        assert!(!gdfa.classify(&word(&["x", "x", "x"])));
    }

    #[test]
    fn epsilon_marks_the_head_accepting() {
        let gdfa = GrammarDfa::from_cnf_str("S -> ε\n");
        assert!(gdfa.classify(&[]));
    }

    #[test]
    fn quoted_terminals_survive_loading() {
        let gdfa = GrammarDfa::from_cnf_str(
            "T0 -> \"hello world\"\n\
             S -> T0 A0 | \"hello world\"\n\
             A0 -> T0 A0\n",
        );
        assert!(gdfa.classify(&word(&["hello world"])));
    }

    #[test]
    fn lone_terminal_production_routes_to_accept() {
        let gdfa = GrammarDfa::from_cnf_str("S -> x\n");
        assert!(gdfa.classify(&word(&["x"])));
        assert!(!gdfa.classify(&word(&["x", "x"])));
        let id = gdfa.state_index(ACCEPT_STATE).unwrap();
        assert!(gdfa.is_accepting(id));
    }

    #[test]
    fn unknown_helper_in_binary_rule_falls_back_to_its_name() {
        let gdfa = GrammarDfa::from_cnf_str("S -> T9 A0\n");
        let (ok, _) = gdfa.classify_with_reason(&word(&["T9"]));
        // T9 has no terminal mapping; its literal name labels the edge.
        assert!(!ok);
        assert!(gdfa.state_index("A0").is_some());
    }

    #[test]
    fn start_falls_back_to_first_nonterminal() {
        let gdfa = GrammarDfa::from_cnf_str("A0 -> x\nA1 -> y\n");
        assert_eq!(gdfa.names()[gdfa.start()], "A0");
    }

    #[test]
    fn accept_state_exists_alongside_real_productions() {
        let gdfa = GrammarDfa::from_cnf_str("S -> x\n");
        let id = gdfa.state_index(ACCEPT_STATE).unwrap();
        assert!(gdfa.is_accepting(id));
    }

    #[test]
    fn file_without_productions_is_an_empty_grammar() {
        for degenerate in ["", "# comment only\n", "Terminals: { }\nStart: S\n"] {
            let gdfa = GrammarDfa::from_cnf_str(degenerate);
            assert_eq!(gdfa.state_count(), 0);
            assert_eq!(
                gdfa.classify_with_reason(&[]),
                (false, "empty grammar".to_owned())
            );
        }
    }

    #[test]
    fn empty_start_rule_materialises_a_rejecting_start() {
        let gdfa = GrammarDfa::from_cnf_str("S ->\n");
        assert_eq!(gdfa.names()[gdfa.start()], "S");
        let (ok, reason) = gdfa.classify_with_reason(&[]);
        assert!(!ok);
        assert_eq!(reason, "ended in non-accepting state 'S'");
    }

    #[test]
    fn malformed_lines_are_tolerated() {
        let gdfa = GrammarDfa::from_cnf_str(
            "not a rule line\n\
             S -> T0 A0 A1\n\
             S -> x\n",
        );
        assert!(gdfa.classify(&word(&["x"])));
    }
}

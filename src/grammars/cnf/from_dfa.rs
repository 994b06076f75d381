//! Structural encoding of a DFA as a CNF grammar.

use super::{CnfAlternative, CnfGrammar, CnfRule};
use crate::automata::Dfa;

impl From<&Dfa> for CnfGrammar {
    /// Encodes the automaton: the start state becomes `S` and the
    /// remaining states `A0, A1, …` in ascending id order; every
    /// transition `X --a--> Y` becomes the binary alternative `Ti Y` on
    /// `X`, plus the unit-terminal alternative `a` when `Y` accepts; `S`
    /// gains `ε` iff the start state accepts. Alternatives are
    /// deduplicated and kept in alphabet order.
    fn from(dfa: &Dfa) -> Self {
        let mut names = Vec::with_capacity(dfa.state_count());
        let mut next = 0usize;
        for id in 0..dfa.state_count() {
            if id == dfa.start() {
                names.push("S".to_owned());
            } else {
                names.push(format!("A{}", next));
                next += 1;
            }
        }

        let terminals: Vec<_> = dfa.alphabet().to_vec();
        let mut rules = Vec::with_capacity(dfa.state_count());

        for (id, state) in dfa.states().iter().enumerate() {
            let mut alternatives: Vec<CnfAlternative> = Vec::new();
            let mut push_unique = |alternative: CnfAlternative| {
                if !alternatives.contains(&alternative) {
                    alternatives.push(alternative);
                }
            };

            if id == dfa.start() && state.accepting {
                push_unique(CnfAlternative::Epsilon);
            }

            for (helper, symbol) in terminals.iter().enumerate() {
                if let Some(&target) = state.transitions.get(symbol) {
                    push_unique(CnfAlternative::Binary {
                        helper,
                        target: names[target].clone(),
                    });
                    if dfa.states()[target].accepting {
                        push_unique(CnfAlternative::Terminal(symbol.clone()));
                    }
                }
            }

            rules.push(CnfRule {
                head: names[id].clone(),
                alternatives,
            });
        }

        CnfGrammar {
            terminals,
            rules,
            start: "S".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::Pta;
    use crate::dataset::LabeledSequence;

    fn sample(id: &str, symbols: &[&str], label: bool) -> LabeledSequence {
        LabeledSequence {
            id: id.to_owned(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            label,
            ..LabeledSequence::default()
        }
    }

    fn minimised(samples: &[LabeledSequence]) -> Dfa {
        Dfa::from_pta(&Pta::from_samples(samples)).unwrap().minimise()
    }

    #[test]
    fn single_word_grammar_has_helper_binary_and_terminal_productions() {
        let dfa = minimised(&[sample("s1", &["x"], true)]);
        let text = CnfGrammar::from(&dfa).to_string();

        assert!(text.contains("T0 -> x"));
        // a binary production of two nonterminals somewhere
        assert!(text
            .lines()
            .any(|l| l.contains("->") && l.split("->").nth(1).unwrap().contains("T0 A")));
        // the start side carries the unit-terminal alternative
        let start_rule = text.lines().find(|l| l.starts_with("S ->")).unwrap();
        assert!(start_rule.contains("| x") || start_rule.ends_with("-> x"));
    }

    #[test]
    fn epsilon_appears_iff_start_accepts() {
        let accepting = minimised(&[sample("empty", &[], true)]);
        assert!(CnfGrammar::from(&accepting).to_string().contains("S -> ε"));

        let rejecting = minimised(&[sample("s1", &["x"], true)]);
        assert!(!CnfGrammar::from(&rejecting).to_string().contains("S -> ε"));
    }

    #[test]
    fn quoted_terminals_in_terminals_line() {
        let dfa = minimised(&[
            sample("t1", &["hello world"], true),
            sample("t2", &["simple"], false),
        ]);
        let text = CnfGrammar::from(&dfa).to_string();
        assert!(text.contains("\"hello world\""));
        assert!(text.contains("simple"));
    }

    #[test]
    fn state_names_skip_the_start_state() {
        let dfa = minimised(&[
            sample("s1", &["a", "b"], true),
            sample("s2", &["d"], true),
        ]);
        let grammar = CnfGrammar::from(&dfa);
        assert_eq!(grammar.start, "S");
        let heads: Vec<_> = grammar.rules.iter().map(|r| r.head.as_str()).collect();
        assert_eq!(heads.iter().filter(|h| **h == "S").count(), 1);
        assert_eq!(heads.len(), dfa.state_count());
    }
}

//! Loads a DFA rendered in DOT back into a [`GrammarDfa`].

use std::fs;
use std::path::Path;

use super::GrammarDfa;
use crate::util::dot_label;
use crate::Error;

/// Scans a DOT digraph for node and edge lines.
///
/// `__start -> X;` marks the start state, `doublecircle` nodes are
/// accepting, and every labeled edge becomes a transition on its label.
/// Unrecognised lines are ignored.
pub fn parse_dfa_dot(dot: &str) -> GrammarDfa {
    let mut gdfa = GrammarDfa::default();
    let mut start_node = String::new();

    for line in dot.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("__start ->") {
            let end = rest
                .find(|c| c == ';' || c == '[')
                .unwrap_or(rest.len());
            start_node = rest[..end].trim().to_owned();
        } else if line.contains("->") {
            if line.starts_with("__start") {
                continue;
            }
            let (arrow, bracket, label) = match (
                line.find("->"),
                line.find('['),
                dot_label(line),
            ) {
                (Some(arrow), Some(bracket), Some(label)) => (arrow, bracket, label),
                _ => continue,
            };
            let source = line[..arrow].trim();
            let target = line[arrow + 2..bracket].trim();
            gdfa.add_transition(source, label, target);
        } else if line.contains('[') && line.contains("label=") {
            if line.starts_with("__start") || line.starts_with("node [") {
                continue;
            }
            let bracket = match line.find('[') {
                Some(bracket) => bracket,
                None => continue,
            };
            let id = line[..bracket].trim();
            if line.contains("doublecircle") {
                gdfa.set_accepting(id);
            } else {
                gdfa.add_state_if_missing(id);
            }
        }
    }

    if !start_node.is_empty() {
        gdfa.set_start(&start_node);
    } else if gdfa.state_index("S").is_some() {
        gdfa.set_start("S");
    }

    gdfa
}

/// Reads and parses a DFA DOT file.
pub fn load_dfa_dot<P: AsRef<Path>>(path: P) -> Result<GrammarDfa, Error> {
    let dot = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::file_unavailable(path.as_ref(), e))?;
    Ok(parse_dfa_dot(&dot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_states_edges_and_start() {
        let dot = "\
digraph DFA {
  rankdir=LR;
  node [shape=circle];
  __start [shape=point];
  __start -> s0;
  s0 [label=\"s0\\n+0 -0\"];
  s1 [label=\"s1\\n+1 -0\", shape=doublecircle];
  s2 [label=\"s2\\n+0 -1\", style=dashed];
  s0 -> s1 [label=\"x\"];
  s0 -> s2 [label=\"y\"];
  s1 -> s2 [label=\"x\"];
}
";
        let gdfa = parse_dfa_dot(dot);
        assert_eq!(gdfa.names()[gdfa.start()], "s0");
        assert!(gdfa.classify(&["x".to_owned()]));
        assert!(!gdfa.classify(&["y".to_owned()]));
        assert!(!gdfa.classify(&["x".to_owned(), "x".to_owned()]));
    }

    #[test]
    fn dfa_dot_output_reloads() {
        use crate::automata::{Dfa, Pta};
        use crate::dataset::LabeledSequence;

        let samples = vec![
            LabeledSequence {
                id: "m1".to_owned(),
                symbols: vec!["x".to_owned()],
                label: true,
                ..LabeledSequence::default()
            },
            LabeledSequence {
                id: "b1".to_owned(),
                symbols: vec!["y".to_owned()],
                label: false,
                ..LabeledSequence::default()
            },
        ];
        let dfa = Dfa::from_pta(&Pta::from_samples(&samples)).unwrap().minimise();
        let gdfa = parse_dfa_dot(&dfa.to_dot());

        for word in [vec!["x".to_owned()], vec!["y".to_owned()], vec![]] {
            assert_eq!(dfa.classify(&word), gdfa.classify(&word));
        }
    }
}

//! Loads a push-down automaton from its DOT rendering.

use std::fs;
use std::path::Path;

use super::{Pda, PdaTransition};
use crate::util::dot_label;
use crate::{Error, EPSILON};

/// Parses an edge label of the form `input, pop -> push…`. A label without
/// the comma/arrow structure is taken as a bare input symbol with no stack
/// effect; a push part of `ε` pushes nothing.
fn parse_edge_label(label: &str) -> (String, String, Vec<String>) {
    let structured = label
        .split_once(',')
        .and_then(|(input, rest)| rest.split_once("->").map(|(pop, push)| (input, pop, push)));

    match structured {
        Some((input, pop, push)) => {
            let push = push.trim();
            let push_symbols = if push == EPSILON {
                Vec::new()
            } else {
                push.split_whitespace().map(str::to_owned).collect()
            };
            (input.trim().to_owned(), pop.trim().to_owned(), push_symbols)
        }
        None => (label.trim().to_owned(), EPSILON.to_owned(), Vec::new()),
    }
}

/// Scans a DOT digraph for PDA states and transitions.
///
/// `doublecircle` nodes are accepting. A plain `__start -> X;` line marks
/// `X` as the start state; a *labeled* `__start` edge instead materialises
/// a synthetic `__start` state whose bootstrap transition carries the
/// label (used to push an initial bottom-of-stack marker such as `Z0`).
pub fn parse_pda_dot(dot: &str) -> Pda {
    let mut pda = Pda::new();
    let mut start_node = String::new();

    for line in dot.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("__start ->") {
            let end = rest
                .find(|c| c == '[' || c == ';')
                .unwrap_or(rest.len());
            let target = rest[..end].trim().to_owned();
            start_node = target.clone();

            if let Some(label) = dot_label(line) {
                let source = pda.get_or_add_state("__start");
                pda.set_start(source);
                let (input, pop, push) = parse_edge_label(label);
                let target = pda.get_or_add_state(&target);
                pda.add_transition(
                    source,
                    PdaTransition {
                        input,
                        pop,
                        push,
                        target,
                    },
                );
            }
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
            let (input, pop, push) = parse_edge_label(label);
            let source = pda.get_or_add_state(source);
            let target = pda.get_or_add_state(target);
            pda.add_transition(
                source,
                PdaTransition {
                    input,
                    pop,
                    push,
                    target,
                },
            );
        } else if line.contains('[') && line.contains("label=") {
            if line.starts_with("__start") || line.starts_with("node [") {
                continue;
            }
            let bracket = match line.find('[') {
                Some(bracket) => bracket,
                None => continue,
            };
            let id = line[..bracket].trim();
            let id = pda.get_or_add_state(id);
            if line.contains("doublecircle") {
                pda.mark_accepting(id);
            }
        }
    }

    // A bootstrap `__start` state keeps the start role for itself.
    if !start_node.is_empty() {
        let keeps_bootstrap = pda
            .states()
            .get(pda.start())
            .map(|s| s.name == "__start")
            .unwrap_or(false);
        if !keeps_bootstrap {
            if let Some(id) = pda.state_index(&start_node) {
                pda.set_start(id);
            }
        }
    }

    pda
}

/// Reads and parses a PDA DOT file.
pub fn load_pda_dot<P: AsRef<Path>>(path: P) -> Result<Pda, Error> {
    let dot = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::file_unavailable(path.as_ref(), e))?;
    Ok(parse_pda_dot(&dot))
}

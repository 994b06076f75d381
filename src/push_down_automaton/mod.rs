//! Non-deterministic push-down automaton with a traced simulator.

mod from_dot;

pub use self::from_dot::{load_pda_dot, parse_pda_dot};

use std::collections::VecDeque;
use std::fmt;
use std::fmt::Write as _;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::{Symbol, EPSILON};

/// Default bound on dequeued configurations per `simulate` call, so that
/// pathological ε-cycles terminate.
pub const DEFAULT_STEP_CAP: usize = 50_000;

/// One transition of a PDA state. `ε` in the input or pop position means
/// "do not consume"/"do not pop"; an empty push list pushes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdaTransition {
    pub input: Symbol,
    pub pop: Symbol,
    pub push: Vec<Symbol>,
    pub target: usize,
}

/// A named control state with its transitions in declaration order.
/// The simulator explores transitions in exactly this order, which fixes
/// the returned trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdaState {
    pub name: String,
    pub accepting: bool,
    pub transitions: Vec<PdaTransition>,
}

/// The stack effect of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackOp {
    Push,
    Pop,
    NoOp,
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StackOp::Push => write!(f, "PUSH"),
            StackOp::Pop => write!(f, "POP"),
            StackOp::NoOp => write!(f, "NO_OP"),
        }
    }
}

/// Record of one transition taken during simulation: the stack operation,
/// the consumed symbol (or `ε`), the stack after the move, and the names
/// of the source and target control states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdaStep {
    pub op: StackOp,
    pub symbol: Symbol,
    pub stack_after: Vec<Symbol>,
    pub source: String,
    pub target: String,
}

/// Result of a simulation: on success the trace of the accepting run, on
/// failure the trace of the configuration that consumed the most input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub ok: bool,
    pub trace: Vec<PdaStep>,
}

/// A configuration of the breadth-first search. Lives only inside one
/// `simulate` call; the stack top is the last element.
#[derive(Debug, Clone)]
struct Configuration {
    state: usize,
    position: usize,
    stack: Vec<Symbol>,
    trace: Vec<PdaStep>,
}

/// A push-down automaton accepting by accepting control state (a machine
/// requiring an empty stack encodes that with a dedicated accepting state
/// reached on the final pop). Immutable after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pda {
    states: Vec<PdaState>,
    start: usize,
    index: FnvHashMap<String, usize>,
}

impl Pda {
    pub fn new() -> Self {
        Pda::default()
    }

    pub fn get_or_add_state(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.states.len();
        self.states.push(PdaState {
            name: name.to_owned(),
            accepting: false,
            transitions: Vec::new(),
        });
        self.index.insert(name.to_owned(), id);
        id
    }

    pub fn set_start(&mut self, id: usize) {
        self.start = id;
    }

    pub fn mark_accepting(&mut self, id: usize) {
        self.states[id].accepting = true;
    }

    pub fn add_transition(&mut self, from: usize, transition: PdaTransition) {
        self.states[from].transitions.push(transition);
    }

    pub fn states(&self) -> &[PdaState] {
        &self.states
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Simulates `input` with the default step cap.
    pub fn simulate(&self, input: &[Symbol]) -> Simulation {
        self.simulate_with_cap(input, DEFAULT_STEP_CAP)
    }

    /// Breadth-first search over configurations, starting from the start
    /// state with an empty stack. Returns the first accepting run found,
    /// or `ok = false` with the best-progress trace when the queue drains
    /// or `step_cap` configurations have been expanded.
    pub fn simulate_with_cap(&self, input: &[Symbol], step_cap: usize) -> Simulation {
        if self.states.is_empty() {
            return Simulation {
                ok: false,
                trace: Vec::new(),
            };
        }

        let mut queue: VecDeque<Configuration> = VecDeque::new();
        queue.push_back(Configuration {
            state: self.start,
            position: 0,
            stack: Vec::new(),
            trace: Vec::new(),
        });

        let mut steps = 0usize;
        let mut best_progress = 0usize;
        let mut best_trace: Vec<PdaStep> = Vec::new();

        while let Some(current) = queue.pop_front() {
            steps += 1;
            if steps > step_cap {
                break;
            }

            if current.position > best_progress {
                best_progress = current.position;
                best_trace = current.trace.clone();
            }

            let state = &self.states[current.state];
            if current.position == input.len() && state.accepting {
                return Simulation {
                    ok: true,
                    trace: current.trace,
                };
            }

            for transition in &state.transitions {
                let consumes = if transition.input == EPSILON {
                    false
                } else if input.get(current.position) == Some(&transition.input) {
                    true
                } else {
                    continue;
                };

                let pops = if transition.pop == EPSILON {
                    false
                } else if current.stack.last() == Some(&transition.pop) {
                    true
                } else {
                    continue;
                };

                let mut next = current.clone();
                next.state = transition.target;
                if consumes {
                    next.position += 1;
                }
                if pops {
                    next.stack.pop();
                }
                // Pushed in reverse so the first listed symbol is the new top.
                for symbol in transition.push.iter().rev() {
                    next.stack.push(symbol.clone());
                }

                let op = if !transition.push.is_empty() {
                    StackOp::Push
                } else if pops {
                    StackOp::Pop
                } else {
                    StackOp::NoOp
                };

                next.trace.push(PdaStep {
                    op,
                    symbol: if consumes {
                        input[current.position].clone()
                    } else {
                        EPSILON.to_owned()
                    },
                    stack_after: next.stack.clone(),
                    source: state.name.clone(),
                    target: self.states[transition.target].name.clone(),
                });

                queue.push_back(next);
            }
        }

        Simulation {
            ok: false,
            trace: best_trace,
        }
    }

    /// Renders the automaton in DOT. Edge labels carry the triple
    /// `input, pop -> push…`; a state named `__start` keeps its bootstrap
    /// edges instead of the plain start marker.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph PDA {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=circle];\n");
        out.push_str("  __start [shape=point];\n");

        let has_bootstrap = self
            .states
            .get(self.start)
            .map(|s| s.name == "__start")
            .unwrap_or(false);
        if !has_bootstrap {
            if let Some(start) = self.states.get(self.start) {
                let _ = writeln!(out, "  __start -> {};", start.name);
            }
        }

        for state in &self.states {
            if state.name == "__start" {
                continue;
            }
            let _ = write!(out, "  {} [label=\"{}\"", state.name, state.name);
            if state.accepting {
                out.push_str(", shape=doublecircle");
            }
            out.push_str("];\n");
        }

        for state in &self.states {
            for transition in &state.transitions {
                let push = if transition.push.is_empty() {
                    EPSILON.to_owned()
                } else {
                    transition.push.join(" ")
                };
                let _ = writeln!(
                    out,
                    "  {} -> {} [label=\"{}, {} -> {}\"];",
                    state.name,
                    self.states[transition.target].name,
                    transition.input,
                    transition.pop,
                    push
                );
            }
        }

        out.push_str("}\n");
        out
    }
}

//! Partition-refinement minimisation of a complete DFA.

use std::collections::VecDeque;

use super::dfa::{Dfa, DfaState};
use crate::Symbol;

impl Dfa {
    /// Returns an equivalent DFA with a minimum number of states, computed
    /// by Hopcroft-style partition refinement.
    ///
    /// Blocks are kept in creation order and each block is represented by
    /// its first member, so the output numbering is deterministic given the
    /// sorted alphabet. Each output state sums the training counts of its
    /// block and re-derives its accepting flag by majority vote; the start
    /// and sink states map to the blocks containing the originals.
    pub fn minimise(&self) -> Dfa {
        if self.states.is_empty() {
            return self.clone();
        }

        let n = self.states.len();
        let mut partitions: Vec<Vec<usize>> = Vec::new();

        let accepting: Vec<usize> = (0..n).filter(|&i| self.states[i].accepting).collect();
        let rejecting: Vec<usize> = (0..n).filter(|&i| !self.states[i].accepting).collect();

        let mut state_partition = vec![0usize; n];
        for block in [accepting, rejecting].iter() {
            if block.is_empty() {
                continue;
            }
            let index = partitions.len();
            for &state in block {
                state_partition[state] = index;
            }
            partitions.push(block.clone());
        }

        let mut work: VecDeque<(usize, Symbol)> = VecDeque::new();
        for index in 0..partitions.len() {
            for symbol in &self.alphabet {
                work.push_back((index, symbol.clone()));
            }
        }

        let mut involved = vec![false; n];
        let mut touched: Vec<usize> = Vec::with_capacity(n);

        while let Some((part_index, symbol)) = work.pop_front() {
            // Mark states whose transition on `symbol` leads into the block.
            for s in 0..n {
                if let Some(&target) = self.states[s].transitions.get(&symbol) {
                    if state_partition[target] == part_index && !involved[s] {
                        involved[s] = true;
                        touched.push(s);
                    }
                }
            }

            let mut index = 0;
            while index < partitions.len() {
                let (subset, remainder): (Vec<usize>, Vec<usize>) =
                    partitions[index].iter().partition(|&&s| involved[s]);

                if !subset.is_empty() && !remainder.is_empty() {
                    let new_index = partitions.len();
                    for &state in &remainder {
                        state_partition[state] = new_index;
                    }
                    partitions[index] = subset;
                    partitions.push(remainder);

                    for symbol in &self.alphabet {
                        work.push_back((index, symbol.clone()));
                        work.push_back((new_index, symbol.clone()));
                    }
                }
                index += 1;
            }

            for &state in &touched {
                involved[state] = false;
            }
            touched.clear();
        }

        let mut minimised = Dfa {
            states: Vec::with_capacity(partitions.len()),
            start: state_partition[self.start],
            alphabet: self.alphabet.clone(),
            sink: self.sink.map(|sink| state_partition[sink]),
        };

        for block in &partitions {
            let mut state = DfaState::default();
            for &member in block {
                state.positive_count += self.states[member].positive_count;
                state.negative_count += self.states[member].negative_count;
            }
            state.accepting = state.positive_count > state.negative_count;

            let representative = block[0];
            for (symbol, &target) in &self.states[representative].transitions {
                state
                    .transitions
                    .insert(symbol.clone(), state_partition[target]);
            }

            minimised.states.push(state);
        }

        minimised
    }
}

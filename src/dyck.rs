//! Linear validator for stack-balanced symbol sequences.

use thiserror::Error;

use crate::Symbol;

/// Violations of the bracket discipline over one open/close token pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("pop without matching push at position {position}")]
    PopWithoutPush { position: usize },
    #[error("final stack not empty ({unmatched} unmatched pushes)")]
    UnmatchedPushes { unmatched: usize },
}

/// Recognises `word` as balanced over the designated `open` and `close`
/// tokens: `open` pushes, `close` pops, and every other symbol is ignored.
/// A pop on an empty stack reports its position; leftover pushes at the
/// end report their count.
pub fn validate_balance(word: &[Symbol], open: &str, close: &str) -> Result<(), BalanceError> {
    let mut depth = 0usize;

    for (position, symbol) in word.iter().enumerate() {
        if symbol == open {
            depth += 1;
        } else if symbol == close {
            if depth == 0 {
                return Err(BalanceError::PopWithoutPush { position });
            }
            depth -= 1;
        }
    }

    if depth != 0 {
        return Err(BalanceError::UnmatchedPushes { unmatched: depth });
    }
    Ok(())
}

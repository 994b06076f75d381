use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of builders and loaders. Runtime classifiers never fail
/// hard; they return a boolean or a structured rejection reason instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A PTA node references a child outside the node arena.
    #[error("PTA transition target {target} out of bounds ({nodes} nodes)")]
    InvalidPta { target: usize, nodes: usize },

    /// A dataset header lacks a column the loader cannot work without.
    #[error("dataset missing required column '{0}'")]
    MissingColumn(String),

    /// The train/test ratio must lie strictly between 0 and 1.
    #[error("train ratio {0} out of range (must be strictly between 0 and 1)")]
    InvalidTrainRatio(f64),

    /// An aggregation mode outside `orig`, `resp`, `union`, `uid`.
    #[error("unknown aggregate mode '{0}'")]
    InvalidAggregateMode(String),

    /// A file could not be opened for reading or writing.
    #[error("failed to open {path}")]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn file_unavailable<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::FileUnavailable {
            path: path.into(),
            source,
        }
    }
}

//! Labeled training samples and the loaders that produce them.

mod iot;
mod malware;

pub use self::iot::{load_iot_csv, parse_iot};
pub use self::malware::{load_malware_csv, parse_malware};

use fnv::FnvHashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{Error, Symbol};

/// One training or evaluation sample: a sequence over the finite alphabet
/// with its supervised label and whatever provenance the source row carried.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabeledSequence {
    /// Sample identifier (hash, flow id, synthetic line id).
    pub id: String,
    /// Originating host (`id.orig_h`) when available.
    pub host: String,
    /// Responding host (`id.resp_h`) when available.
    pub resp_host: String,
    /// Connection/session uid when available.
    pub uid: String,
    /// Timestamp in seconds since epoch when available.
    pub ts: f64,
    /// Sequence over the finite alphabet.
    pub symbols: Vec<Symbol>,
    /// `true` = malicious, `false` = benign.
    pub label: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    pub train: Vec<LabeledSequence>,
    pub test: Vec<LabeledSequence>,
}

/// Shuffles `data` with a seeded generator and splits it so that both
/// partitions are non-empty whenever `data` has at least two samples.
pub fn train_test_split(
    data: &[LabeledSequence],
    train_ratio: f64,
    seed: u64,
) -> Result<DatasetSplit, Error> {
    if train_ratio <= 0.0 || train_ratio >= 1.0 {
        return Err(Error::InvalidTrainRatio(train_ratio));
    }
    if data.is_empty() {
        return Ok(DatasetSplit::default());
    }

    let mut shuffled = data.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let mut train_count = (shuffled.len() as f64 * train_ratio) as usize;
    if train_count == 0 {
        train_count = 1;
    } else if train_count == shuffled.len() {
        train_count = shuffled.len() - 1;
    }

    let test = shuffled.split_off(train_count);
    Ok(DatasetSplit {
        train: shuffled,
        test,
    })
}

/// Splits a delimited line into trimmed fields. Fields may be enclosed in
/// double quotes; inside quotes the delimiter is literal and `""` denotes
/// one quote character.
pub(crate) fn parse_delimited_line(line: &str, delimiter: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            result.push(current.trim().to_owned());
            current.clear();
        } else {
            current.push(ch);
        }
    }

    result.push(current.trim().to_owned());
    result
}

pub(crate) fn header_index(header: &[String]) -> FnvHashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// Normalises a label field. `1`, `true` and `malware` are malicious,
/// `0`, `false` and `benign` are benign; anything containing `malic`
/// (e.g. `Malicious`, `PartOfAHorizontalPortScan-Malicious`) is malicious.
pub(crate) fn is_true_label(value: &str) -> bool {
    let lowercase = value.to_lowercase();
    if lowercase == "1" || lowercase == "true" || lowercase == "malware" {
        return true;
    }
    if lowercase == "0" || lowercase == "false" || lowercase == "benign" {
        return false;
    }
    lowercase.contains("malic")
}

//! Loader for malware behaviour CSVs (`hash`, `malware`, `t_0`…`t_n`).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{header_index, is_true_label, parse_delimited_line, LabeledSequence};
use crate::Error;

/// Reads labeled malware rows from `reader`.
///
/// `hash` provides the sample id and `malware` the label; every `t_<n>`
/// column contributes its non-empty value as a symbol, in ascending column
/// order. Samples whose sequence ends up empty are dropped.
pub fn parse_malware<R: BufRead>(reader: R) -> Result<Vec<LabeledSequence>, Error> {
    let mut lines = reader.lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };

    let header = parse_delimited_line(&header_line, ',');
    let index = header_index(&header);

    let id_col = *index
        .get("hash")
        .ok_or_else(|| Error::MissingColumn("hash".to_owned()))?;
    let label_col = *index
        .get("malware")
        .ok_or_else(|| Error::MissingColumn("malware".to_owned()))?;

    let mut sequence_columns: Vec<usize> = index
        .iter()
        .filter(|(name, _)| name.len() > 2 && name.starts_with("t_"))
        .map(|(_, &col)| col)
        .collect();
    sequence_columns.sort_unstable();

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let tokens = parse_delimited_line(&line, ',');
        if tokens.len() <= label_col || tokens.len() <= id_col {
            continue;
        }

        let mut sample = LabeledSequence {
            id: tokens[id_col].clone(),
            label: is_true_label(&tokens[label_col]),
            ..LabeledSequence::default()
        };

        for &col in &sequence_columns {
            if let Some(value) = tokens.get(col) {
                if !value.is_empty() {
                    sample.symbols.push(value.clone());
                }
            }
        }

        if !sample.symbols.is_empty() {
            samples.push(sample);
        }
    }

    Ok(samples)
}

/// Reads labeled malware rows from the file at `path`.
pub fn load_malware_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledSequence>, Error> {
    let file = File::open(path.as_ref())
        .map_err(|e| Error::file_unavailable(path.as_ref(), e))?;
    parse_malware(BufReader::new(file))
}

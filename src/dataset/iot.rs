//! Loader for labeled IoT connection logs (Zeek-style `conn.log` exports).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{header_index, is_true_label, parse_delimited_line, LabeledSequence};
use crate::Error;

/// Reads labeled IoT flow rows from `reader`.
///
/// The header is the first non-comment, non-empty line; the delimiter is
/// `|` if the header contains one, `,` otherwise. Each row contributes one
/// sample whose symbols are built from the non-empty `proto`, `conn_state`
/// and `service` columns (in that order); a row yielding no symbol gets the
/// `symbol=unknown` sentinel. Provenance columns (`id.orig_h`, `id.resp_h`,
/// `uid`, `ts`) are copied through without entering the alphabet.
pub fn parse_iot<R: BufRead>(reader: R) -> Result<Vec<LabeledSequence>, Error> {
    let mut lines = reader.lines();

    let mut header_line = String::new();
    let mut line_number = 0usize;
    for line in &mut lines {
        let line = line?;
        line_number += 1;
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        header_line = line;
        break;
    }

    if header_line.is_empty() {
        return Ok(Vec::new());
    }

    let delimiter = if header_line.contains('|') { '|' } else { ',' };
    let header = parse_delimited_line(&header_line, delimiter);
    let index = header_index(&header);

    let label_col = *index
        .get("label")
        .ok_or_else(|| Error::MissingColumn("label".to_owned()))?;
    let proto_col = index.get("proto").copied();
    let conn_state_col = index.get("conn_state").copied();
    let service_col = index.get("service").copied();
    let orig_host_col = index.get("id.orig_h").copied();
    let resp_host_col = index.get("id.resp_h").copied();
    let uid_col = index.get("uid").copied();
    let ts_col = index.get("ts").copied();

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        line_number += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens = parse_delimited_line(&line, delimiter);
        if tokens.len() <= label_col {
            continue;
        }

        let mut sample = LabeledSequence {
            id: format!("iot_line_{}", line_number),
            label: is_true_label(&tokens[label_col]),
            ..LabeledSequence::default()
        };

        sample.host = field(&tokens, orig_host_col).to_owned();
        sample.resp_host = field(&tokens, resp_host_col).to_owned();
        sample.uid = field(&tokens, uid_col).to_owned();
        sample.ts = field(&tokens, ts_col).parse().unwrap_or(0.0);

        let mut add_symbol = |column: Option<usize>, prefix: &str| {
            if let Some(value) = column.and_then(|c| tokens.get(c)) {
                if !value.is_empty() && value != "-" {
                    sample.symbols.push(format!("{}{}", prefix, value));
                }
            }
        };

        add_symbol(proto_col, "proto=");
        add_symbol(conn_state_col, "state=");
        add_symbol(service_col, "service=");

        if sample.symbols.is_empty() {
            sample.symbols.push("symbol=unknown".to_owned());
        }

        samples.push(sample);
    }

    Ok(samples)
}

fn field<'a>(tokens: &'a [String], column: Option<usize>) -> &'a str {
    column
        .and_then(|c| tokens.get(c))
        .map(String::as_str)
        .unwrap_or("")
}

/// Reads labeled IoT flow rows from the file at `path`.
pub fn load_iot_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledSequence>, Error> {
    let file = File::open(path.as_ref())
        .map_err(|e| Error::file_unavailable(path.as_ref(), e))?;
    parse_iot(BufReader::new(file))
}

//! Per-host aggregation of classified samples for block/allow decisions.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::automata::GrammarDfa;
use crate::dataset::LabeledSequence;
use crate::dyck::{validate_balance, BalanceError};
use crate::{Error, Symbol};

/// Connection-state token that opens a pending handshake.
pub const OPEN_TOKEN: &str = "state=S0";
/// Connection-state token that closes a pending handshake.
pub const CLOSE_TOKEN: &str = "state=SF";

/// Which provenance field keys a sample to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// Key by originating host (default).
    Orig,
    /// Key by responding host.
    Resp,
    /// Key by both hosts, associating the sample with each.
    Union,
    /// Key by connection uid.
    Uid,
}

impl FromStr for AggregateMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orig" => Ok(AggregateMode::Orig),
            "resp" => Ok(AggregateMode::Resp),
            "union" => Ok(AggregateMode::Union),
            "uid" => Ok(AggregateMode::Uid),
            other => Err(Error::InvalidAggregateMode(other.to_owned())),
        }
    }
}

/// Outcome of assessing all samples of one host.
#[derive(Debug, Clone)]
pub struct HostReport {
    /// Samples the grammar classified as malicious.
    pub malicious_count: usize,
    /// Per-sample `(id, reason)` pairs as reported by the classifier.
    pub sample_reasons: Vec<(String, String)>,
    /// Balance check of the host's connection-state subsequence.
    pub balance: Result<(), BalanceError>,
}

/// Verdict for one host given its report and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Blocked,
    PdaRejected,
    Ok,
}

impl HostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HostStatus::Blocked => "BLOCKED",
            HostStatus::PdaRejected => "PDA_REJECTED",
            HostStatus::Ok => "OK",
        }
    }
}

fn host_keys(sample: &LabeledSequence, mode: AggregateMode) -> Vec<String> {
    let fallback = |primary: &str| {
        if !primary.is_empty() {
            primary.to_owned()
        } else if !sample.host.is_empty() {
            sample.host.clone()
        } else {
            sample.id.clone()
        }
    };

    match mode {
        AggregateMode::Orig => vec![fallback(&sample.host)],
        AggregateMode::Resp => vec![fallback(&sample.resp_host)],
        AggregateMode::Uid => vec![fallback(&sample.uid)],
        AggregateMode::Union => {
            let origin = fallback(&sample.host);
            let mut keys = vec![origin.clone()];
            if !sample.resp_host.is_empty() && sample.resp_host != origin {
                keys.push(sample.resp_host.clone());
            }
            keys
        }
    }
}

/// Groups sample indices by host key and orders each host's samples by
/// timestamp. Hosts are returned in sorted key order.
pub fn group_by_host(
    samples: &[LabeledSequence],
    mode: AggregateMode,
) -> Vec<(String, Vec<usize>)> {
    let mut by_host: BTreeMap<String, Vec<(f64, usize)>> = BTreeMap::new();
    for (index, sample) in samples.iter().enumerate() {
        for key in host_keys(sample, mode) {
            by_host.entry(key).or_default().push((sample.ts, index));
        }
    }

    by_host
        .into_iter()
        .map(|(host, mut entries)| {
            entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            (host, entries.into_iter().map(|(_, index)| index).collect())
        })
        .collect()
}

/// Classifies every sample of a host with the grammar machine and checks
/// the balance of the host's aggregated connection-state subsequence.
pub fn assess_host(
    gdfa: &GrammarDfa,
    samples: &[LabeledSequence],
    indexes: &[usize],
) -> HostReport {
    let mut malicious_count = 0usize;
    let mut sample_reasons = Vec::with_capacity(indexes.len());

    for &index in indexes {
        let sample = &samples[index];
        let (ok, reason) = gdfa.classify_with_reason(&sample.symbols);
        if ok {
            malicious_count += 1;
        }
        sample_reasons.push((sample.id.clone(), reason));
    }

    let conn_seq: Vec<Symbol> = indexes
        .iter()
        .flat_map(|&index| samples[index].symbols.iter())
        .filter(|symbol| symbol.starts_with("state="))
        .cloned()
        .collect();

    HostReport {
        malicious_count,
        sample_reasons,
        balance: validate_balance(&conn_seq, OPEN_TOKEN, CLOSE_TOKEN),
    }
}

/// Applies the blocking policy: the malicious-sequence threshold first,
/// the stack-balance verdict second.
pub fn host_status(report: &HostReport, threshold: usize) -> HostStatus {
    if report.malicious_count >= threshold {
        HostStatus::Blocked
    } else if report.balance.is_err() {
        HostStatus::PdaRejected
    } else {
        HostStatus::Ok
    }
}

//! `flowmata simulate`: score a dataset against a trained grammar and
//! aggregate the verdicts per host.

use std::fs;
use std::io::Write as _;

use clap::{App, Arg, ArgMatches, SubCommand};
use fnv::FnvHashMap;
use log::warn;

use flowmata::aggregate::{
    assess_host, group_by_host, host_status, AggregateMode, HostStatus,
};
use flowmata::automata::grammar_dfa::{load_cnf, load_dfa_dot};
use flowmata::dataset::load_iot_csv;

pub fn get_sub_command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("simulate")
        .about("Classifies a flow log with a trained grammar and blocks noisy hosts")
        .arg(
            Arg::with_name("grammar")
                .long("grammar")
                .takes_value(true)
                .default_value("grammar.txt")
                .help("CNF grammar file produced by `train --export-grammar`."),
        )
        .arg(
            Arg::with_name("dot")
                .long("dot")
                .takes_value(true)
                .conflicts_with("grammar")
                .help("Load the classifier from a DFA DOT file instead of a grammar."),
        )
        .arg(
            Arg::with_name("input")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Labeled IoT dataset file to score."),
        )
        .arg(
            Arg::with_name("threshold")
                .long("threshold")
                .takes_value(true)
                .default_value("5")
                .help("Malicious-sequence count at which a host is blocked."),
        )
        .arg(
            Arg::with_name("threshold-file")
                .long("threshold-file")
                .takes_value(true)
                .help("Per-host threshold overrides (`host,threshold` lines)."),
        )
        .arg(
            Arg::with_name("aggregate")
                .long("aggregate")
                .takes_value(true)
                .possible_values(&["orig", "resp", "union", "uid"])
                .default_value("orig")
                .help("Provenance field that keys samples to hosts."),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .takes_value(true)
                .help("Write a CSV report to this file."),
        )
        .arg(
            Arg::with_name("details")
                .long("details")
                .help("Print per-sample reasons for noteworthy hosts."),
        )
}

fn load_threshold_overrides(path: &str) -> FnvHashMap<String, usize> {
    let mut overrides = FnvHashMap::default();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("failed to open threshold file {}: {}", path, err);
            return overrides;
        }
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (host, threshold) = match line.split_once(',') {
            Some((host, threshold)) => (host.trim(), threshold.trim()),
            None => {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(host), Some(threshold)) => (host, threshold),
                    _ => continue,
                }
            }
        };
        match threshold.parse::<usize>() {
            Ok(threshold) if !host.is_empty() => {
                overrides.insert(host.to_owned(), threshold);
            }
            _ => warn!("invalid threshold for host '{}' in {}", host, path),
        }
    }

    overrides
}

pub fn handle_sub_matches(matches: &ArgMatches) -> i32 {
    let grammar_path = matches.value_of("grammar").unwrap_or("grammar.txt");
    let threshold: usize = match matches.value_of("threshold").unwrap_or("5").parse() {
        Ok(threshold) => threshold,
        Err(_) => {
            eprintln!("Invalid --threshold value.");
            return 1;
        }
    };
    let mode: AggregateMode = match matches.value_of("aggregate").unwrap_or("orig").parse() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            return 1;
        }
    };

    let gdfa = match matches.value_of("dot") {
        Some(dot_path) => match load_dfa_dot(dot_path) {
            Ok(gdfa) => gdfa,
            Err(err) => {
                eprintln!("Failed to load DFA from DOT: {}", err);
                return 2;
            }
        },
        None => match load_cnf(grammar_path) {
            Ok(gdfa) => gdfa,
            Err(err) => {
                eprintln!("Failed to load grammar: {}", err);
                return 2;
            }
        },
    };

    let overrides = matches
        .value_of("threshold-file")
        .map(load_threshold_overrides)
        .unwrap_or_default();

    let input_path = matches.value_of("input").expect("input is required");
    let samples = match load_iot_csv(input_path) {
        Ok(samples) => samples,
        Err(err) => {
            eprintln!("Failed to load dataset: {}", err);
            return 1;
        }
    };
    if samples.is_empty() {
        eprintln!("No samples loaded from {}", input_path);
        return 1;
    }

    let mut report_file = match matches.value_of("output") {
        Some(path) => match fs::File::create(path) {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "host,status,malicious_count,blocked,pda_ok,pda_reason"
                );
                Some(file)
            }
            Err(err) => {
                eprintln!("Warning: failed to open output file {}: {}", path, err);
                None
            }
        },
        None => None,
    };

    let print_details = matches.is_present("details");

    for (host, indexes) in group_by_host(&samples, mode) {
        let report = assess_host(&gdfa, &samples, &indexes);
        let host_threshold = overrides.get(&host).copied().unwrap_or(threshold);
        let status = host_status(&report, host_threshold);

        let (pda_ok, pda_reason) = match &report.balance {
            Ok(()) => (true, "accepted".to_owned()),
            Err(err) => (false, err.to_string()),
        };

        match status {
            HostStatus::Blocked => {
                println!(
                    "{}: BLOCKED ({} malicious sequences)",
                    host, report.malicious_count
                );
            }
            HostStatus::PdaRejected => {
                println!("{}: PDA_REJECTED ({})", host, pda_reason);
            }
            HostStatus::Ok => {
                if report.malicious_count > 0 {
                    println!(
                        "{}: OK ({} suspicious sequences)",
                        host, report.malicious_count
                    );
                } else {
                    println!("{}: OK", host);
                }
            }
        }

        if print_details && status != HostStatus::Ok {
            for (id, reason) in report.sample_reasons.iter().take(10) {
                println!("    sample {}: {}", id, reason);
            }
        } else if print_details && report.malicious_count > 0 {
            for (id, reason) in report
                .sample_reasons
                .iter()
                .filter(|(_, reason)| reason == "accepted")
                .take(10)
            {
                println!("    sample {}: {}", id, reason);
            }
        }

        if let Some(file) = report_file.as_mut() {
            let _ = writeln!(
                file,
                "{},{},{},{},{},{}",
                host,
                status.as_str(),
                report.malicious_count,
                status == HostStatus::Blocked,
                pda_ok,
                pda_reason
            );
        }
    }

    0
}

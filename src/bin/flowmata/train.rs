//! `flowmata train`: dataset → PTA → DFA → minimised DFA → exports.

use std::collections::BTreeSet;
use std::fs;

use clap::{App, Arg, ArgMatches, SubCommand};
use log::warn;

use flowmata::automata::{Dfa, Pta};
use flowmata::dataset::{
    load_iot_csv, load_malware_csv, train_test_split, LabeledSequence,
};
use flowmata::evaluator::{evaluate, Metrics};
use flowmata::grammars::cnf::CnfGrammar;
use flowmata::util::with_time;

pub fn get_sub_command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("train")
        .about("Trains the sequence classifier and exports the minimised DFA")
        .arg(
            Arg::with_name("input")
                .long("input")
                .takes_value(true)
                .multiple(true)
                .required(true)
                .help("Labeled dataset file (repeatable)."),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .takes_value(true)
                .possible_values(&["iot", "malware"])
                .default_value("iot")
                .help("Input format of all dataset files."),
        )
        .arg(
            Arg::with_name("train-ratio")
                .long("train-ratio")
                .takes_value(true)
                .default_value("0.7")
                .help("Train/test split ratio (0 < VAL < 1)."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("42")
                .help("Random seed for the train/test shuffle."),
        )
        .arg(
            Arg::with_name("train-full")
                .long("train-full")
                .help("Train on the entire dataset (ignore the split)."),
        )
        .arg(
            Arg::with_name("test")
                .long("test")
                .takes_value(true)
                .multiple(true)
                .help("Additional holdout dataset to evaluate on (repeatable)."),
        )
        .arg(
            Arg::with_name("export-dot")
                .long("export-dot")
                .takes_value(true)
                .help("Write the minimised DFA to a DOT file."),
        )
        .arg(
            Arg::with_name("export-grammar")
                .long("export-grammar")
                .takes_value(true)
                .help("Write the Chomsky normal form grammar to a file."),
        )
        .arg(
            Arg::with_name("export-definition")
                .long("export-definition")
                .takes_value(true)
                .help("Write the formal DFA definition to a file."),
        )
        .arg(
            Arg::with_name("print-definition")
                .long("print-definition")
                .help("Print the formal DFA definition to stdout."),
        )
}

fn load_dataset(path: &str, format: &str) -> Vec<LabeledSequence> {
    let loaded = if format == "malware" {
        load_malware_csv(path)
    } else {
        load_iot_csv(path)
    };

    match loaded {
        Ok(samples) => samples,
        Err(err) => {
            eprintln!("Failed to load {}: {}", path, err);
            Vec::new()
        }
    }
}

struct FeatureSummary {
    unique_count: usize,
    shown: Vec<String>,
    truncated: bool,
}

fn summarize_features(samples: &[LabeledSequence], max_display: usize) -> FeatureSummary {
    let unique: BTreeSet<&String> = samples
        .iter()
        .flat_map(|sample| sample.symbols.iter())
        .collect();

    let unique_count = unique.len();
    let shown: Vec<String> = unique.iter().take(max_display).map(|s| s.to_string()).collect();
    FeatureSummary {
        unique_count,
        truncated: unique_count > shown.len(),
        shown,
    }
}

fn print_features(summary: &FeatureSummary) {
    if summary.shown.is_empty() {
        println!("      Features: (none)");
        return;
    }
    print!(
        "      Features ({} unique): {}",
        summary.unique_count,
        summary.shown.join(", ")
    );
    if summary.truncated {
        print!(", ...");
    }
    println!();
}

fn print_metrics(source: &str, test_size: usize, metrics: &Metrics) {
    println!("\nResults for: {}", source);
    println!("  Test samples: {}", test_size);
    println!("  Accuracy: {:.4}%", metrics.accuracy * 100.0);
    println!(
        "  False Positive Rate: {:.4}%",
        metrics.false_positive_rate * 100.0
    );
    println!(
        "  False Negative Rate: {:.4}%",
        metrics.false_negative_rate * 100.0
    );
    println!(
        "  States (before -> after): {} -> {}",
        metrics.states_before, metrics.states_after
    );
    println!(
        "  Minimisation time: {:.3} ms",
        metrics.minimisation_time.as_secs_f64() * 1e3
    );
}

pub fn handle_sub_matches(matches: &ArgMatches) -> i32 {
    let format = matches.value_of("format").unwrap_or("iot");

    let train_ratio: f64 = match matches.value_of("train-ratio").unwrap_or("0.7").parse() {
        Ok(ratio) => ratio,
        Err(_) => {
            eprintln!("Invalid --train-ratio value.");
            return 1;
        }
    };
    let seed: u64 = match matches.value_of("seed").unwrap_or("42").parse() {
        Ok(seed) => seed,
        Err(_) => {
            eprintln!("Invalid --seed value.");
            return 1;
        }
    };

    let mut samples = Vec::new();
    for path in matches.values_of("input").into_iter().flatten() {
        println!("[1/6] Loading dataset from: {}", path);
        let current = load_dataset(path, format);
        if current.is_empty() {
            warn!("no samples loaded from {}", path);
        } else {
            println!("      Loaded {} sequences.", current.len());
            samples.extend(current);
        }
    }

    if samples.is_empty() {
        eprintln!("No samples loaded from any input. Check dataset paths and format.");
        return 1;
    }
    println!("      Total loaded: {} sequences.", samples.len());

    let features = summarize_features(&samples, 20);
    print_features(&features);

    let (train_sequences, test_sequences) = if matches.is_present("train-full") {
        println!(
            "[2/6] Training on entire dataset ({} sequences).",
            samples.len()
        );
        (samples.clone(), Vec::new())
    } else {
        println!(
            "[2/6] Splitting dataset with train_ratio={} and seed={}",
            train_ratio, seed
        );
        let split = match train_test_split(&samples, train_ratio, seed) {
            Ok(split) => split,
            Err(err) => {
                eprintln!("Error: {}", err);
                return 1;
            }
        };
        if split.train.is_empty() || split.test.is_empty() {
            eprintln!("Train/test split produced an empty partition. Adjust the ratio.");
            return 1;
        }
        println!(
            "      Train: {}, Test: {}",
            split.train.len(),
            split.test.len()
        );
        (split.train, split.test)
    };

    println!("[3/6] Building Prefix Tree Acceptor (PTA)...");
    let pta = Pta::from_samples(&train_sequences);
    println!("      PTA states: {}", pta.node_count());

    println!("[4/6] Constructing DFA from PTA and ensuring total transitions...");
    let dfa = match Dfa::from_pta(&pta) {
        Ok(dfa) => dfa,
        Err(err) => {
            eprintln!("Error: {}", err);
            return 1;
        }
    };
    let states_before = dfa.state_count();
    println!("      DFA states: {}", states_before);

    println!("[5/6] Minimising DFA...");
    let (dfa, minimisation_time) = with_time(|| dfa.minimise());
    let states_after = dfa.state_count();
    println!("      Minimised DFA states: {}", states_after);

    if matches.is_present("print-definition") || matches.is_present("export-definition") {
        let definition = dfa.to_definition();
        if matches.is_present("print-definition") {
            println!("\n{}", definition);
        }
        if let Some(path) = matches.value_of("export-definition") {
            if let Err(err) = fs::write(path, &definition) {
                eprintln!("Warning: failed to write definition file {}: {}", path, err);
            }
        }
    }

    println!("[6/6] Evaluating DFA on test set...");
    let mut evaluations: Vec<(String, usize, Metrics)> = Vec::new();

    if !test_sequences.is_empty() {
        let mut metrics = evaluate(&dfa, &test_sequences);
        metrics.states_before = states_before;
        metrics.states_after = states_after;
        metrics.minimisation_time = minimisation_time;
        evaluations.push(("combined_inputs".to_owned(), test_sequences.len(), metrics));
    }

    for path in matches.values_of("test").into_iter().flatten() {
        println!("      Evaluating holdout dataset: {}", path);
        let holdout = load_dataset(path, format);
        if holdout.is_empty() {
            warn!("no samples loaded from {}", path);
            continue;
        }
        let mut metrics = evaluate(&dfa, &holdout);
        metrics.states_before = states_before;
        metrics.states_after = states_after;
        metrics.minimisation_time = minimisation_time;
        evaluations.push((path.to_owned(), holdout.len(), metrics));
    }

    println!("\nSummary");
    println!("=======");
    println!(
        "Samples: {} (train={}, test={})",
        samples.len(),
        train_sequences.len(),
        test_sequences.len()
    );
    println!("States: before={}, after={}", states_before, states_after);
    println!(
        "Minimisation: {:.3} ms",
        minimisation_time.as_secs_f64() * 1e3
    );

    for (source, test_size, metrics) in &evaluations {
        print_metrics(source, *test_size, metrics);
    }

    if let Some(path) = matches.value_of("export-dot") {
        if let Err(err) = fs::write(path, dfa.to_dot()) {
            eprintln!("Warning: failed to write DOT file {}: {}", path, err);
        }
    }
    if let Some(path) = matches.value_of("export-grammar") {
        let grammar = CnfGrammar::from(&dfa);
        if let Err(err) = fs::write(path, grammar.to_string()) {
            eprintln!("Warning: failed to write grammar file {}: {}", path, err);
        }
    }

    0
}

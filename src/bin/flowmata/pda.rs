//! `flowmata pda`: simulate a DOT-described push-down automaton on a word.

use clap::{App, Arg, ArgMatches, SubCommand};

use flowmata::push_down_automaton::{load_pda_dot, DEFAULT_STEP_CAP};

pub fn get_sub_command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("pda")
        .about("Simulates a push-down automaton loaded from a DOT file")
        .arg(
            Arg::with_name("dot")
                .long("dot")
                .takes_value(true)
                .required(true)
                .help("DOT file describing the machine."),
        )
        .arg(
            Arg::with_name("input")
                .long("input")
                .takes_value(true)
                .default_value("")
                .help("Space-separated input symbols."),
        )
        .arg(
            Arg::with_name("steps")
                .long("steps")
                .takes_value(true)
                .help("Step cap for the simulation (default 50000)."),
        )
}

pub fn handle_sub_matches(matches: &ArgMatches) -> i32 {
    let dot_path = matches.value_of("dot").expect("dot is required");
    let pda = match load_pda_dot(dot_path) {
        Ok(pda) => pda,
        Err(err) => {
            eprintln!("Failed to load PDA: {}", err);
            return 2;
        }
    };

    let input: Vec<String> = matches
        .value_of("input")
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_owned)
        .collect();

    let step_cap = match matches.value_of("steps") {
        Some(value) => match value.parse() {
            Ok(cap) => cap,
            Err(_) => {
                eprintln!("Invalid --steps value.");
                return 1;
            }
        },
        None => DEFAULT_STEP_CAP,
    };

    let result = pda.simulate_with_cap(&input, step_cap);

    for (i, step) in result.trace.iter().enumerate() {
        println!(
            "{:3}  {:5}  {:12}  {} -> {}  [{}]",
            i,
            step.op.to_string(),
            step.symbol,
            step.source,
            step.target,
            step.stack_after.join(" ")
        );
    }

    if result.ok {
        println!("accepted ({} symbols)", input.len());
        0
    } else {
        println!(
            "rejected (best run consumed {} of {} symbols)",
            result
                .trace
                .iter()
                .filter(|step| step.symbol != flowmata::EPSILON)
                .count(),
            input.len()
        );
        1
    }
}

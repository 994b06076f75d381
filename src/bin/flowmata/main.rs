use clap::App;

mod pda;
mod simulate;
mod train;

fn main() {
    env_logger::init();

    let matches = App::new("flowmata")
        .version("0.2.0")
        .about("Grammar inference and sequence evaluation for labeled flow logs")
        .subcommand(train::get_sub_command())
        .subcommand(simulate::get_sub_command())
        .subcommand(pda::get_sub_command())
        .get_matches();

    let code = match matches.subcommand() {
        ("train", Some(sub_matches)) => train::handle_sub_matches(sub_matches),
        ("simulate", Some(sub_matches)) => simulate::handle_sub_matches(sub_matches),
        ("pda", Some(sub_matches)) => pda::handle_sub_matches(sub_matches),
        _ => {
            eprintln!("No subcommand given; try --help.");
            1
        }
    };

    std::process::exit(code);
}

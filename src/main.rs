use clap::Parser;
use mpt::cli::{Cli, render_json, render_text, run};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = mpt::logging::init_logging(&cli.log_level) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let reports = match run(&cli) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Simulation error: {e}");
            std::process::exit(1);
        }
    };

    if cli.json {
        match render_json(&cli, &reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Serialization error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    print!("{}", render_text(&reports, cli.years, cli.show_expected));
}

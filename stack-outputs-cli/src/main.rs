use std::process::ExitCode;

use clap::Parser;
use stack_outputs_cli::{Cli, run, setup_tracing};

fn main() -> ExitCode {
    setup_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(rendered) => {
            print!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

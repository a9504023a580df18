use alignment_report::cli::{Args, run, setup_logging};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    setup_logging(&args);

    match run(&args) {
        Ok(()) => {
            // Empty-result states are reported by the command itself
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

//! `privchain` - browser privilege-escalation attack chain simulator

use clap::Parser;

use privchain::cli::args::Cli;
use privchain::cli::commands;
use privchain::error::ExitCode;
use privchain::observability::init_logging;

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

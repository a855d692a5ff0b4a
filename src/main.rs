use altair::cli::{Cli, run};
use clap::Parser;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    altair::logging::init(&cli.log_level);
    run(cli)
}

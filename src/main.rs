use backtally::cli::{run, Cli};
use clap::Parser;

fn main() -> std::process::ExitCode {
    backtally::logging::init_logging();
    run(Cli::parse())
}

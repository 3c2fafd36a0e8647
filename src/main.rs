use clap::Parser;
use tracing_subscriber::EnvFilter;
use tradebounds::cli::{run, Cli};

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tradebounds=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    setup_logging();
    run(Cli::parse())
}

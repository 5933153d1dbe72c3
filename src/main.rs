use colored::*;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli_args = pfgen::cli::parse_args();

    // Show INFO by default, or DEBUG/TRACE if -v/-vv is set
    let default_level = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("PFGEN_LOG")
        .from_env_lossy();

    // Diagnostics go to stderr; stdout carries only the generated commands.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = pfgen::cli::run(cli_args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }
}

pub mod error;
pub mod parser;

use crate::iptables::{GenerationContext, IptablesGenerator};
use crate::rules::RulesParser;
use clap::Parser;
use error::CliError;
use parser::Cli;
use std::fs;
use tracing::debug;

// Helper function to parse args
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Main CLI execution: read the rules file, validate, print the commands.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let path_display = cli.rules_file.display().to_string();
    if !cli.rules_file.is_file() {
        return Err(CliError::RulesFileMissing(path_display));
    }

    let yaml_text = fs::read_to_string(&cli.rules_file).map_err(|e| {
        CliError::RulesFileUnreadable {
            path: path_display,
            source: e,
        }
    })?;

    let collection = RulesParser::parse(&yaml_text)?;
    debug!("Parsed {} rule set(s)", collection.len());

    let context = GenerationContext {
        destination: cli.destination,
        source_interface: cli.source_interface.clone(),
    };
    let commands = IptablesGenerator::generate(&collection, &context);

    // The command stream is the functional output; diagnostics go to stderr
    // via tracing so a downstream script can pipe stdout straight to a shell.
    println!("{}", commands.join("\n"));

    Ok(())
}

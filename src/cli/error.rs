use crate::rules::RulesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("YAML rules file '{0}' doesn't exist!")]
    RulesFileMissing(String),

    #[error("Failed to read rules file '{path}': {source}")]
    RulesFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl CliError {
    /// Exit status for this failure. File and document-level problems exit
    /// with 2, per-rule validation failures with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::RulesFileMissing(_) | CliError::RulesFileUnreadable { .. } => 2,
            CliError::Rules(e) => e.exit_code(),
        }
    }
}

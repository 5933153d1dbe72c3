use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    // Schema failures: the document as a whole is unusable.
    #[error("Invalid rules-YAML! Document is not a mapping.")]
    NotAMapping,

    #[error("Invalid rules-YAML! No 'rules' in it.")]
    MissingRulesKey,

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // Validation failures: one rule set or port entry breaks the grammar.
    // Each carries the offending raw value so tests can match on structure
    // instead of message text.
    #[error("Invalid rules-YAML! No 'chain-name' in it.")]
    MissingChainName,

    #[error("Invalid rules-YAML! Chain name is not a string.")]
    ChainNameNotAString,

    #[error("Invalid rules-YAML! Chain name '{name}' is invalid! ({reason})")]
    InvalidChainName { name: String, reason: ChainNameIssue },

    #[error("Rule '{0}' isn't valid! Not a port number.")]
    NotAPortNumber(String),

    #[error("Rule '{0}' isn't valid! Not a port range.")]
    NotAPortRange(String),

    #[error("Rule '{0}' isn't valid!")]
    NotValid(String),

    #[error("Invalid rules-YAML! No TCP nor UDP rules in '{0}'.")]
    NoPortRules(String),

    // Syntactically fine, but nothing usable came out of it.
    #[error("Rules-YAML doesn't contain any rules in it!")]
    NoRuleSets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainNameIssue {
    Length,
    Whitespace,
}

impl std::fmt::Display for ChainNameIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainNameIssue::Length => write!(f, "length"),
            ChainNameIssue::Whitespace => write!(f, "whitespace"),
        }
    }
}

impl RulesError {
    pub fn invalid_chain_name(name: impl Into<String>, reason: ChainNameIssue) -> Self {
        RulesError::InvalidChainName {
            name: name.into(),
            reason,
        }
    }

    /// Exit status the process should report for this failure.
    ///
    /// Document-level problems (malformed schema, nothing usable) exit with
    /// 2; per-rule validation failures exit with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RulesError::NotAMapping
            | RulesError::MissingRulesKey
            | RulesError::YamlError(_)
            | RulesError::NoRuleSets => 2,
            _ => 1,
        }
    }
}

// Type alias for Result with RulesError
pub type RulesResult<T> = Result<T, RulesError>;

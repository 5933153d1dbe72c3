pub mod errors;
pub mod parser;
pub mod types;

pub use errors::{ChainNameIssue, RulesError, RulesResult};
pub use parser::RulesParser;
pub use types::{PortSpec, RuleSet, RuleSetCollection};

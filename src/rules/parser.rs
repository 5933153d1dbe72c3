use crate::rules::{
    errors::{ChainNameIssue, RulesError, RulesResult},
    types::{PortSpec, RuleSet, RuleSetCollection},
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

lazy_static! {
    static ref SINGLE_PORT_RE: Regex = Regex::new(r"^(\d+)$").unwrap();
    static ref PORT_RANGE_RE: Regex = Regex::new(r"^(\d+)[-:](\d+)$").unwrap();
    static ref NO_WHITESPACE_RE: Regex = Regex::new(r"^\S+$").unwrap();
}

/// iptables rejects chain names of 30 characters or more.
const MAX_CHAIN_NAME_LEN: usize = 30;

pub struct RulesParser;

impl RulesParser {
    /// Parse a rules document into a validated, ordered collection.
    ///
    /// The document must be a mapping with a `rules` key holding a sequence
    /// of rule-set entries. Validation is all-or-nothing: the first invalid
    /// entry fails the whole parse, and a document that yields zero rule
    /// sets is an error of its own.
    pub fn parse(yaml_text: &str) -> RulesResult<RuleSetCollection> {
        let document: Value = serde_yaml::from_str(yaml_text)?;

        let mapping = document.as_mapping().ok_or(RulesError::NotAMapping)?;
        let rules = mapping.get("rules").ok_or(RulesError::MissingRulesKey)?;

        let mut collection = RuleSetCollection::new();
        if let Some(entries) = rules.as_sequence() {
            for entry in entries {
                collection.insert(Self::parse_rule_set(entry)?);
            }
        }

        if collection.is_empty() {
            return Err(RulesError::NoRuleSets);
        }

        Ok(collection)
    }

    /// Parse one rule-set entry: a `chain-name` plus `tcp`/`udp` port lists.
    fn parse_rule_set(entry: &Value) -> RulesResult<RuleSet> {
        let mapping = entry.as_mapping().ok_or(RulesError::MissingChainName)?;

        let name_value = mapping
            .get("chain-name")
            .ok_or(RulesError::MissingChainName)?;
        let name = name_value
            .as_str()
            .ok_or(RulesError::ChainNameNotAString)?;
        Self::validate_chain_name(name)?;

        let tcp_rules = Self::collect_port_rules(mapping.get("tcp"))?;
        let udp_rules = Self::collect_port_rules(mapping.get("udp"))?;

        if tcp_rules.is_empty() && udp_rules.is_empty() {
            return Err(RulesError::NoPortRules(name.to_string()));
        }

        Ok(RuleSet {
            name: name.to_string(),
            tcp_rules,
            udp_rules,
        })
    }

    fn validate_chain_name(name: &str) -> RulesResult<()> {
        if name.is_empty() || name.chars().count() >= MAX_CHAIN_NAME_LEN {
            return Err(RulesError::invalid_chain_name(name, ChainNameIssue::Length));
        }
        if !NO_WHITESPACE_RE.is_match(name) {
            return Err(RulesError::invalid_chain_name(
                name,
                ChainNameIssue::Whitespace,
            ));
        }
        Ok(())
    }

    /// Collect the port specs under a protocol key. A missing key or any
    /// falsy value (null, false, zero, empty string/list/mapping) yields an
    /// empty list; a non-empty list is parsed entry by entry.
    fn collect_port_rules(value: Option<&Value>) -> RulesResult<Vec<PortSpec>> {
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        if Self::is_falsy(value) {
            return Ok(Vec::new());
        }

        let entries = value
            .as_sequence()
            .ok_or_else(|| RulesError::NotValid(Self::render_value(value)))?;

        entries.iter().map(Self::parse_port_rule).collect()
    }

    fn is_falsy(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Sequence(s) => s.is_empty(),
            Value::Mapping(m) => m.is_empty(),
            _ => false,
        }
    }

    /// Parse one port entry. YAML auto-types bare integers, so an entry is
    /// either an integer (always a single port) or a string matching the
    /// single-port or range grammar. No other shape is accepted.
    fn parse_port_rule(entry: &Value) -> RulesResult<PortSpec> {
        match entry {
            Value::Number(number) => {
                let port = number
                    .as_u64()
                    .ok_or_else(|| RulesError::NotValid(number.to_string()))?;
                Self::validate_single_port(port, &number.to_string())
            }
            Value::String(text) => {
                if let Some(captures) = SINGLE_PORT_RE.captures(text) {
                    let port = captures[1]
                        .parse::<u64>()
                        .map_err(|_| RulesError::NotAPortNumber(text.clone()))?;
                    return Self::validate_single_port(port, text);
                }

                if let Some(captures) = PORT_RANGE_RE.captures(text) {
                    let low = captures[1]
                        .parse::<u64>()
                        .map_err(|_| RulesError::NotAPortRange(text.clone()))?;
                    let high = captures[2]
                        .parse::<u64>()
                        .map_err(|_| RulesError::NotAPortRange(text.clone()))?;
                    return Self::validate_port_range(low, high, text);
                }

                Err(RulesError::NotValid(text.clone()))
            }
            other => Err(RulesError::NotValid(Self::render_value(other))),
        }
    }

    fn validate_single_port(port: u64, raw: &str) -> RulesResult<PortSpec> {
        if port > 0 && port < 65535 {
            Ok(PortSpec::Single(port as u16))
        } else {
            Err(RulesError::NotAPortNumber(raw.to_string()))
        }
    }

    fn validate_port_range(low: u64, high: u64, raw: &str) -> RulesResult<PortSpec> {
        if low > 0 && low < 65535 && high > 0 && high < 65535 && high > low {
            Ok(PortSpec::Range {
                low: low as u16,
                high: high as u16,
            })
        } else {
            Err(RulesError::NotAPortRange(raw.to_string()))
        }
    }

    /// Render a YAML value for an error message.
    fn render_value(value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            other => serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_else(|_| "<unrenderable>".to_string()),
        }
    }
}

use crate::rules::{PortSpec, RuleSetCollection};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::net::IpAddr;
use tracing::info;

lazy_static! {
    // Characters that need no quoting in a POSIX shell word.
    static ref SHELL_SAFE_RE: Regex = Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").unwrap();
}

/// External inputs to command generation, supplied by the CLI layer.
///
/// The destination is already a syntactically valid IPv4 or IPv6 address;
/// the optional source interface is passed through without validation.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub destination: IpAddr,
    pub source_interface: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

pub struct IptablesGenerator;

impl IptablesGenerator {
    /// Generate the full iptables command sequence for a validated collection.
    ///
    /// Deterministic: rule sets are walked in collection insertion order, and
    /// within a rule set the order is chain setup, PREROUTING redirect, all
    /// TCP rules, all UDP rules. iptables evaluates rules in append order, so
    /// this sequence is load-bearing, not cosmetic.
    pub fn generate(collection: &RuleSetCollection, context: &GenerationContext) -> Vec<String> {
        let mut commands = Vec::new();

        for rule_set in collection {
            info!("Processing rules for: {}", rule_set.name);
            let chain = Self::shell_quote(&rule_set.name);

            // Flush the chain if it exists, create it otherwise. Reruns then
            // regenerate the chain to the same shape instead of erroring.
            commands.push(format!(
                "iptables -t nat -F {} > /dev/null || iptables -t nat -N {}",
                chain, chain
            ));

            // An empty interface string means the same as no interface at
            // all: match traffic on every interface.
            match &context.source_interface {
                Some(interface) if !interface.is_empty() => commands.push(format!(
                    "iptables -t nat -A PREROUTING -i {} -j {}",
                    interface, chain
                )),
                _ => commands.push(format!("iptables -t nat -A PREROUTING -j {}", chain)),
            }

            for spec in &rule_set.tcp_rules {
                commands.push(Self::dnat_rule(&chain, Protocol::Tcp, spec, &context.destination));
            }
            for spec in &rule_set.udp_rules {
                commands.push(Self::dnat_rule(&chain, Protocol::Udp, spec, &context.destination));
            }
        }

        commands
    }

    /// One DNAT rule appended to the chain. Single ports use the protocol's
    /// own `--dport` match; ranges use the multiport module with a `:`
    /// separator regardless of how the range was written in the source.
    fn dnat_rule(chain: &str, protocol: Protocol, spec: &PortSpec, destination: &IpAddr) -> String {
        match spec {
            PortSpec::Single(port) => format!(
                "iptables -t nat -A {} -p {} -m {} --dport {} -j DNAT --to-destination {}",
                chain, protocol, protocol, port, destination
            ),
            PortSpec::Range { low, high } => format!(
                "iptables -t nat -A {} -p {} -m multiport --dports {}:{} -j DNAT --to-destination {}",
                chain, protocol, low, high, destination
            ),
        }
    }

    /// Quote a string as a single shell token, same contract as Python's
    /// `shlex.quote`: safe words pass through, everything else is wrapped in
    /// single quotes with embedded quotes escaped.
    fn shell_quote(word: &str) -> String {
        if !word.is_empty() && SHELL_SAFE_RE.is_match(word) {
            word.to_string()
        } else {
            format!("'{}'", word.replace('\'', "'\\''"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleSet, RuleSetCollection};

    fn context(destination: &str, interface: Option<&str>) -> GenerationContext {
        GenerationContext {
            destination: destination.parse().unwrap(),
            source_interface: interface.map(|s| s.to_string()),
        }
    }

    fn web_collection() -> RuleSetCollection {
        let mut collection = RuleSetCollection::new();
        collection.insert(RuleSet {
            name: "web".to_string(),
            tcp_rules: vec![
                PortSpec::Single(80),
                PortSpec::Range {
                    low: 8000,
                    high: 8010,
                },
            ],
            udp_rules: vec![],
        });
        collection
    }

    #[test]
    fn test_generate_without_interface() {
        let commands = IptablesGenerator::generate(&web_collection(), &context("10.0.0.5", None));
        assert_eq!(
            commands,
            vec![
                "iptables -t nat -F web > /dev/null || iptables -t nat -N web",
                "iptables -t nat -A PREROUTING -j web",
                "iptables -t nat -A web -p tcp -m tcp --dport 80 -j DNAT --to-destination 10.0.0.5",
                "iptables -t nat -A web -p tcp -m multiport --dports 8000:8010 -j DNAT --to-destination 10.0.0.5",
            ]
        );
    }

    #[test]
    fn test_generate_with_interface() {
        let commands =
            IptablesGenerator::generate(&web_collection(), &context("10.0.0.5", Some("eth0")));
        assert_eq!(
            commands[1],
            "iptables -t nat -A PREROUTING -i eth0 -j web"
        );
    }

    #[test]
    fn test_empty_interface_matches_all_interfaces() {
        let commands =
            IptablesGenerator::generate(&web_collection(), &context("10.0.0.5", Some("")));
        assert_eq!(commands[1], "iptables -t nat -A PREROUTING -j web");
    }

    #[test]
    fn test_tcp_rules_precede_udp_rules() {
        let mut collection = RuleSetCollection::new();
        collection.insert(RuleSet {
            name: "mixed".to_string(),
            tcp_rules: vec![PortSpec::Single(443)],
            udp_rules: vec![
                PortSpec::Single(53),
                PortSpec::Range { low: 60, high: 70 },
            ],
        });
        let commands = IptablesGenerator::generate(&collection, &context("192.168.1.10", None));
        assert_eq!(
            commands[2..],
            [
                "iptables -t nat -A mixed -p tcp -m tcp --dport 443 -j DNAT --to-destination 192.168.1.10".to_string(),
                "iptables -t nat -A mixed -p udp -m udp --dport 53 -j DNAT --to-destination 192.168.1.10".to_string(),
                "iptables -t nat -A mixed -p udp -m multiport --dports 60:70 -j DNAT --to-destination 192.168.1.10".to_string(),
            ]
        );
    }

    #[test]
    fn test_collection_order_preserved_across_rule_sets() {
        let mut collection = RuleSetCollection::new();
        collection.insert(RuleSet {
            name: "web".to_string(),
            tcp_rules: vec![PortSpec::Single(80)],
            udp_rules: vec![],
        });
        collection.insert(RuleSet {
            name: "dns".to_string(),
            tcp_rules: vec![],
            udp_rules: vec![PortSpec::Single(53)],
        });
        let commands = IptablesGenerator::generate(&collection, &context("10.0.0.5", None));
        let web_setup = commands.iter().position(|c| c.contains("-N web")).unwrap();
        let dns_setup = commands.iter().position(|c| c.contains("-N dns")).unwrap();
        assert!(web_setup < dns_setup);
    }

    #[test]
    fn test_ipv6_destination() {
        let commands = IptablesGenerator::generate(&web_collection(), &context("2001:db8::1", None));
        assert!(commands[2].ends_with("--to-destination 2001:db8::1"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let collection = web_collection();
        let ctx = context("10.0.0.5", Some("eth0"));
        let first = IptablesGenerator::generate(&collection, &ctx);
        let second = IptablesGenerator::generate(&collection, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(IptablesGenerator::shell_quote("web"), "web");
        assert_eq!(IptablesGenerator::shell_quote("web.internal-2"), "web.internal-2");
        assert_eq!(IptablesGenerator::shell_quote("web$chain"), "'web$chain'");
        assert_eq!(IptablesGenerator::shell_quote("it's"), r#"'it'\''s'"#);
    }

    #[test]
    fn test_awkward_chain_name_quoted_in_commands() {
        let mut collection = RuleSetCollection::new();
        collection.insert(RuleSet {
            name: "web$1".to_string(),
            tcp_rules: vec![PortSpec::Single(80)],
            udp_rules: vec![],
        });
        let commands = IptablesGenerator::generate(&collection, &context("10.0.0.5", None));
        assert_eq!(
            commands[0],
            "iptables -t nat -F 'web$1' > /dev/null || iptables -t nat -N 'web$1'"
        );
        assert_eq!(commands[1], "iptables -t nat -A PREROUTING -j 'web$1'");
    }
}

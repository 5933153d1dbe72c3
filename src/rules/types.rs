/// A validated destination-port match: a single port or an inclusive range.
///
/// Endpoints always sit in `1..=65534`; a `Range` spans at least two ports
/// (`low < high`). Construction happens only in the rules parser, so a
/// `PortSpec` held by a [`RuleSet`] is valid by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range { low: u16, high: u16 },
}

/// One named group of forwarding rules, keyed by its iptables chain name.
///
/// Invariants enforced at parse time: the name is non-empty, contains no
/// whitespace and is shorter than 30 characters (iptables chain-name limit),
/// and at least one of the two port lists is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub name: String,
    pub tcp_rules: Vec<PortSpec>,
    pub udp_rules: Vec<PortSpec>,
}

/// Ordered collection of rule sets with unique chain names.
///
/// Insertion order is semantically significant: it dictates the order of the
/// generated command stream. A duplicate chain name overwrites the earlier
/// entry's rules but keeps its original position (last-one-wins on content,
/// first-one-wins on placement). That overwrite behavior is deliberate and
/// relied upon, not an artifact of the container choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSetCollection {
    sets: Vec<RuleSet>,
}

impl RuleSetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule set, replacing any earlier one with the same name in place.
    pub fn insert(&mut self, rule_set: RuleSet) {
        match self.sets.iter_mut().find(|s| s.name == rule_set.name) {
            Some(existing) => *existing = rule_set,
            None => self.sets.push(rule_set),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSetCollection {
    type Item = &'a RuleSet;
    type IntoIter = std::slice::Iter<'a, RuleSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

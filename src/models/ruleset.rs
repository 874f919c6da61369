//! Ruleset directives and their resolved form.

/// Where a `ruleset=` directive takes its rules from.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSource {
    /// `[]GEOIP,<code>` builtin marker.
    GeoIp(String),
    /// `[]MATCH` / `[]FINAL` builtin marker; overrides the final outbound.
    Final,
    /// Remote rule-list URL, fetched and classified at generation time.
    Remote(String),
}

/// One `ruleset=<group>,<source>` line from the template.
#[derive(Debug, Clone, PartialEq)]
pub struct RulesetDirective {
    pub group: String,
    pub source: RuleSource,
}

/// Rule kinds recognized in remote rule lists.
///
/// `ALL_RULE_KINDS` fixes the emission order so generated output is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Domain,
    DomainSuffix,
    DomainKeyword,
    IpCidr,
    ProcessName,
}

pub const ALL_RULE_KINDS: [RuleKind; 5] = [
    RuleKind::Domain,
    RuleKind::DomainSuffix,
    RuleKind::DomainKeyword,
    RuleKind::IpCidr,
    RuleKind::ProcessName,
];

impl RuleKind {
    /// Key used in the sing-box route rule object.
    pub fn singbox_key(self) -> &'static str {
        match self {
            RuleKind::Domain => "domain",
            RuleKind::DomainSuffix => "domain_suffix",
            RuleKind::DomainKeyword => "domain_keyword",
            RuleKind::IpCidr => "ip_cidr",
            RuleKind::ProcessName => "process_name",
        }
    }

    /// Rule type written in Clash `rules:` lines.
    pub fn clash_key(self) -> &'static str {
        match self {
            RuleKind::Domain => "DOMAIN",
            RuleKind::DomainSuffix => "DOMAIN-SUFFIX",
            RuleKind::DomainKeyword => "DOMAIN-KEYWORD",
            RuleKind::IpCidr => "IP-CIDR",
            RuleKind::ProcessName => "PROCESS-NAME",
        }
    }
}

/// A single resolved rule entry, tied to its destination outbound.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRule {
    GeoIp {
        code: String,
        outbound: String,
    },
    /// One non-empty bucket of values of the same kind from a remote list.
    Values {
        kind: RuleKind,
        values: Vec<String>,
        outbound: String,
    },
}

/// Outcome of resolving all `ruleset=` directives, in directive order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRules {
    pub rules: Vec<ResolvedRule>,
    pub final_outbound: String,
}

impl Default for ResolvedRules {
    fn default() -> Self {
        ResolvedRules {
            rules: Vec::new(),
            final_outbound: "direct".to_string(),
        }
    }
}

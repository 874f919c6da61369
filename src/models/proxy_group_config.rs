//! Proxy group configuration parsed from the template mini-language.

/// Selection behavior of a proxy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyGroupType {
    Selector,
    UrlTest,
}

/// A named group of unresolved pattern tokens.
///
/// Patterns are kept raw here; `utils::matcher` resolves them against the tag
/// set when a configuration is generated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyGroupConfig {
    pub name: String,
    pub group_type: ProxyGroupType,
    pub patterns: Vec<String>,
    /// Health-check URL hint carried on url-test group lines. Tokens that
    /// contain `http` are never patterns.
    pub test_url: Option<String>,
}

impl ProxyGroupConfig {
    pub fn new(name: &str, group_type: ProxyGroupType) -> Self {
        ProxyGroupConfig {
            name: name.to_string(),
            group_type,
            patterns: Vec::new(),
            test_url: None,
        }
    }
}

use log::warn;
use regex::Regex;

use crate::models::ProxyGroupConfig;

/// The kinds of pattern token a `custom_proxy_group=` line can carry.
///
/// Keeping this an explicit grammar (instead of inline string surgery) makes
/// the include/exclude semantics of the lookahead emulation testable on its
/// own.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupPattern {
    /// `DIRECT` literal, mapped by generators to the built-in direct outbound.
    Direct,
    /// `REJECT` literal, mapped by generators to the built-in block outbound.
    Reject,
    /// `[]Name` reference to another group.
    GroupRef(String),
    /// Emulated negative lookahead: a tag matches when it contains none of
    /// `exclude` and, if `include` is non-empty, at least one of `include`.
    Lookahead {
        exclude: Vec<String>,
        include: Vec<String>,
    },
    /// `(A|B|C)` shortcut: a tag matches when it contains any keyword.
    Alternation(Vec<String>),
    /// Anchored token treated as a full case-insensitive regex.
    FullRegex(String),
    /// Plain substring containment.
    Substring(String),
}

/// A resolved member of a proxy group, before target-specific naming.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupMember {
    Direct,
    Reject,
    Group(String),
    Tag(String),
}

/// Classify one raw pattern token.
pub fn classify_pattern(token: &str) -> GroupPattern {
    if token == "DIRECT" {
        return GroupPattern::Direct;
    }
    if token == "REJECT" {
        return GroupPattern::Reject;
    }
    if let Some(name) = token.strip_prefix("[]") {
        return GroupPattern::GroupRef(name.to_string());
    }
    if token.contains("(?!") {
        return parse_lookahead(token);
    }
    if token.starts_with('(') && token.ends_with(')') {
        let keywords = token[1..token.len() - 1]
            .split('|')
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string())
            .collect();
        return GroupPattern::Alternation(keywords);
    }
    if token.starts_with('^') || token.ends_with('$') {
        return GroupPattern::FullRegex(token.to_string());
    }
    GroupPattern::Substring(token.to_string())
}

/// Split a `(?!...)`-style token into exclude and include keyword lists.
///
/// The token is split on the literal `)).*$`; the left half yields the
/// exclude list starting after its `.*(` marker, anything after the split
/// (minus its leading separator) is the include list.
fn parse_lookahead(token: &str) -> GroupPattern {
    let (left, rest) = match token.split_once(")).*$") {
        Some((l, r)) => (l, r),
        None => (token, ""),
    };
    let start = left.find(".*(").map(|i| i + 3).unwrap_or(2);
    let exclude = left
        .get(start..)
        .unwrap_or("")
        .split('|')
        .filter(|k| !k.is_empty())
        .map(|k| k.to_string())
        .collect();
    let include = if rest.len() > 1 {
        rest[1..]
            .split('|')
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string())
            .collect()
    } else {
        Vec::new()
    };
    GroupPattern::Lookahead { exclude, include }
}

/// Match one classified pattern against the tag set, preserving tag order.
///
/// `Direct`, `Reject` and `GroupRef` never tag-match; callers handle them as
/// group members directly.
pub fn match_tags(pattern: &GroupPattern, tags: &[String]) -> Vec<String> {
    match pattern {
        GroupPattern::Direct | GroupPattern::Reject | GroupPattern::GroupRef(_) => Vec::new(),
        GroupPattern::Lookahead { exclude, include } => tags
            .iter()
            .filter(|tag| {
                if exclude.iter().any(|k| tag.contains(k.as_str())) {
                    return false;
                }
                include.is_empty() || include.iter().any(|k| tag.contains(k.as_str()))
            })
            .cloned()
            .collect(),
        GroupPattern::Alternation(keywords) => tags
            .iter()
            .filter(|tag| keywords.iter().any(|k| tag.contains(k.as_str())))
            .cloned()
            .collect(),
        GroupPattern::FullRegex(pattern) => match Regex::new(&format!("(?i){}", pattern)) {
            Ok(re) => tags.iter().filter(|tag| re.is_match(tag)).cloned().collect(),
            Err(e) => {
                warn!("Invalid group pattern regex '{}': {}", pattern, e);
                Vec::new()
            }
        },
        GroupPattern::Substring(keyword) => tags
            .iter()
            .filter(|tag| tag.contains(keyword.as_str()))
            .cloned()
            .collect(),
    }
}

/// Resolve a group's pattern list into an ordered member list.
///
/// A `[]` reference to the group itself is dropped. An empty result is the
/// caller's problem: generators substitute the built-in direct outbound so no
/// group ever ends up with zero members.
pub fn resolve_group(group: &ProxyGroupConfig, tags: &[String]) -> Vec<GroupMember> {
    let mut members = Vec::new();
    for token in &group.patterns {
        match classify_pattern(token) {
            GroupPattern::Direct => members.push(GroupMember::Direct),
            GroupPattern::Reject => members.push(GroupMember::Reject),
            GroupPattern::GroupRef(name) => {
                if name != group.name {
                    members.push(GroupMember::Group(name));
                }
            }
            pattern => {
                for tag in match_tags(&pattern, tags) {
                    members.push(GroupMember::Tag(tag));
                }
            }
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyGroupType;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_literals() {
        assert_eq!(classify_pattern("DIRECT"), GroupPattern::Direct);
        assert_eq!(classify_pattern("REJECT"), GroupPattern::Reject);
        assert_eq!(
            classify_pattern("[]Auto"),
            GroupPattern::GroupRef("Auto".to_string())
        );
    }

    #[test]
    fn test_classify_alternation() {
        assert_eq!(
            classify_pattern("(HK|SG)"),
            GroupPattern::Alternation(vec!["HK".to_string(), "SG".to_string()])
        );
    }

    #[test]
    fn test_classify_substring_and_regex() {
        assert_eq!(
            classify_pattern("HK"),
            GroupPattern::Substring("HK".to_string())
        );
        assert_eq!(
            classify_pattern("^US.*$"),
            GroupPattern::FullRegex("^US.*$".to_string())
        );
    }

    #[test]
    fn test_lookahead_exclude_only() {
        let pattern = classify_pattern("(?!.*(CN|HK)).*$");
        assert_eq!(
            pattern,
            GroupPattern::Lookahead {
                exclude: vec!["CN".to_string(), "HK".to_string()],
                include: vec![],
            }
        );
        let selected = match_tags(&pattern, &tags(&["CN-1", "US-1", "HK-2"]));
        assert_eq!(selected, vec!["US-1".to_string()]);
    }

    #[test]
    fn test_lookahead_with_include() {
        let pattern = GroupPattern::Lookahead {
            exclude: vec!["套餐".to_string()],
            include: vec!["US".to_string()],
        };
        let selected = match_tags(&pattern, &tags(&["US-1", "US-套餐", "JP-1"]));
        assert_eq!(selected, vec!["US-1".to_string()]);
    }

    #[test]
    fn test_alternation_preserves_tag_order() {
        let pattern = classify_pattern("(HK|SG)");
        let selected = match_tags(&pattern, &tags(&["SG-2", "HK-1", "US-1"]));
        assert_eq!(selected, vec!["SG-2".to_string(), "HK-1".to_string()]);
    }

    #[test]
    fn test_full_regex_case_insensitive() {
        let pattern = classify_pattern("^hk");
        let selected = match_tags(&pattern, &tags(&["HK-1", "US-HK"]));
        assert_eq!(selected, vec!["HK-1".to_string()]);
    }

    #[test]
    fn test_invalid_regex_yields_empty() {
        let pattern = classify_pattern("^(unclosed$");
        assert!(match_tags(&pattern, &tags(&["anything"])).is_empty());
    }

    #[test]
    fn test_resolve_group_excludes_self_reference() {
        let mut group = ProxyGroupConfig::new("Proxy", ProxyGroupType::Selector);
        group.patterns = vec!["[]Proxy".to_string(), "[]Auto".to_string()];
        let members = resolve_group(&group, &[]);
        assert_eq!(members, vec![GroupMember::Group("Auto".to_string())]);
    }

    #[test]
    fn test_resolve_group_mixed_patterns() {
        // custom_proxy_group=Proxy`select`(HK|SG)`DIRECT with tags [HK-1, US-1]
        let mut group = ProxyGroupConfig::new("Proxy", ProxyGroupType::Selector);
        group.patterns = vec!["(HK|SG)".to_string(), "DIRECT".to_string()];
        let members = resolve_group(&group, &tags(&["HK-1", "US-1"]));
        assert_eq!(
            members,
            vec![
                GroupMember::Tag("HK-1".to_string()),
                GroupMember::Direct,
            ]
        );
    }
}

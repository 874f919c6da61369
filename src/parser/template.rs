//! Template mini-language parsing.
//!
//! The template is scanned line by line. `custom_proxy_group=` lines declare
//! proxy groups with backtick-delimited pattern tokens; `ruleset=` lines map a
//! rule source (remote URL or `[]` builtin marker) to a destination outbound.
//! Malformed lines are skipped, never fatal.

use log::{debug, warn};

use crate::models::{ProxyGroupConfig, ProxyGroupType, RuleSource, RulesetDirective};

/// Parse all `custom_proxy_group=` lines into group configs, in template order.
pub fn parse_proxy_groups(template: &str) -> Vec<ProxyGroupConfig> {
    let mut groups = Vec::new();
    for line in template.lines() {
        let Some(rest) = line.strip_prefix("custom_proxy_group=") else {
            continue;
        };
        let mut parts = rest.split('`');
        let name = parts.next().unwrap_or("");
        if name.is_empty() {
            debug!("Skipping proxy group line with empty name");
            continue;
        }
        let group_type = match parts.next() {
            Some("url-test") => ProxyGroupType::UrlTest,
            _ => ProxyGroupType::Selector,
        };

        let mut group = ProxyGroupConfig::new(name, group_type);
        for token in parts {
            if token.is_empty() {
                continue;
            }
            // Tokens carrying `http` are health-check URL hints, not patterns.
            if token.contains("http") {
                if group.test_url.is_none() && token.starts_with("http") {
                    group.test_url = Some(token.to_string());
                }
                continue;
            }
            group.patterns.push(token.to_string());
        }
        groups.push(group);
    }
    groups
}

/// Parse all `ruleset=` lines into directives, in template order.
pub fn parse_ruleset_directives(template: &str) -> Vec<RulesetDirective> {
    let mut directives = Vec::new();
    for line in template.lines() {
        let Some(rest) = line.strip_prefix("ruleset=") else {
            continue;
        };
        let rest = rest.trim();
        let Some((group, source)) = rest.split_once(',') else {
            debug!("Skipping ruleset line without comma: {}", rest);
            continue;
        };
        if group.is_empty() {
            debug!("Skipping ruleset line with empty group");
            continue;
        }

        let source = if let Some(builtin) = source.strip_prefix("[]") {
            if let Some(code) = builtin.strip_prefix("GEOIP,") {
                if code.is_empty() {
                    continue;
                }
                RuleSource::GeoIp(code.to_string())
            } else if builtin == "MATCH" || builtin == "FINAL" {
                RuleSource::Final
            } else {
                warn!("Unrecognized builtin ruleset marker: []{}", builtin);
                continue;
            }
        } else {
            RuleSource::Remote(source.to_string())
        };

        directives.push(RulesetDirective {
            group: group.to_string(),
            source,
        });
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups() {
        let template = "\
custom_proxy_group=Proxy`select`[]Auto`(HK|SG)`DIRECT
custom_proxy_group=Auto`url-test`(HK|SG|JP)`http://www.gstatic.com/generate_204`300,,50
some unrelated line
custom_proxy_group=`select`broken
";
        let groups = parse_proxy_groups(template);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].name, "Proxy");
        assert_eq!(groups[0].group_type, ProxyGroupType::Selector);
        assert_eq!(
            groups[0].patterns,
            vec!["[]Auto".to_string(), "(HK|SG)".to_string(), "DIRECT".to_string()]
        );
        assert_eq!(groups[0].test_url, None);

        assert_eq!(groups[1].name, "Auto");
        assert_eq!(groups[1].group_type, ProxyGroupType::UrlTest);
        // The http token becomes the test URL hint, never a pattern.
        assert_eq!(groups[1].patterns, vec!["(HK|SG|JP)".to_string(), "300,,50".to_string()]);
        assert_eq!(
            groups[1].test_url.as_deref(),
            Some("http://www.gstatic.com/generate_204")
        );
    }

    #[test]
    fn test_parse_ruleset_directives() {
        let template = "\
ruleset=PROXY,https://example.com/rules.list
ruleset=PROXY,[]GEOIP,CN
ruleset=Final,[]MATCH
ruleset=Other,[]FINAL
ruleset=broken-no-comma
ruleset=,https://example.com/empty-group.list
ruleset=X,[]UNKNOWN-MARKER
";
        let directives = parse_ruleset_directives(template);
        assert_eq!(directives.len(), 4);
        assert_eq!(
            directives[0].source,
            RuleSource::Remote("https://example.com/rules.list".to_string())
        );
        assert_eq!(directives[1].source, RuleSource::GeoIp("CN".to_string()));
        assert_eq!(directives[2].source, RuleSource::Final);
        assert_eq!(directives[2].group, "Final");
        assert_eq!(directives[3].source, RuleSource::Final);
    }
}

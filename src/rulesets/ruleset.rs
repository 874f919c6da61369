//! Ruleset directive resolution.
//!
//! Builtin GEOIP/FINAL markers resolve inline; remote rule lists are fetched
//! (concurrently, one attempt each) and classified into typed buckets. A fetch
//! failure skips that directive only, the rest of the generation continues.

use std::collections::HashSet;

use futures::future::join_all;
use log::error;

use crate::models::{
    ResolvedRule, ResolvedRules, RuleKind, RuleSource, RulesetDirective, ALL_RULE_KINDS,
};
use crate::settings::Settings;
use crate::utils::http::web_get;

enum Resolution {
    Rules(Vec<ResolvedRule>),
    FinalOverride(String),
    Skip,
}

/// Resolve all directives against their sources, preserving directive order.
///
/// The returned `final_outbound` is `direct` unless a `[]MATCH`/`[]FINAL`
/// directive overrides it.
pub async fn resolve_rulesets(
    directives: &[RulesetDirective],
    settings: &Settings,
) -> ResolvedRules {
    let futures = directives
        .iter()
        .map(|directive| resolve_directive(directive, settings));
    let resolutions = join_all(futures).await;

    let mut resolved = ResolvedRules::default();
    for resolution in resolutions {
        match resolution {
            Resolution::Rules(mut rules) => resolved.rules.append(&mut rules),
            Resolution::FinalOverride(group) => resolved.final_outbound = group,
            Resolution::Skip => {}
        }
    }
    resolved
}

async fn resolve_directive(directive: &RulesetDirective, settings: &Settings) -> Resolution {
    match &directive.source {
        RuleSource::GeoIp(code) => Resolution::Rules(vec![ResolvedRule::GeoIp {
            code: code.to_lowercase(),
            outbound: directive.group.clone(),
        }]),
        RuleSource::Final => Resolution::FinalOverride(directive.group.clone()),
        RuleSource::Remote(url) => match web_get(url, &settings.user_agent).await {
            Ok(content) => Resolution::Rules(classify_rule_lines(
                &content,
                &directive.group,
                settings.apple_platform,
            )),
            Err(e) => {
                error!("Failed to fetch ruleset from '{}': {}", url, e);
                Resolution::Skip
            }
        },
    }
}

/// Classify the lines of a remote rule list into per-kind buckets.
///
/// Values are deduplicated but keep insertion order; each non-empty bucket
/// becomes one rule entry tied to the directive's outbound. Unrecognized
/// types (USER-AGENT, URL-REGEX, ...) are ignored. PROCESS-NAME rules are
/// dropped on Apple platforms, which cannot match processes.
pub fn classify_rule_lines(content: &str, outbound: &str, apple_platform: bool) -> Vec<ResolvedRule> {
    let mut buckets: Vec<(RuleKind, Vec<String>, HashSet<String>)> = ALL_RULE_KINDS
        .iter()
        .map(|&kind| (kind, Vec::new(), HashSet::new()))
        .collect();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((rule_type, value)) = line.split_once(',') else {
            continue;
        };
        let (kind, value) = match rule_type {
            "DOMAIN" => (RuleKind::Domain, value),
            "DOMAIN-SUFFIX" => (RuleKind::DomainSuffix, value),
            "DOMAIN-KEYWORD" => (RuleKind::DomainKeyword, value),
            // Trailing attributes like `,no-resolve` are cut off the value.
            "IP-CIDR" | "IP-CIDR6" => (
                RuleKind::IpCidr,
                value.split(',').next().unwrap_or(""),
            ),
            "PROCESS-NAME" => {
                if apple_platform {
                    continue;
                }
                (RuleKind::ProcessName, value)
            }
            _ => continue,
        };
        if value.is_empty() {
            continue;
        }
        let entry = &mut buckets[bucket_index(kind)];
        if entry.2.insert(value.to_string()) {
            entry.1.push(value.to_string());
        }
    }

    buckets
        .into_iter()
        .filter(|(_, values, _)| !values.is_empty())
        .map(|(kind, values, _)| ResolvedRule::Values {
            kind,
            values,
            outbound: outbound.to_string(),
        })
        .collect()
}

/// Index of a kind within the `ALL_RULE_KINDS` bucket layout.
fn bucket_index(kind: RuleKind) -> usize {
    match kind {
        RuleKind::Domain => 0,
        RuleKind::DomainSuffix => 1,
        RuleKind::DomainKeyword => 2,
        RuleKind::IpCidr => 3,
        RuleKind::ProcessName => 4,
    }
}

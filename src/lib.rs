//! linkhub - proxy subscription converter
//!
//! Aggregates share links and remote subscriptions into a canonical node
//! list, then renders that list as a Base64 link blob, a sing-box JSON
//! config, or a Clash text config driven by an external group/ruleset
//! template.

pub mod generator;
pub mod models;
pub mod parser;
pub mod rulesets;
pub mod settings;
pub mod utils;

use std::str::FromStr;

use log::info;
use thiserror::Error;

use crate::settings::Settings;

pub use crate::generator::{generate_clash_config, generate_singbox_config, proxies_to_sub, proxy_to_link};
pub use crate::models::{Proxy, ProxyGroupConfig, ProxySettings, ProxyType};
pub use crate::parser::{expand_entries, parse_link, parse_proxy_groups, parse_ruleset_directives};
pub use crate::rulesets::resolve_rulesets;

/// Failures surfaced to the caller. Anything recoverable (one bad link, one
/// unreachable rule list) is handled further down and never reaches here.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no valid nodes found in the input")]
    NoValidNodes,
    #[error("failed to fetch template '{url}': {reason}")]
    TemplateUnavailable { url: String, reason: String },
    #[error("failed to serialize generated config: {0}")]
    Generate(String),
}

/// The artifact a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// Newline-joined share links, whole blob Base64-wrapped.
    Links,
    /// sing-box JSON document.
    SingBox,
    /// Clash text document.
    Clash,
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "links" | "link" | "sub" => Ok(TargetFormat::Links),
            "singbox" | "sing-box" => Ok(TargetFormat::SingBox),
            "clash" => Ok(TargetFormat::Clash),
            other => Err(format!(
                "unknown target format '{}', expected links, singbox or clash",
                other
            )),
        }
    }
}

/// Fetch the group/ruleset template. Unlike node and ruleset fetches, a
/// missing template is fatal: there is nothing sensible to generate without
/// it.
pub async fn fetch_template(url: &str, settings: &Settings) -> Result<String, ConvertError> {
    utils::http::web_get(url, &settings.user_agent)
        .await
        .map_err(|reason| ConvertError::TemplateUnavailable {
            url: url.to_string(),
            reason,
        })
}

/// Run one full conversion: expand entries, resolve the template, generate.
///
/// `template` is the raw template text; it is ignored for [`TargetFormat::Links`],
/// which needs no grouping information.
pub async fn convert(
    entries: &[String],
    template: &str,
    format: TargetFormat,
    settings: &Settings,
) -> Result<String, ConvertError> {
    let nodes = expand_entries(entries, settings).await;
    if nodes.is_empty() {
        return Err(ConvertError::NoValidNodes);
    }
    info!("Aggregated {} nodes from {} entries", nodes.len(), entries.len());

    match format {
        TargetFormat::Links => Ok(proxies_to_sub(&nodes)),
        TargetFormat::SingBox => {
            let groups = parse_proxy_groups(template);
            let directives = parse_ruleset_directives(template);
            let resolved = resolve_rulesets(&directives, settings).await;
            let config = generate_singbox_config(&nodes, &groups, &resolved, settings);
            serde_json::to_string_pretty(&config).map_err(|e| ConvertError::Generate(e.to_string()))
        }
        TargetFormat::Clash => {
            let groups = parse_proxy_groups(template);
            let directives = parse_ruleset_directives(template);
            let resolved = resolve_rulesets(&directives, settings).await;
            Ok(generate_clash_config(&nodes, &groups, &resolved, settings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES: &[&str] = &[
        "ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#HK-1",
        "trojan://pw@5.6.7.8:443?sni=cdn.com#US-1",
    ];

    fn entries() -> Vec<String> {
        ENTRIES.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_target_format_from_str() {
        assert_eq!("links".parse::<TargetFormat>().unwrap(), TargetFormat::Links);
        assert_eq!("sing-box".parse::<TargetFormat>().unwrap(), TargetFormat::SingBox);
        assert_eq!("Clash".parse::<TargetFormat>().unwrap(), TargetFormat::Clash);
        assert!("yaml".parse::<TargetFormat>().is_err());
    }

    #[tokio::test]
    async fn test_convert_rejects_empty_input() {
        let settings = Settings::default();
        let result = convert(
            &["not a link".to_string()],
            "",
            TargetFormat::Links,
            &settings,
        )
        .await;
        assert!(matches!(result, Err(ConvertError::NoValidNodes)));
    }

    #[tokio::test]
    async fn test_convert_links_round_trips() {
        let settings = Settings::default();
        let blob = convert(&entries(), "", TargetFormat::Links, &settings)
            .await
            .unwrap();
        let decoded = utils::base64::base64_decode(&blob).unwrap();
        assert_eq!(decoded.lines().count(), 2);
        assert!(decoded.lines().all(|line| parse_link(line).is_some()));
    }

    #[tokio::test]
    async fn test_convert_clash_with_builtin_rules() {
        let settings = Settings::default();
        let template = "\
custom_proxy_group=Proxy`select`(HK|US)`DIRECT
ruleset=DIRECT,[]GEOIP,CN
ruleset=Proxy,[]MATCH
";
        let config = convert(&entries(), template, TargetFormat::Clash, &settings)
            .await
            .unwrap();
        assert!(config.contains("  - name: \"Proxy\""));
        assert!(config.contains("  - GEOIP,CN,DIRECT\n"));
        assert!(config.ends_with("  - MATCH,Proxy\n"));
    }

    #[tokio::test]
    async fn test_convert_singbox_final_override() {
        let settings = Settings::default();
        let template = "ruleset=DIRECT,[]FINAL\n";
        let output = convert(&entries(), template, TargetFormat::SingBox, &settings)
            .await
            .unwrap();
        let config: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(config["route"]["final"], serde_json::json!("direct"));
        assert!(config["outbounds"].as_array().unwrap().len() >= 5);
    }
}

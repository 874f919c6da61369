//! Clash configuration generation.
//!
//! Unlike the sing-box generator this one emits indented text directly: the
//! output is the fixed preamble followed by `proxies:`, `proxy-groups:` and
//! `rules:` sections. Scalar strings are double-quoted so remarks with
//! colons or emoji survive; list members under groups stay bare, matching
//! what Clash expects for group references.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::models::{Proxy, ProxyGroupConfig, ProxyGroupType, ProxySettings, ResolvedRule, ResolvedRules, RuleKind};
use crate::settings::{Settings, CLASH_BASE_CONFIG};
use crate::utils::matcher::{resolve_group, GroupMember};

/// Build the complete Clash document.
pub fn generate_clash_config(
    nodes: &[Proxy],
    groups: &[ProxyGroupConfig],
    resolved: &ResolvedRules,
    settings: &Settings,
) -> String {
    let tags: Vec<String> = nodes.iter().map(|node| node.tag()).collect();

    let mut out = String::from(CLASH_BASE_CONFIG);
    out.push('\n');

    out.push_str("\nproxies:\n");
    for node in nodes {
        write_proxy(&mut out, &proxy_mapping(node));
    }

    out.push_str("\nproxy-groups:\n");
    for group in groups {
        write_group(&mut out, group, &tags, settings);
    }

    out.push_str("\nrules:\n");
    for rule in &resolved.rules {
        write_rule(&mut out, rule);
    }
    let final_outbound = if resolved.final_outbound == "direct" {
        "DIRECT"
    } else {
        resolved.final_outbound.as_str()
    };
    let _ = writeln!(out, "  - MATCH,{}", final_outbound);

    out
}

/// Serialize one proxy mapping as an indented block item. Nested objects
/// recurse with two extra spaces; arrays are written inline; nulls are
/// skipped.
fn write_proxy(out: &mut String, proxy: &Value) {
    out.push_str("  -");
    write_value(out, proxy, 4);
    out.push('\n');
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    let Some(map) = value.as_object() else {
        return;
    };
    for (key, value) in map {
        let spaces = " ".repeat(indent);
        match value {
            Value::Null => {}
            Value::Object(_) => {
                let _ = write!(out, "\n{}{}:", spaces, key);
                write_value(out, value, indent + 2);
            }
            Value::Array(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => format!("\"{}\"", s),
                        other => other.to_string(),
                    })
                    .collect();
                let _ = write!(out, "\n{}{}: [{}]", spaces, key, rendered.join(", "));
            }
            Value::String(s) => {
                let _ = write!(out, "\n{}{}: \"{}\"", spaces, key, s);
            }
            other => {
                let _ = write!(out, "\n{}{}: {}", spaces, key, other);
            }
        }
    }
}

fn write_group(out: &mut String, group: &ProxyGroupConfig, tags: &[String], settings: &Settings) {
    let _ = writeln!(out, "  - name: \"{}\"", group.name);
    match group.group_type {
        ProxyGroupType::Selector => out.push_str("    type: select\n"),
        ProxyGroupType::UrlTest => {
            let test_url = group.test_url.as_deref().unwrap_or(&settings.test_url);
            out.push_str("    type: url-test\n");
            let _ = writeln!(out, "    url: {}", test_url);
            let _ = writeln!(out, "    interval: {}", settings.url_test_interval);
            let _ = writeln!(out, "    tolerance: {}", settings.url_test_tolerance);
        }
    }
    out.push_str("    proxies:\n");

    let members = resolve_group(group, tags);
    if members.is_empty() {
        out.push_str("      - \"DIRECT\"\n");
        return;
    }
    for member in members {
        let name = match member {
            GroupMember::Direct => "DIRECT".to_string(),
            GroupMember::Reject => "REJECT".to_string(),
            GroupMember::Group(name) => name,
            GroupMember::Tag(tag) => tag,
        };
        let _ = writeln!(out, "      - {}", name);
    }
}

fn write_rule(out: &mut String, rule: &ResolvedRule) {
    match rule {
        ResolvedRule::GeoIp { code, outbound } => {
            let _ = writeln!(out, "  - GEOIP,{},{}", code.to_uppercase(), outbound);
        }
        ResolvedRule::Values { kind, values, outbound } => {
            for value in values {
                // IP rules carry no-resolve so matching skips DNS lookups.
                if *kind == RuleKind::IpCidr {
                    let _ = writeln!(out, "  - {},{},{},no-resolve", kind.clash_key(), value, outbound);
                } else {
                    let _ = writeln!(out, "  - {},{},{}", kind.clash_key(), value, outbound);
                }
            }
        }
    }
}

/// Clash field mapping for one node.
fn proxy_mapping(node: &Proxy) -> Value {
    match &node.settings {
        ProxySettings::VMess(s) => {
            let mut mapping = json!({
                "name": node.tag(),
                "type": "vmess",
                "server": node.hostname,
                "port": node.port,
                "uuid": s.id,
                "alterId": s.alter_id,
                "cipher": "auto",
                "udp": true,
            });
            if !s.network.is_empty() {
                mapping["network"] = json!(s.network);
                if s.network == "ws" {
                    mapping["ws-opts"] = json!({
                        "path": default_str(&s.path, "/"),
                        "headers": { "Host": s.host },
                    });
                }
            }
            if s.tls == "tls" {
                mapping["tls"] = json!(true);
                if !s.sni.is_empty() {
                    mapping["servername"] = json!(s.sni);
                }
            }
            mapping
        }
        ProxySettings::Vless(s) => {
            let mut mapping = json!({
                "name": node.tag(),
                "type": "vless",
                "server": node.hostname,
                "port": node.port,
                "uuid": s.id,
                "network": default_str(&s.network, "tcp"),
                "skip-cert-verify": false,
                "tls": true,
            });
            if !s.flow.is_empty() {
                mapping["flow"] = json!(s.flow);
            }
            if !s.sni.is_empty() || !s.host.is_empty() {
                mapping["servername"] = json!(first_non_empty(&s.sni, &s.host));
            }
            if s.security == "reality" {
                mapping["flow"] = json!("xtls-rprx-vision");
                mapping["reality-opts"] = json!({ "public-key": s.public_key });
                mapping["client-fingerprint"] = json!(default_str(&s.fingerprint, "chrome"));
            }
            if s.network == "ws" {
                mapping["ws-opts"] = json!({
                    "path": default_str(&s.path, "/"),
                    "headers": {
                        "Host": first_non_empty(&first_non_empty(&s.host, &s.sni), &node.hostname),
                    },
                });
            }
            mapping
        }
        ProxySettings::Trojan(s) => {
            let mut mapping = json!({
                "name": node.tag(),
                "type": "trojan",
                "server": node.hostname,
                "port": node.port,
                "password": s.password,
                "udp": true,
                "skip-cert-verify": true,
                "network": default_str(&s.network, "tcp"),
            });
            if s.network == "ws" {
                mapping["ws-opts"] = json!({
                    "path": s.path,
                    "headers": { "Host": s.host },
                });
            }
            if !s.sni.is_empty() {
                mapping["sni"] = json!(s.sni);
            }
            if !s.alpn.is_empty() {
                mapping["alpn"] = json!([s.alpn]);
            }
            mapping
        }
        ProxySettings::Shadowsocks(s) => json!({
            "name": node.tag(),
            "type": "ss",
            "server": node.hostname,
            "port": node.port,
            "cipher": s.method,
            "password": s.password,
            "udp": true,
        }),
        ProxySettings::ShadowsocksR(s) => json!({
            "name": node.tag(),
            "type": "ssr",
            "server": node.hostname,
            "port": node.port,
            "cipher": s.method,
            "password": s.password,
            "protocol": s.protocol,
            "protocol-param": s.protocol_param,
            "obfs": s.obfs,
            "obfs-param": s.obfs_param,
            "udp": true,
        }),
        ProxySettings::Hysteria(s) => {
            let mut mapping = json!({
                "name": node.tag(),
                "type": "hysteria",
                "server": node.hostname,
                "port": node.port,
                "auth_str": s.auth,
                "up": s.up,
                "down": s.down,
                "skip-cert-verify": true,
                "sni": s.sni,
                "obfs": s.obfs,
            });
            if !s.alpn.is_empty() {
                mapping["alpn"] = json!([s.alpn]);
            }
            mapping
        }
        ProxySettings::Hysteria2(s) => json!({
            "name": node.tag(),
            "type": "hysteria2",
            "server": node.hostname,
            "port": node.port,
            "password": s.auth,
            "skip-cert-verify": true,
            "sni": s.sni,
            "obfs": s.obfs,
            "obfs-password": s.obfs_param,
        }),
        ProxySettings::Tuic(s) => {
            let mut mapping = json!({
                "name": node.tag(),
                "type": "tuic",
                "server": node.hostname,
                "port": node.port,
                "uuid": s.uuid,
                "password": s.password,
                "congestion-controller": s.congestion_control,
                "udp-relay-mode": s.udp_relay_mode,
                "reduce-rtt": s.reduce_rtt,
                "skip-cert-verify": true,
            });
            if !s.sni.is_empty() {
                mapping["sni"] = json!(s.sni);
            }
            if !s.alpn.is_empty() {
                mapping["alpn"] = json!(s.alpn);
            }
            mapping
        }
    }
}

fn default_str(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn first_non_empty(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else {
        a.to_string()
    }
}

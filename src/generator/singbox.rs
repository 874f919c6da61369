//! sing-box configuration generation.
//!
//! Grafts typed outbounds, group outbounds and route rules onto the static
//! base skeleton. All inputs arrive fully resolved, so this module is pure
//! and its output is deterministic for a given input set.

use serde_json::{json, Map, Value};

use crate::models::{Proxy, ProxyGroupConfig, ProxyGroupType, ProxySettings, ResolvedRule, ResolvedRules};
use crate::settings::{singbox_base_config, Settings};
use crate::utils::matcher::{resolve_group, GroupMember};

/// Build the complete sing-box document.
pub fn generate_singbox_config(
    nodes: &[Proxy],
    groups: &[ProxyGroupConfig],
    resolved: &ResolvedRules,
    settings: &Settings,
) -> Value {
    let tags: Vec<String> = nodes.iter().map(|node| node.tag()).collect();

    let mut outbounds: Vec<Value> = nodes.iter().map(proxy_outbound).collect();
    for group in groups {
        outbounds.push(group_outbound(group, &tags, settings));
    }
    outbounds.push(json!({ "type": "direct", "tag": "direct" }));
    outbounds.push(json!({ "type": "block", "tag": "block" }));
    outbounds.push(json!({ "type": "dns", "tag": "dns-out" }));

    let mut config = singbox_base_config();
    config["outbounds"] = Value::Array(outbounds);
    config["route"] = json!({
        "rules": route_rules(resolved, settings),
        "auto_detect_interface": true,
        "final": map_outbound(&resolved.final_outbound),
    });
    config["experimental"] = json!({});
    config
}

/// `DIRECT`/`REJECT` group names map onto the built-in outbound tags.
fn map_outbound(name: &str) -> String {
    match name {
        "DIRECT" => "direct".to_string(),
        "REJECT" => "block".to_string(),
        other => other.to_string(),
    }
}

fn group_outbound(group: &ProxyGroupConfig, tags: &[String], settings: &Settings) -> Value {
    let mut members: Vec<String> = resolve_group(group, tags)
        .into_iter()
        .map(|member| match member {
            GroupMember::Direct => "direct".to_string(),
            GroupMember::Reject => "block".to_string(),
            GroupMember::Group(name) => name,
            GroupMember::Tag(tag) => tag,
        })
        .collect();
    if members.is_empty() {
        members.push("direct".to_string());
    }

    match group.group_type {
        ProxyGroupType::Selector => json!({
            "type": "selector",
            "tag": group.name,
            "outbounds": members,
        }),
        ProxyGroupType::UrlTest => json!({
            "type": "urltest",
            "tag": group.name,
            "outbounds": members,
            "url": settings.test_url,
            "interval": format!("{}s", settings.url_test_interval),
            "tolerance": settings.url_test_tolerance,
            "interrupt_exist_connections": true,
        }),
    }
}

/// Fixed clash-mode and DNS hijack rules, then the resolved directives in
/// template order.
fn route_rules(resolved: &ResolvedRules, settings: &Settings) -> Vec<Value> {
    let mut rules = vec![
        json!({ "clash_mode": "Global", "outbound": settings.global_mode_group }),
        json!({ "clash_mode": "Direct", "outbound": "direct" }),
        json!({ "protocol": "dns", "outbound": "dns-out" }),
    ];
    for rule in &resolved.rules {
        rules.push(match rule {
            ResolvedRule::GeoIp { code, outbound } => json!({
                "geoip": [code],
                "outbound": map_outbound(outbound),
            }),
            ResolvedRule::Values { kind, values, outbound } => {
                let mut entry = Map::new();
                entry.insert(kind.singbox_key().to_string(), json!(values));
                entry.insert("outbound".to_string(), json!(map_outbound(outbound)));
                Value::Object(entry)
            }
        });
    }
    rules
}

/// One typed outbound object per node.
fn proxy_outbound(node: &Proxy) -> Value {
    let tag = node.tag();
    match &node.settings {
        ProxySettings::VMess(s) => {
            let mut outbound = json!({
                "type": "vmess",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "uuid": s.id,
                "security": "auto",
                "alter_id": s.alter_id,
                "global_padding": false,
                "authenticated_length": true,
                "multiplex": {
                    "enabled": false,
                    "protocol": "smux",
                    "max_streams": 32
                },
                "tls": {
                    "enabled": !s.tls.is_empty(),
                    "server_name": first_non_empty(&[s.sni.as_str(), s.host.as_str()], &node.hostname),
                    "insecure": true
                }
            });
            if !s.alpn.is_empty() {
                outbound["tls"]["alpn"] = json!(split_alpn(&s.alpn));
            }
            if !s.network.is_empty() {
                outbound["transport"] = transport(&s.network, &s.path, &s.host);
            }
            outbound
        }
        ProxySettings::Vless(s) => {
            let mut outbound = json!({
                "type": "vless",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "uuid": s.id,
                "flow": s.flow,
            });
            if s.security == "reality" {
                outbound["tls"] = json!({
                    "enabled": true,
                    "server_name": s.sni,
                    "reality": {
                        "enabled": true,
                        "public_key": s.public_key,
                        "short_id": s.short_id,
                    },
                    "utls": {
                        "enabled": true,
                        "fingerprint": default_str(&s.fingerprint, "chrome"),
                    }
                });
            } else if s.security == "tls" {
                outbound["tls"] = json!({
                    "enabled": true,
                    "server_name": first_non_empty(&[s.sni.as_str(), s.host.as_str()], &node.hostname),
                    "insecure": false,
                    "utls": {
                        "enabled": true,
                        "fingerprint": default_str(&s.fingerprint, "random"),
                    }
                });
            }
            if !s.network.is_empty() && s.network != "tcp" {
                outbound["transport"] = transport(&s.network, &s.path, &s.host);
            }
            outbound
        }
        ProxySettings::Trojan(s) => {
            let mut outbound = json!({
                "type": "trojan",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "password": s.password,
                "tls": {
                    "enabled": true,
                    "server_name": first_non_empty(&[s.sni.as_str()], &node.hostname),
                    "insecure": true
                }
            });
            if s.network != "tcp" {
                outbound["transport"] = transport(&s.network, &s.path, &s.host);
            }
            outbound
        }
        ProxySettings::Shadowsocks(s) => json!({
            "type": "shadowsocks",
            "tag": tag,
            "server": node.hostname,
            "server_port": node.port,
            "method": s.method,
            "password": s.password,
        }),
        ProxySettings::ShadowsocksR(s) => json!({
            "type": "shadowsocksr",
            "tag": tag,
            "server": node.hostname,
            "server_port": node.port,
            "method": s.method,
            "password": s.password,
            "protocol": s.protocol,
            "protocol_param": s.protocol_param,
            "obfs": s.obfs,
            "obfs_param": s.obfs_param,
        }),
        ProxySettings::Hysteria(s) => {
            let mut outbound = json!({
                "type": "hysteria",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "auth_str": s.auth,
                "up_mbps": parse_mbps(&s.up),
                "down_mbps": parse_mbps(&s.down),
                "tls": {
                    "enabled": true,
                    "server_name": first_non_empty(&[s.sni.as_str()], &node.hostname),
                    "insecure": true
                },
                "obfs": s.obfs,
            });
            if !s.alpn.is_empty() {
                outbound["tls"]["alpn"] = json!([s.alpn]);
            }
            outbound
        }
        ProxySettings::Hysteria2(s) => {
            let mut outbound = json!({
                "type": "hysteria2",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "password": s.auth,
                "tls": {
                    "enabled": true,
                    "server_name": first_non_empty(&[s.sni.as_str()], &node.hostname),
                    "insecure": true
                }
            });
            if !s.obfs.is_empty() {
                outbound["obfs"] = json!({ "type": s.obfs, "password": s.obfs_param });
            }
            outbound
        }
        ProxySettings::Tuic(s) => {
            let alpn = if s.alpn.is_empty() {
                vec!["h3".to_string()]
            } else {
                s.alpn.clone()
            };
            json!({
                "type": "tuic",
                "tag": tag,
                "server": node.hostname,
                "server_port": node.port,
                "uuid": s.uuid,
                "password": s.password,
                "congestion_control": s.congestion_control,
                "udp_relay_mode": s.udp_relay_mode,
                "zero_rtt_handshake": s.reduce_rtt,
                "tls": {
                    "enabled": true,
                    "server_name": first_non_empty(&[s.sni.as_str()], &node.hostname),
                    "alpn": alpn,
                    "disable_sni": s.disable_sni,
                }
            })
        }
    }
}

fn transport(network: &str, path: &str, host: &str) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), json!(network));
    map.insert("path".to_string(), json!(default_str(path, "/")));
    if !host.is_empty() {
        map.insert("headers".to_string(), json!({ "Host": host }));
    }
    Value::Object(map)
}

fn first_non_empty(candidates: &[&str], fallback: &str) -> String {
    candidates
        .iter()
        .find(|c| !c.is_empty())
        .unwrap_or(&fallback)
        .to_string()
}

fn default_str(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn split_alpn(alpn: &str) -> Vec<String> {
    alpn.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Bandwidth strings like "100" or garbage; anything unparsable becomes 0.
fn parse_mbps(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProxyGroupType, RuleKind};
    use crate::parser::explodes::parse_link;

    fn sample_nodes() -> Vec<Proxy> {
        vec![
            parse_link("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#HK-1").unwrap(),
            parse_link("trojan://pw@5.6.7.8:443?sni=cdn.com#US-1").unwrap(),
        ]
    }

    #[test]
    fn test_geoip_rule_shape() {
        let resolved = ResolvedRules {
            rules: vec![ResolvedRule::GeoIp {
                code: "cn".to_string(),
                outbound: "PROXY".to_string(),
            }],
            final_outbound: "direct".to_string(),
        };
        let config =
            generate_singbox_config(&sample_nodes(), &[], &resolved, &Settings::default());
        let rules = config["route"]["rules"].as_array().unwrap();
        // Three fixed rules precede the directives.
        assert_eq!(rules[3], json!({ "geoip": ["cn"], "outbound": "PROXY" }));
        assert_eq!(config["route"]["final"], json!("direct"));
    }

    #[test]
    fn test_rule_outbound_literals_are_normalized() {
        let resolved = ResolvedRules {
            rules: vec![ResolvedRule::Values {
                kind: RuleKind::DomainSuffix,
                values: vec!["ads.example.com".to_string()],
                outbound: "REJECT".to_string(),
            }],
            final_outbound: "DIRECT".to_string(),
        };
        let config =
            generate_singbox_config(&sample_nodes(), &[], &resolved, &Settings::default());
        let rules = config["route"]["rules"].as_array().unwrap();
        assert_eq!(
            rules[3],
            json!({ "domain_suffix": ["ads.example.com"], "outbound": "block" })
        );
        assert_eq!(config["route"]["final"], json!("direct"));
    }

    #[test]
    fn test_empty_group_falls_back_to_direct() {
        let mut group = ProxyGroupConfig::new("Unmatched", ProxyGroupType::Selector);
        group.patterns = vec!["ZZZ".to_string()];
        let config = generate_singbox_config(
            &sample_nodes(),
            &[group],
            &ResolvedRules::default(),
            &Settings::default(),
        );
        let outbounds = config["outbounds"].as_array().unwrap();
        let group_outbound = outbounds
            .iter()
            .find(|o| o["tag"] == json!("Unmatched"))
            .unwrap();
        assert_eq!(group_outbound["outbounds"], json!(["direct"]));
    }

    #[test]
    fn test_url_test_group_carries_probe_config() {
        let mut group = ProxyGroupConfig::new("Auto", ProxyGroupType::UrlTest);
        group.patterns = vec!["(HK|US)".to_string()];
        let settings = Settings::default();
        let config = generate_singbox_config(
            &sample_nodes(),
            &[group],
            &ResolvedRules::default(),
            &settings,
        );
        let outbounds = config["outbounds"].as_array().unwrap();
        let auto = outbounds.iter().find(|o| o["tag"] == json!("Auto")).unwrap();
        assert_eq!(auto["type"], json!("urltest"));
        assert_eq!(auto["outbounds"], json!(["HK-1", "US-1"]));
        assert_eq!(auto["url"], json!(settings.test_url));
        assert_eq!(auto["interval"], json!("300s"));
        assert_eq!(auto["tolerance"], json!(50));
    }

    #[test]
    fn test_reality_node_outbound() {
        let node = parse_link(
            "vless://uuid@1.2.3.4:443?security=reality&sni=a.com&pbk=key&sid=01&fp=chrome&type=tcp#R",
        )
        .unwrap();
        let outbound = proxy_outbound(&node);
        assert_eq!(outbound["tls"]["reality"]["public_key"], json!("key"));
        assert_eq!(outbound["tls"]["reality"]["short_id"], json!("01"));
        assert_eq!(outbound["tls"]["utls"]["fingerprint"], json!("chrome"));
        // tcp transport is implicit in sing-box.
        assert!(outbound.get("transport").is_none());
    }

    #[test]
    fn test_tuic_alpn_defaults_to_h3() {
        let node = parse_link("tuic://uuid:pw@h.com:443#T").unwrap();
        let outbound = proxy_outbound(&node);
        assert_eq!(outbound["tls"]["alpn"], json!(["h3"]));
        assert_eq!(outbound["congestion_control"], json!("bbr"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let nodes = sample_nodes();
        let mut group = ProxyGroupConfig::new("Proxy", ProxyGroupType::Selector);
        group.patterns = vec!["(HK|US)".to_string(), "DIRECT".to_string()];
        let groups = vec![group];
        let resolved = ResolvedRules::default();
        let settings = Settings::default();
        let a = generate_singbox_config(&nodes, &groups, &resolved, &settings);
        let b = generate_singbox_config(&nodes, &groups, &resolved, &settings);
        assert_eq!(a.to_string(), b.to_string());
    }
}

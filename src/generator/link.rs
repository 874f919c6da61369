//! Share-link re-encoding.
//!
//! Inverse of `parser::explodes` per variant. Protocol-critical fields
//! (server, port, credential, settings) round-trip; query parameter ordering
//! is fixed but need not match the original byte-for-byte. Encoding never
//! fails: every branch is plain string building.

use serde_json::json;

use crate::models::{Proxy, ProxySettings};
use crate::utils::base64::base64_encode;

/// Re-serialize one node into its canonical share link.
pub fn proxy_to_link(node: &Proxy) -> String {
    match &node.settings {
        ProxySettings::VMess(s) => {
            let config = json!({
                "v": "2",
                "ps": node.remark,
                "add": node.hostname,
                "port": node.port,
                "id": s.id,
                "aid": s.alter_id,
                "net": if s.network.is_empty() { "tcp" } else { s.network.as_str() },
                "type": if s.fake_type.is_empty() { "none" } else { s.fake_type.as_str() },
                "host": s.host,
                "path": s.path,
                "tls": s.tls,
                "sni": s.sni,
                "alpn": s.alpn,
            });
            format!("vmess://{}", base64_encode(&config.to_string()))
        }
        ProxySettings::Vless(s) => {
            let mut params = Vec::new();
            push_param(&mut params, "type", &s.network);
            push_param(&mut params, "security", &s.security);
            push_param(&mut params, "flow", &s.flow);
            push_param(&mut params, "encryption", &s.encryption);
            if s.security == "reality" {
                push_param(&mut params, "pbk", &s.public_key);
                push_param(&mut params, "fp", &s.fingerprint);
                push_param(&mut params, "sid", &s.short_id);
                push_param(&mut params, "spx", &s.spider_x);
            }
            push_param(&mut params, "path", &s.path);
            push_param(&mut params, "host", &s.host);
            push_param(&mut params, "sni", &s.sni);
            push_param(&mut params, "alpn", &s.alpn);
            build_uri_link("vless", &s.id, node, &params)
        }
        ProxySettings::Trojan(s) => {
            let mut params = Vec::new();
            push_param(&mut params, "type", &s.network);
            push_param(&mut params, "security", &s.security);
            push_param(&mut params, "path", &s.path);
            push_param(&mut params, "host", &s.host);
            push_param(&mut params, "sni", &s.sni);
            push_param(&mut params, "alpn", &s.alpn);
            build_uri_link("trojan", &s.password, node, &params)
        }
        ProxySettings::Shadowsocks(s) => {
            let userinfo = base64_encode(&format!("{}:{}", s.method, s.password));
            format!(
                "ss://{}@{}:{}{}",
                userinfo,
                node.hostname,
                node.port,
                fragment(&node.remark)
            )
        }
        ProxySettings::ShadowsocksR(s) => {
            let base = format!(
                "{}:{}:{}:{}:{}:{}",
                node.hostname,
                node.port,
                s.protocol,
                s.method,
                s.obfs,
                base64_encode(&s.password)
            );
            let mut params = Vec::new();
            push_param(&mut params, "protoparam", &base64_encode(&s.protocol_param));
            push_param(&mut params, "obfsparam", &base64_encode(&s.obfs_param));
            if !node.remark.is_empty() {
                params.push(("remarks", base64_encode(&node.remark)));
            }
            format!(
                "ssr://{}",
                base64_encode(&format!("{}/?{}", base, encode_query(&params)))
            )
        }
        ProxySettings::Hysteria(s) => {
            let mut params = Vec::new();
            push_param(&mut params, "protocol", &s.protocol);
            push_param(&mut params, "up", &s.up);
            push_param(&mut params, "down", &s.down);
            push_param(&mut params, "alpn", &s.alpn);
            push_param(&mut params, "obfs", &s.obfs);
            push_param(&mut params, "sni", &s.sni);
            build_uri_link("hysteria", &s.auth, node, &params)
        }
        ProxySettings::Hysteria2(s) => {
            let mut params = Vec::new();
            push_param(&mut params, "sni", &s.sni);
            push_param(&mut params, "obfs", &s.obfs);
            push_param(&mut params, "obfs-password", &s.obfs_param);
            if s.insecure {
                params.push(("insecure", "1".to_string()));
            }
            build_uri_link("hysteria2", &s.auth, node, &params)
        }
        ProxySettings::Tuic(s) => {
            let mut params = Vec::new();
            push_param(&mut params, "congestion_control", &s.congestion_control);
            push_param(&mut params, "udp_relay_mode", &s.udp_relay_mode);
            push_param(&mut params, "alpn", &s.alpn.join(","));
            if s.reduce_rtt {
                params.push(("reduce_rtt", "1".to_string()));
            }
            push_param(&mut params, "sni", &s.sni);
            if s.disable_sni {
                params.push(("disable_sni", "1".to_string()));
            }
            let userinfo = format!("{}:{}", s.uuid, s.password);
            build_uri_link("tuic", &userinfo, node, &params)
        }
    }
}

/// The generic subscription artifact: links joined by newlines, the whole
/// blob Base64-wrapped.
pub fn proxies_to_sub(nodes: &[Proxy]) -> String {
    let links: Vec<String> = nodes.iter().map(proxy_to_link).collect();
    base64_encode(&links.join("\n"))
}

fn push_param(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if !value.is_empty() {
        params.push((key, value.to_string()));
    }
}

fn encode_query(params: &[(&'static str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn fragment(remark: &str) -> String {
    if remark.is_empty() {
        String::new()
    } else {
        format!("#{}", urlencoding::encode(remark))
    }
}

fn build_uri_link(
    scheme: &str,
    userinfo: &str,
    node: &Proxy,
    params: &[(&'static str, String)],
) -> String {
    let authority = if userinfo.is_empty() {
        format!("{}:{}", node.hostname, node.port)
    } else {
        format!("{}@{}:{}", userinfo, node.hostname, node.port)
    };
    let query = encode_query(params);
    let query = if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    };
    format!("{}://{}{}{}", scheme, authority, query, fragment(&node.remark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::explodes::parse_link;

    /// Encode-then-reparse must preserve every protocol-critical field.
    fn assert_round_trip(link: &str) {
        let node = parse_link(link).expect("fixture link must parse");
        let reencoded = proxy_to_link(&node);
        let reparsed = parse_link(&reencoded)
            .unwrap_or_else(|| panic!("re-encoded link failed to parse: {}", reencoded));
        assert_eq!(node, reparsed, "round trip changed fields for {}", link);
    }

    #[test]
    fn test_round_trip_all_protocols() {
        let json = r#"{"v":"2","ps":"VM","add":"1.2.3.4","port":"443","id":"uuid-1","aid":"0","net":"ws","type":"none","host":"h.com","path":"/ws","tls":"tls","sni":"s.com","alpn":"h2"}"#;
        let vmess = format!("vmess://{}", base64_encode(json));
        assert_round_trip(&vmess);
        assert_round_trip(
            "vless://uuid@1.2.3.4:443?security=reality&sni=a.com&pbk=key&fp=chrome&sid=01&type=tcp&flow=xtls-rprx-vision#VL",
        );
        assert_round_trip("trojan://pw@example.com:443?sni=cdn.com&type=ws&path=%2Fx#TR");
        assert_round_trip("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#MyNode");
        {
            let inner = format!(
                "h.com:443:origin:aes-256-cfb:plain:{}/?remarks={}&protoparam={}&obfsparam={}",
                base64_encode("pw"),
                base64_encode("SSR"),
                base64_encode("32"),
                base64_encode("o.com")
            );
            assert_round_trip(&format!("ssr://{}", base64_encode(&inner)));
        }
        assert_round_trip("hysteria://auth@h.com:443?protocol=udp&up=10&down=50&alpn=h3&obfs=x&sni=s.com#HY");
        assert_round_trip(
            "hysteria2://auth@h.com:443?sni=s.com&obfs=salamander&obfs-password=op&insecure=1#HY2",
        );
        assert_round_trip(
            "tuic://uuid:pw@h.com:443?congestion_control=bbr&udp_relay_mode=native&alpn=h3&reduce_rtt=1&sni=s.com#TU",
        );
    }

    #[test]
    fn test_sub_blob_is_base64_of_joined_links() {
        let a = parse_link("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#A").unwrap();
        let b = parse_link("trojan://pw@h.com:443#B").unwrap();
        let blob = proxies_to_sub(&[a.clone(), b.clone()]);
        let decoded = crate::utils::base64::base64_decode(&blob).unwrap();
        let lines: Vec<&str> = decoded.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], proxy_to_link(&a));
        assert_eq!(lines[1], proxy_to_link(&b));
    }

    #[test]
    fn test_unnamed_node_has_no_fragment() {
        let node = parse_link("trojan://pw@h.com:443").unwrap();
        assert!(!proxy_to_link(&node).contains('#'));
    }
}

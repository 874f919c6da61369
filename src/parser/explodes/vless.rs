use super::common::parse_uri_link;
use crate::models::{Proxy, ProxySettings, VlessSettings};
use crate::parser::name_decoder::decode_node_name;

/// Parse a VLESS link into a Proxy.
///
/// Format: `vless://uuid@host:port?params#name`. Reality parameters
/// (`pbk`/`fp`/`sid`/`spx`) ride along as ordinary query parameters.
pub fn explode_vless(vless: &str) -> Option<Proxy> {
    if !vless.starts_with("vless://") {
        return None;
    }
    let uri = parse_uri_link(vless)?;

    Some(Proxy {
        remark: decode_node_name(&uri.fragment, ""),
        hostname: uri.host.clone(),
        port: uri.port,
        settings: ProxySettings::Vless(VlessSettings {
            id: uri.username.clone(),
            flow: uri.param("flow").to_string(),
            encryption: uri.param_or("encryption", "none"),
            network: uri.param_or("type", "tcp"),
            security: uri.param("security").to_string(),
            path: uri.param("path").to_string(),
            host: uri.param("host").to_string(),
            sni: uri.param("sni").to_string(),
            alpn: uri.param("alpn").to_string(),
            public_key: uri.param("pbk").to_string(),
            fingerprint: uri.param("fp").to_string(),
            short_id: uri.param("sid").to_string(),
            spider_x: uri.param("spx").to_string(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reality_vless() {
        let link = "vless://a3482e88-686a-4a58-8126-99c9df64b7bf@1.2.3.4:443?security=reality&sni=apple.com&pbk=abc123&fp=chrome&sid=6ba85179&type=tcp&flow=xtls-rprx-vision#US-Reality";
        let node = explode_vless(link).unwrap();
        assert_eq!(node.remark, "US-Reality");
        assert_eq!(node.hostname, "1.2.3.4");
        assert_eq!(node.port, 443);
        match &node.settings {
            ProxySettings::Vless(s) => {
                assert_eq!(s.id, "a3482e88-686a-4a58-8126-99c9df64b7bf");
                assert_eq!(s.security, "reality");
                assert_eq!(s.public_key, "abc123");
                assert_eq!(s.fingerprint, "chrome");
                assert_eq!(s.short_id, "6ba85179");
                assert_eq!(s.flow, "xtls-rprx-vision");
            }
            _ => panic!("wrong settings variant"),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let node = explode_vless("vless://uuid@h:443#n").unwrap();
        match &node.settings {
            ProxySettings::Vless(s) => {
                assert_eq!(s.encryption, "none");
                assert_eq!(s.network, "tcp");
                assert_eq!(s.security, "");
            }
            _ => panic!("wrong settings variant"),
        }
    }

    #[test]
    fn test_percent_encoded_name() {
        let node = explode_vless("vless://uuid@h:443#HK%20%7C%20IPLC").unwrap();
        assert_eq!(node.remark, "HK | IPLC");
    }
}

use super::common::parse_uri_link;
use crate::models::{Proxy, ProxySettings, TrojanSettings};
use crate::parser::name_decoder::decode_node_name;

/// Parse a Trojan link into a Proxy.
///
/// Format: `trojan://password@host:port?params#name`. The display name falls
/// back to the `remarks` query parameter when the fragment is empty.
pub fn explode_trojan(trojan: &str) -> Option<Proxy> {
    if !trojan.starts_with("trojan://") {
        return None;
    }
    let uri = parse_uri_link(trojan)?;

    let remark = if uri.fragment.is_empty() {
        decode_node_name(uri.param("remarks"), "")
    } else {
        decode_node_name(&uri.fragment, "")
    };

    Some(Proxy {
        remark,
        hostname: uri.host.clone(),
        port: uri.port,
        settings: ProxySettings::Trojan(TrojanSettings {
            password: uri.username.clone(),
            network: uri.param_or("type", "tcp"),
            security: uri.param_or("security", "tls"),
            path: uri.param("path").to_string(),
            host: uri.param("host").to_string(),
            sni: uri.param("sni").to_string(),
            alpn: uri.param("alpn").to_string(),
        }),
    })
}

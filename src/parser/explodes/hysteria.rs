use super::common::parse_uri_link;
use crate::models::{HysteriaSettings, Proxy, ProxySettings};
use crate::parser::name_decoder::decode_node_name;

/// Parse a Hysteria (v1) link into a Proxy.
///
/// Format: `hysteria://[auth@]host:port?params#name`; the display name falls
/// back to the `remarks` query parameter when the fragment is empty.
pub fn explode_hysteria(hysteria: &str) -> Option<Proxy> {
    // hysteria2:// shares the prefix, so the caller dispatches it first.
    if !hysteria.starts_with("hysteria://") {
        return None;
    }
    let uri = parse_uri_link(hysteria)?;

    let remark = if uri.fragment.is_empty() {
        decode_node_name(uri.param("remarks"), "")
    } else {
        decode_node_name(&uri.fragment, "")
    };

    Some(Proxy {
        remark,
        hostname: uri.host.clone(),
        port: uri.port,
        settings: ProxySettings::Hysteria(HysteriaSettings {
            auth: uri.username.clone(),
            protocol: uri.param("protocol").to_string(),
            up: uri.param("up").to_string(),
            down: uri.param("down").to_string(),
            alpn: uri.param("alpn").to_string(),
            obfs: uri.param("obfs").to_string(),
            sni: uri.param("sni").to_string(),
        }),
    })
}

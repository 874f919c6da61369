use super::common::parse_uri_link;
use crate::models::{Hysteria2Settings, Proxy, ProxySettings};
use crate::parser::name_decoder::decode_node_name;

/// Parse a Hysteria2 link into a Proxy.
///
/// Format: `hysteria2://auth@host:port?params#name` with an `obfs-password`
/// query key and an `insecure` boolean flag.
pub fn explode_hysteria2(hysteria2: &str) -> Option<Proxy> {
    if !hysteria2.starts_with("hysteria2://") {
        return None;
    }
    let uri = parse_uri_link(hysteria2)?;

    let remark = if uri.fragment.is_empty() {
        decode_node_name(uri.param("remarks"), "")
    } else {
        decode_node_name(&uri.fragment, "")
    };

    Some(Proxy {
        remark,
        hostname: uri.host.clone(),
        port: uri.port,
        settings: ProxySettings::Hysteria2(Hysteria2Settings {
            auth: uri.username.clone(),
            sni: uri.param("sni").to_string(),
            obfs: uri.param("obfs").to_string(),
            obfs_param: uri.param("obfs-password").to_string(),
            insecure: uri.flag("insecure"),
        }),
    })
}

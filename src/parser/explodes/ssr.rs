use std::collections::HashMap;

use super::parse_port;
use crate::models::{Proxy, ProxySettings, ShadowsocksRSettings};
use crate::parser::name_decoder::decode_node_name;
use crate::utils::base64::url_safe_base64_decode;

/// Parse a ShadowsocksR link into a Proxy.
///
/// Format: `ssr://base64(host:port:protocol:method:obfs:base64(password)/?params)`
/// where `remarks`, `protoparam` and `obfsparam` are each Base64-encoded again.
pub fn explode_ssr(ssr: &str) -> Option<Proxy> {
    let body = ssr.strip_prefix("ssr://")?;
    let decoded = url_safe_base64_decode(body)?;

    let (base, query) = match decoded.split_once("/?") {
        Some((b, q)) => (b, q),
        None => (decoded.as_str(), ""),
    };

    let fields: Vec<&str> = base.split(':').collect();
    if fields.len() < 6 {
        return None;
    }
    let server = fields[0];
    let port = parse_port(fields[1])?;
    if server.is_empty() {
        return None;
    }
    let password = url_safe_base64_decode(fields[5]).unwrap_or_default();

    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let decoded_param = |key: &str| -> String {
        params
            .get(key)
            .and_then(|v| url_safe_base64_decode(v))
            .unwrap_or_default()
    };

    Some(Proxy {
        remark: decode_node_name(&decoded_param("remarks"), ""),
        hostname: server.to_string(),
        port,
        settings: ProxySettings::ShadowsocksR(ShadowsocksRSettings {
            protocol: fields[2].to_string(),
            method: fields[3].to_string(),
            obfs: fields[4].to_string(),
            password,
            protocol_param: decoded_param("protoparam"),
            obfs_param: decoded_param("obfsparam"),
        }),
    })
}

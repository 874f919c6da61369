use serde_json::Value;

use super::parse_port;
use crate::models::{Proxy, ProxySettings, VmessSettings};
use crate::parser::name_decoder::decode_node_name;
use crate::utils::base64::{base64_decode, pad_base64, url_safe_base64_reverse};

/// Parse a VMess link into a Proxy.
///
/// Format: `vmess://base64(json)` where the JSON carries
/// `v,ps,add,port,id,aid,net,type,host,path,tls,sni,alpn`. The Base64 part may
/// use the URL-safe alphabet and omit padding.
pub fn explode_vmess(vmess: &str) -> Option<Proxy> {
    let encoded = vmess.strip_prefix("vmess://")?;
    let normalized = pad_base64(&url_safe_base64_reverse(encoded));
    let decoded = base64_decode(&normalized)?;

    let json: Value = serde_json::from_str(&decoded).ok()?;

    let add = json["add"].as_str()?.to_string();
    if add.is_empty() {
        return None;
    }
    let port = parse_port(&json_field_as_string(&json["port"]))?;
    let id = json["id"].as_str()?.to_string();

    let alter_id = json_field_as_string(&json["aid"]).parse::<u16>().unwrap_or(0);
    let remark = decode_node_name(json["ps"].as_str().unwrap_or(""), "");

    Some(Proxy {
        remark,
        hostname: add,
        port,
        settings: ProxySettings::VMess(VmessSettings {
            id,
            alter_id,
            network: json["net"].as_str().unwrap_or("").to_string(),
            fake_type: json["type"].as_str().unwrap_or("").to_string(),
            host: json["host"].as_str().unwrap_or("").to_string(),
            path: json["path"].as_str().unwrap_or("").to_string(),
            tls: json["tls"].as_str().unwrap_or("").to_string(),
            sni: json["sni"].as_str().unwrap_or("").to_string(),
            alpn: json["alpn"].as_str().unwrap_or("").to_string(),
        }),
    })
}

/// Fields like `port` and `aid` show up as either a JSON string or a number.
fn json_field_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

use super::parse_port;
use crate::models::{Proxy, ProxySettings, ShadowsocksSettings};
use crate::parser::name_decoder::decode_node_name;
use crate::utils::base64::url_safe_base64_decode;

/// Parse a Shadowsocks link into a Proxy.
///
/// Two wire forms exist:
/// * legacy: `ss://base64(method:password@host:port)#name`
/// * modern: `ss://base64(method:password)@host:port#name`
///
/// In the modern form the decoded password is kept exactly as carried; it is
/// not percent- or base64-normalized again.
pub fn explode_ss(ss: &str) -> Option<Proxy> {
    let mut body = ss.strip_prefix("ss://")?;

    let mut remark = String::new();
    if let Some(hash_pos) = body.rfind('#') {
        remark = decode_node_name(&body[hash_pos + 1..], "");
        body = &body[..hash_pos];
    }

    let (method, password, server, port) = if let Some((userinfo, server_info)) =
        body.split_once('@')
    {
        // Modern form: only the user-info segment is Base64.
        let decoded = url_safe_base64_decode(userinfo)?;
        let (method, password) = decoded.split_once(':')?;
        let (server, port) = server_info.split_once(':')?;
        (
            method.to_string(),
            password.to_string(),
            server.to_string(),
            parse_port(port)?,
        )
    } else {
        // Legacy form: the whole body is Base64.
        let decoded = url_safe_base64_decode(body)?;
        let (userinfo, server_info) = decoded.split_once('@')?;
        let (method, password) = userinfo.split_once(':')?;
        let (server, port) = server_info.split_once(':')?;
        (
            method.to_string(),
            password.to_string(),
            server.to_string(),
            parse_port(port)?,
        )
    };

    if method.is_empty() || server.is_empty() {
        return None;
    }

    Some(Proxy {
        remark,
        hostname: server,
        port,
        settings: ProxySettings::Shadowsocks(ShadowsocksSettings { method, password }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    #[test]
    fn test_modern_form() {
        // base64("aes-256-gcm:password") = "YWVzLTI1Ni1nY206cGFzc3dvcmQ="
        let node = explode_ss("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#MyNode").unwrap();
        assert_eq!(node.hostname, "1.2.3.4");
        assert_eq!(node.port, 8388);
        assert_eq!(node.remark, "MyNode");
        match &node.settings {
            ProxySettings::Shadowsocks(s) => {
                assert_eq!(s.method, "aes-256-gcm");
                assert_eq!(s.password, "password");
            }
            _ => panic!("wrong settings variant"),
        }
    }

    #[test]
    fn test_legacy_form() {
        let link = format!("ss://{}#Legacy", base64_encode("rc4-md5:secret@9.9.9.9:443"));
        let node = explode_ss(&link).unwrap();
        assert_eq!(node.hostname, "9.9.9.9");
        assert_eq!(node.port, 443);
        assert_eq!(node.remark, "Legacy");
        match &node.settings {
            ProxySettings::Shadowsocks(s) => {
                assert_eq!(s.method, "rc4-md5");
                assert_eq!(s.password, "secret");
            }
            _ => panic!("wrong settings variant"),
        }
    }

    #[test]
    fn test_password_with_colon_kept_whole() {
        let link = format!(
            "ss://{}@h:8388",
            base64_encode("chacha20-ietf-poly1305:pa:ss:wd")
        );
        let node = explode_ss(&link).unwrap();
        match &node.settings {
            ProxySettings::Shadowsocks(s) => assert_eq!(s.password, "pa:ss:wd"),
            _ => panic!("wrong settings variant"),
        }
    }

    #[test]
    fn test_malformed() {
        assert!(explode_ss("ss://notbase64!!!").is_none());
        assert!(explode_ss("ss://YWJj@host").is_none()); // no port
    }
}

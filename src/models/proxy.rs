//! Proxy model definitions
//!
//! Contains the canonical in-memory representation of a single proxy endpoint.

/// Represents the protocol of a proxy.
/// This is the canonical enum used for proxy type identification across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    VMess,
    Vless,
    Trojan,
    Shadowsocks,
    ShadowsocksR,
    Hysteria,
    Hysteria2,
    Tuic,
}

impl ProxyType {
    /// Scheme/type identifier as it appears in share links and generated configs.
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::VMess => "vmess",
            ProxyType::Vless => "vless",
            ProxyType::Trojan => "trojan",
            ProxyType::Shadowsocks => "ss",
            ProxyType::ShadowsocksR => "ssr",
            ProxyType::Hysteria => "hysteria",
            ProxyType::Hysteria2 => "hysteria2",
            ProxyType::Tuic => "tuic",
        }
    }
}

/// Protocol-specific settings, one variant per supported protocol.
///
/// Every consumer (link encoder, sing-box generator, Clash generator) matches
/// exhaustively on this enum, so adding a protocol is a compile-time checklist.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxySettings {
    VMess(VmessSettings),
    Vless(VlessSettings),
    Trojan(TrojanSettings),
    Shadowsocks(ShadowsocksSettings),
    ShadowsocksR(ShadowsocksRSettings),
    Hysteria(HysteriaSettings),
    Hysteria2(Hysteria2Settings),
    Tuic(TuicSettings),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VmessSettings {
    pub id: String,
    pub alter_id: u16,
    pub network: String,
    pub fake_type: String,
    pub host: String,
    pub path: String,
    pub tls: String,
    pub sni: String,
    pub alpn: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VlessSettings {
    pub id: String,
    pub flow: String,
    pub encryption: String,
    pub network: String,
    pub security: String,
    pub path: String,
    pub host: String,
    pub sni: String,
    pub alpn: String,
    pub public_key: String,
    pub fingerprint: String,
    pub short_id: String,
    pub spider_x: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrojanSettings {
    pub password: String,
    pub network: String,
    pub security: String,
    pub path: String,
    pub host: String,
    pub sni: String,
    pub alpn: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShadowsocksSettings {
    pub method: String,
    /// Kept in whatever encoding the link carried; never re-encoded on parse.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShadowsocksRSettings {
    pub protocol: String,
    pub method: String,
    pub obfs: String,
    pub password: String,
    pub protocol_param: String,
    pub obfs_param: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HysteriaSettings {
    pub auth: String,
    pub protocol: String,
    pub up: String,
    pub down: String,
    pub alpn: String,
    pub obfs: String,
    pub sni: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hysteria2Settings {
    pub auth: String,
    pub sni: String,
    pub obfs: String,
    pub obfs_param: String,
    pub insecure: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TuicSettings {
    pub uuid: String,
    pub password: String,
    pub congestion_control: String,
    pub udp_relay_mode: String,
    pub alpn: Vec<String>,
    pub reduce_rtt: bool,
    pub sni: String,
    pub disable_sni: bool,
}

/// Canonical representation of one proxy endpoint.
///
/// Immutable once constructed; only the parser creates these, every downstream
/// stage consumes them read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
    pub remark: String,
    pub hostname: String,
    pub port: u16,
    pub settings: ProxySettings,
}

impl Proxy {
    pub fn proxy_type(&self) -> ProxyType {
        match &self.settings {
            ProxySettings::VMess(_) => ProxyType::VMess,
            ProxySettings::Vless(_) => ProxyType::Vless,
            ProxySettings::Trojan(_) => ProxyType::Trojan,
            ProxySettings::Shadowsocks(_) => ProxyType::Shadowsocks,
            ProxySettings::ShadowsocksR(_) => ProxyType::ShadowsocksR,
            ProxySettings::Hysteria(_) => ProxyType::Hysteria,
            ProxySettings::Hysteria2(_) => ProxyType::Hysteria2,
            ProxySettings::Tuic(_) => ProxyType::Tuic,
        }
    }

    /// The tag used to reference this node in group and rule resolution.
    /// Falls back to `type-host:port` when the node carries no display name.
    pub fn tag(&self) -> String {
        if self.remark.is_empty() {
            format!(
                "{}-{}:{}",
                self.proxy_type().as_str(),
                self.hostname,
                self.port
            )
        } else {
            self.remark.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_prefers_remark() {
        let node = Proxy {
            remark: "HK-1".to_string(),
            hostname: "1.2.3.4".to_string(),
            port: 443,
            settings: ProxySettings::Shadowsocks(ShadowsocksSettings::default()),
        };
        assert_eq!(node.tag(), "HK-1");
    }

    #[test]
    fn test_tag_fallback_when_unnamed() {
        let node = Proxy {
            remark: String::new(),
            hostname: "example.com".to_string(),
            port: 8388,
            settings: ProxySettings::Shadowsocks(ShadowsocksSettings::default()),
        };
        assert_eq!(node.tag(), "ss-example.com:8388");
    }
}

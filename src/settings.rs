//! Conversion settings and base configuration documents.
//!
//! Everything the generators need beyond the nodes and the template is passed
//! in through [`Settings`] — no global mutable state, so two conversions with
//! the same inputs always produce byte-identical output.

use serde_json::{json, Value};

/// Health-check URL used by url-test groups when the template gives no hint.
pub const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";
/// Secondary health-check endpoint, kept for templates that reference it.
pub const BACKUP_TEST_URL: &str = "https://cp.cloudflare.com/generate_204";

/// Knobs for one conversion request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user_agent: String,
    pub default_template_url: String,
    pub test_url: String,
    /// url-test probe interval in seconds.
    pub url_test_interval: u32,
    pub url_test_tolerance: u32,
    /// Maximum nesting depth for subscriptions that reference subscriptions.
    pub max_recursion: usize,
    /// Apple clients cannot match PROCESS-NAME rules; drop them when set.
    pub apple_platform: bool,
    /// Group wired to the sing-box `clash_mode: Global` rule.
    pub global_mode_group: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            user_agent: concat!("linkhub/", env!("CARGO_PKG_VERSION")).to_string(),
            default_template_url:
                "https://raw.githubusercontent.com/Troywww/singbox_conf/main/singbox_clash_conf.txt"
                    .to_string(),
            test_url: DEFAULT_TEST_URL.to_string(),
            url_test_interval: 300,
            url_test_tolerance: 50,
            max_recursion: 4,
            apple_platform: false,
            global_mode_group: "🚀 节点选择".to_string(),
        }
    }
}

impl Settings {
    /// Defaults with environment overrides applied
    /// (`LINKHUB_TEMPLATE_URL`, `LINKHUB_USER_AGENT`).
    pub fn from_env() -> Self {
        let mut settings = Settings::default();
        if let Ok(url) = std::env::var("LINKHUB_TEMPLATE_URL") {
            if !url.is_empty() {
                settings.default_template_url = url;
            }
        }
        if let Ok(ua) = std::env::var("LINKHUB_USER_AGENT") {
            if !ua.is_empty() {
                settings.user_agent = ua;
            }
        }
        settings
    }
}

/// Static sing-box skeleton (log, DNS, NTP, inbounds) that generated
/// outbounds and routes are grafted onto.
pub fn singbox_base_config() -> Value {
    json!({
        "log": {
            "disabled": false,
            "level": "info",
            "timestamp": true
        },
        "dns": {
            "servers": [
                {
                    "tag": "dns_proxy",
                    "address": "tls://1.1.1.1",
                    "address_resolver": "dns_resolver"
                },
                {
                    "tag": "dns_direct",
                    "address": "h3://dns.alidns.com/dns-query",
                    "address_resolver": "dns_resolver",
                    "detour": "direct",
                    "strategy": "ipv4_only"
                },
                {
                    "tag": "dns_fakeip",
                    "address": "fakeip"
                },
                {
                    "tag": "dns_resolver",
                    "address": "223.5.5.5",
                    "detour": "direct"
                },
                {
                    "tag": "block",
                    "address": "rcode://success"
                }
            ],
            "rules": [
                {
                    "outbound": ["any"],
                    "server": "dns_resolver"
                },
                {
                    "geosite": ["category-ads-all"],
                    "server": "dns_block",
                    "disable_cache": true
                },
                {
                    "geosite": ["geolocation-!cn"],
                    "query_type": ["A", "AAAA"],
                    "server": "dns_fakeip"
                },
                {
                    "geosite": ["geolocation-!cn"],
                    "server": "dns_proxy"
                },
                {
                    "domain": [
                        "cloudflare.com",
                        "+.cloudflare.com",
                        "workers.dev",
                        "+.workers.dev"
                    ],
                    "server": "dns_direct"
                }
            ],
            "final": "dns_direct",
            "independent_cache": true,
            "fakeip": {
                "enabled": true,
                "inet4_range": "198.18.0.0/15"
            }
        },
        "ntp": {
            "enabled": true,
            "server": "time.apple.com",
            "server_port": 123,
            "interval": "30m",
            "detour": "direct"
        },
        "inbounds": [
            {
                "type": "mixed",
                "tag": "mixed-in",
                "listen": "0.0.0.0",
                "listen_port": 2080
            },
            {
                "type": "tun",
                "tag": "tun-in",
                "inet4_address": "172.19.0.1/30",
                "auto_route": true,
                "strict_route": true,
                "stack": "mixed",
                "sniff": true
            }
        ]
    })
}

/// Fixed preamble the Clash generator appends its sections to.
pub const CLASH_BASE_CONFIG: &str = "\
port: 7890
socks-port: 7891
allow-lan: true
mode: rule
log-level: info
external-controller: :9090
dns:
  enable: true
  enhanced-mode: fake-ip
  fake-ip-range: 198.18.0.1/16
  nameserver:
    - 223.5.5.5
    - 119.29.29.29
  fallback:
    - 8.8.8.8
    - 8.8.4.4
  default-nameserver:
    - 223.5.5.5
    - 119.29.29.29
  fake-ip-filter:
    - '*.lan'
    - localhost.ptlogin2.qq.com
    - '+.srv.nintendo.net'
    - '+.stun.playstation.net'
    - '+.msftconnecttest.com'
    - '+.msftncsi.com'
    - '+.xboxlive.com'
    - 'msftconnecttest.com'
    - 'xbox.*.microsoft.com'
    - '*.battlenet.com.cn'
    - '*.battlenet.com'
    - '*.blzstatic.cn'
    - '*.battle.net'";

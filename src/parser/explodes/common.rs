use std::collections::HashMap;

use url::Url;

/// Decomposed URI-form share link (vless/trojan/hysteria/hysteria2/tuic).
pub(crate) struct UriLink {
    pub host: String,
    pub port: u16,
    /// User-info username, kept percent-encoded as it appeared on the wire.
    pub username: String,
    pub password: String,
    pub query: HashMap<String, String>,
    pub fragment: String,
}

impl UriLink {
    pub fn param(&self, key: &str) -> &str {
        self.query.get(key).map(|v| v.as_str()).unwrap_or("")
    }

    pub fn param_or(&self, key: &str, default: &'static str) -> String {
        let value = self.param(key);
        if value.is_empty() {
            default.to_string()
        } else {
            value.to_string()
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.param(key) == "1"
    }
}

/// Parse a URI-form link. Host and a non-zero port are mandatory.
pub(crate) fn parse_uri_link(link: &str) -> Option<UriLink> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_string();
    if host.is_empty() {
        return None;
    }
    let port = match url.port() {
        Some(0) | None => return None,
        Some(p) => p,
    };

    let query: HashMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Some(UriLink {
        host,
        port,
        username: url.username().to_string(),
        password: url.password().unwrap_or("").to_string(),
        query,
        fragment: url.fragment().unwrap_or("").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri_link() {
        let uri = parse_uri_link("vless://uuid@example.com:443?flow=x&sni=a.com#Name").unwrap();
        assert_eq!(uri.host, "example.com");
        assert_eq!(uri.port, 443);
        assert_eq!(uri.username, "uuid");
        assert_eq!(uri.param("flow"), "x");
        assert_eq!(uri.param("missing"), "");
        assert_eq!(uri.param_or("type", "tcp"), "tcp");
        assert_eq!(uri.fragment, "Name");
    }

    #[test]
    fn test_missing_port_rejected() {
        assert!(parse_uri_link("vless://uuid@example.com").is_none());
        assert!(parse_uri_link("trojan://pw@example.com:0").is_none());
    }
}

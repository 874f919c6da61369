//! Subscription aggregation.
//!
//! Expands an ordered list of raw entries (literal share links or remote
//! subscription URLs) into a flat, order-preserving list of proxies. Remote
//! bodies may be whole-blob Base64 and may themselves contain nested
//! subscription URLs, which are expanded recursively up to a depth bound.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use url::Url;

use crate::models::Proxy;
use crate::parser::explodes::parse_link;
use crate::settings::Settings;
use crate::utils::base64::{base64_decode, looks_like_base64};
use crate::utils::http::web_get;

/// Share-link schemes that are nodes, not subscriptions.
const NODE_SCHEMES: [&str; 8] = [
    "vmess://",
    "vless://",
    "trojan://",
    "ss://",
    "ssr://",
    "hysteria://",
    "hysteria2://",
    "tuic://",
];

/// Protocol prefixes that validate a whole-blob Base64 subscription body.
const SUB_BODY_SCHEMES: [&str; 5] = ["vmess://", "vless://", "trojan://", "ss://", "ssr://"];

lazy_static! {
    static ref UUID_RE: Regex = Regex::new(
        r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Whether a line is a nested subscription URL rather than a node link.
///
/// Bare UUIDs and anything carrying a node scheme are not subscriptions; only
/// http(s) URLs qualify.
pub fn is_subscription_url(line: &str) -> bool {
    if UUID_RE.is_match(line) {
        return false;
    }
    let lower = line.to_lowercase();
    if NODE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return false;
    }
    match Url::parse(line) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Decode a whole-body Base64 subscription blob.
///
/// The decode is only accepted when the result contains a recognized protocol
/// prefix; otherwise the original content is returned untouched.
pub fn try_base64_decode(content: &str) -> String {
    let trimmed = content.trim();
    if !looks_like_base64(trimmed) {
        return content.to_string();
    }
    match base64_decode(trimmed) {
        Some(decoded)
            if SUB_BODY_SCHEMES
                .iter()
                .any(|scheme| decoded.contains(scheme)) =>
        {
            decoded
        }
        _ => content.to_string(),
    }
}

/// Expand raw entries into proxies, preserving encounter order.
///
/// Remote entries are fetched concurrently; results are merged back in entry
/// order. A fetch failure skips that entry and the aggregation continues.
pub async fn expand_entries(entries: &[String], settings: &Settings) -> Vec<Proxy> {
    let futures = entries.iter().map(|entry| expand_entry(entry, settings));
    join_all(futures).await.into_iter().flatten().collect()
}

async fn expand_entry(entry: &str, settings: &Settings) -> Vec<Proxy> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Vec::new();
    }
    if is_subscription_url(entry) {
        match web_get(entry, &settings.user_agent).await {
            Ok(body) => parse_content(body, settings, 0).await,
            Err(e) => {
                warn!("Failed to fetch subscription '{}': {}", entry, e);
                Vec::new()
            }
        }
    } else if let Some(node) = parse_link(entry) {
        vec![node]
    } else {
        let sample: String = entry.chars().take(48).collect();
        debug!("Skipping unparsable entry: {}", sample);
        Vec::new()
    }
}

/// Parse one subscription body, recursing into nested subscription URLs.
///
/// Boxed because the future is recursive. Depth is bounded by
/// `Settings::max_recursion`; the original design had no bound and a
/// self-referencing subscription would recurse forever.
pub fn parse_content<'a>(
    content: String,
    settings: &'a Settings,
    depth: usize,
) -> BoxFuture<'a, Vec<Proxy>> {
    async move {
        let decoded = try_base64_decode(&content);
        let mut nodes = Vec::new();
        for line in decoded.split_whitespace() {
            if is_subscription_url(line) {
                if depth >= settings.max_recursion {
                    warn!(
                        "Subscription nesting deeper than {} levels, skipping '{}'",
                        settings.max_recursion, line
                    );
                    continue;
                }
                match web_get(line, &settings.user_agent).await {
                    Ok(body) => {
                        nodes.extend(parse_content(body, settings, depth + 1).await);
                    }
                    Err(e) => warn!("Failed to fetch nested subscription '{}': {}", line, e),
                }
            } else if let Some(node) = parse_link(line) {
                nodes.push(node);
            }
        }
        nodes
    }
    .boxed()
}

//! Per-protocol share-link parsers.
//!
//! Each `explode_*` function decodes one link format into a [`Proxy`]. Any
//! malformed input yields `None`; nothing in here panics or propagates errors,
//! the aggregator simply skips the link and moves on.

mod common;
mod hysteria;
mod hysteria2;
mod ss;
mod ssr;
mod trojan;
mod tuic;
mod vless;
mod vmess;

pub use hysteria::explode_hysteria;
pub use hysteria2::explode_hysteria2;
pub use ss::explode_ss;
pub use ssr::explode_ssr;
pub use trojan::explode_trojan;
pub use tuic::explode_tuic;
pub use vless::explode_vless;
pub use vmess::explode_vmess;

use crate::models::Proxy;

/// Parse a single share link, dispatching on the scheme prefix.
/// Unknown schemes and malformed links of any protocol yield `None`.
pub fn parse_link(link: &str) -> Option<Proxy> {
    if link.starts_with("vmess://") {
        explode_vmess(link)
    } else if link.starts_with("vless://") {
        explode_vless(link)
    } else if link.starts_with("trojan://") {
        explode_trojan(link)
    } else if link.starts_with("ss://") {
        explode_ss(link)
    } else if link.starts_with("ssr://") {
        explode_ssr(link)
    } else if link.starts_with("hysteria2://") {
        explode_hysteria2(link)
    } else if link.starts_with("hysteria://") {
        explode_hysteria(link)
    } else if link.starts_with("tuic://") {
        explode_tuic(link)
    } else {
        None
    }
}

/// Parse and validate the port field shared by every protocol parser.
/// Port 0 fails the whole descriptor.
pub(crate) fn parse_port(port: &str) -> Option<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(p) => Some(p),
    }
}

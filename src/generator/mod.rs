pub mod clash;
pub mod link;
pub mod singbox;

pub use clash::generate_clash_config;
pub use link::{proxies_to_sub, proxy_to_link};
pub use singbox::generate_singbox_config;

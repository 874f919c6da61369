pub mod base64;
pub mod http;
pub mod matcher;

pub use base64::{
    base64_decode, base64_encode, looks_like_base64, pad_base64, url_safe_base64_decode,
    url_safe_base64_reverse,
};
pub use http::web_get;

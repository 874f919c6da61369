pub mod explodes;
pub mod name_decoder;
pub mod subparser;
pub mod template;

pub use explodes::parse_link;
pub use name_decoder::decode_node_name;
pub use subparser::expand_entries;
pub use template::{parse_proxy_groups, parse_ruleset_directives};

pub mod ruleset;

pub use ruleset::{classify_rule_lines, resolve_rulesets};

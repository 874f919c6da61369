pub mod proxy;
pub mod proxy_group_config;
pub mod ruleset;

pub use proxy::{
    Hysteria2Settings, HysteriaSettings, Proxy, ProxySettings, ProxyType, ShadowsocksRSettings,
    ShadowsocksSettings, TrojanSettings, TuicSettings, VlessSettings, VmessSettings,
};
pub use proxy_group_config::{ProxyGroupConfig, ProxyGroupType};
pub use ruleset::{
    ResolvedRule, ResolvedRules, RuleKind, RuleSource, RulesetDirective, ALL_RULE_KINDS,
};

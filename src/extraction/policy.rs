//! Acceptance and de-duplication settings for the two extraction modes.
//!
//! The PDF token stream and the HTML blocks reach different conclusions about
//! what makes a usable record. Both policies are kept separate and configurable
//! instead of being merged into one rule.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::model::ShopRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceGate {
    NameAndCity,
    /// Phone, email or website must be present.
    AnyContact,
    AddressOrPhone,
}

impl AcceptanceGate {
    /// Name and city are always required; the gate adds its own condition on top.
    pub fn accepts(&self, shop: &ShopRecord) -> bool {
        if !shop.is_identified() {
            return false;
        }
        match self {
            AcceptanceGate::NameAndCity => true,
            AcceptanceGate::AnyContact => shop.has_contact(),
            AcceptanceGate::AddressOrPhone => shop.has_address() || shop.has_phone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenModePolicy {
    pub gate: AcceptanceGate,
    pub deduplicate: bool,
    pub max_address_fragments: usize,
}

impl Default for TokenModePolicy {
    fn default() -> Self {
        Self {
            gate: AcceptanceGate::AnyContact,
            deduplicate: false,
            max_address_fragments: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockModePolicy {
    pub gate: AcceptanceGate,
    pub deduplicate: bool,
    pub lookahead_lines: usize,
    skip_names: HashSet<String>,
}

impl BlockModePolicy {
    pub fn new(gate: AcceptanceGate, deduplicate: bool, lookahead_lines: usize) -> Self {
        Self {
            gate,
            deduplicate,
            lookahead_lines,
            skip_names: HashSet::new(),
        }
    }

    pub fn with_skip_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skip_names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .collect();
        self
    }

    /// Bold text that is site navigation rather than a shop, compared case-insensitively.
    pub fn skips_name(&self, name: &str) -> bool {
        self.skip_names.contains(&name.trim().to_lowercase())
    }
}

impl Default for BlockModePolicy {
    fn default() -> Self {
        Self::new(AcceptanceGate::AddressOrPhone, true, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopRecord {
        ShopRecord::new("Fabric Hut", "Roanoke")
    }

    #[test]
    fn test_name_and_city_gate() {
        assert!(AcceptanceGate::NameAndCity.accepts(&shop()));
        assert!(!AcceptanceGate::NameAndCity.accepts(&ShopRecord::new("Fabric Hut", "")));
    }

    #[test]
    fn test_any_contact_gate() {
        let mut candidate = shop();
        assert!(!AcceptanceGate::AnyContact.accepts(&candidate));
        candidate.website = Some("www.fabrichut.com".to_string());
        assert!(AcceptanceGate::AnyContact.accepts(&candidate));
    }

    #[test]
    fn test_address_or_phone_gate() {
        let mut candidate = shop();
        candidate.email = Some("a@b.com".to_string());
        assert!(!AcceptanceGate::AddressOrPhone.accepts(&candidate));
        candidate.address = Some("1 Main St".to_string());
        assert!(AcceptanceGate::AddressOrPhone.accepts(&candidate));
    }

    #[test]
    fn test_skip_names_are_case_insensitive() {
        let policy = BlockModePolicy::default().with_skip_names(["Click Here", "facebook"]);
        assert!(policy.skips_name("click here"));
        assert!(policy.skips_name(" FACEBOOK "));
        assert!(!policy.skips_name("Mel's Sewing & Fabric Center"));
    }
}

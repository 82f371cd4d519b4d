use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One directory entry. Latitude and longitude live together in `coordinates`
/// so a record can never carry only one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub geocode_attempted_at: Option<DateTime<Utc>>,
    pub coordinates: Option<Coordinates>,
}

impl ShopRecord {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            ..Self::default()
        }
    }

    /// Name and city are the minimum for a record to leave the extractor.
    pub fn is_identified(&self) -> bool {
        !self.name.is_empty() && !self.city.is_empty()
    }

    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }

    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_contact(&self) -> bool {
        self.has_phone()
            || self.email.as_deref().is_some_and(|e| !e.is_empty())
            || self.website.as_deref().is_some_and(|w| !w.is_empty())
    }

    pub fn set_phone_once(&mut self, value: &str) {
        set_once(&mut self.phone, value);
    }

    pub fn set_email_once(&mut self, value: &str) {
        set_once(&mut self.email, value);
    }

    pub fn set_website_once(&mut self, value: &str) {
        set_once(&mut self.website, value);
    }
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub emitted: usize,
    pub rejected_by_gate: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    pub shops: Vec<ShopRecord>,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub database_path: String,
    pub inserted: usize,
    pub failed: usize,
}

/// A stored shop that still needs coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingShop {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Two-letter state code used for tagging merged rows and address lines.
    pub state: String,
    pub database_path: String,
}

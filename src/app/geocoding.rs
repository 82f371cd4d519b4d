use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::adapters::sqlite::ShopStore;
use crate::domain::model::PendingShop;
use crate::domain::ports::Geocoder;
use crate::utils::error::Result;

/// How a stored address is turned into a geocoder query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFormat {
    /// The stored address already names city and state.
    #[default]
    AsIs,
    /// Street-only addresses get ", <city>, <ST>" appended.
    AppendCityState,
}

impl AddressFormat {
    /// Returns `None` when the shop has no usable address.
    pub fn query_for(&self, shop: &PendingShop, state: &str) -> Option<String> {
        let address = shop.address.as_deref().map(str::trim).unwrap_or_default();
        if address.is_empty() {
            return None;
        }

        match self {
            AddressFormat::AsIs => Some(address.to_string()),
            AddressFormat::AppendCityState => {
                let street = address.trim_end_matches(',').trim_end();
                Some(format!("{}, {}, {}", street, shop.city, state))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeOptions {
    /// Also revisit shops whose earlier attempt failed.
    pub retry_failed: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeReport {
    pub pending: usize,
    pub located: usize,
    pub failed: usize,
    pub rate_limited: usize,
    pub skipped_no_address: usize,
    /// Shops in the database with coordinates once the run finishes.
    pub geocoded_total: usize,
    pub shop_total: usize,
}

pub struct GeocodeRunner<'a, G: Geocoder> {
    store: &'a ShopStore,
    geocoder: G,
    format: AddressFormat,
    state: String,
}

impl<'a, G: Geocoder> GeocodeRunner<'a, G> {
    pub fn new(
        store: &'a ShopStore,
        geocoder: G,
        format: AddressFormat,
        state: impl Into<String>,
    ) -> Self {
        Self {
            store,
            geocoder,
            format,
            state: state.into(),
        }
    }

    /// Geocodes pending shops one at a time. Every shop looked at gets its
    /// attempt time recorded, whatever the outcome, so a failing address is
    /// not retried on the next run unless `retry_failed` is set.
    pub async fn run(&self, options: GeocodeOptions) -> Result<GeocodeReport> {
        self.store.ensure_geocode_columns()?;
        let pending = self
            .store
            .pending_geocode(options.retry_failed, options.limit)?;

        let mut report = GeocodeReport {
            pending: pending.len(),
            ..GeocodeReport::default()
        };
        tracing::info!(
            shops = pending.len(),
            retry_failed = options.retry_failed,
            "geocoding shops"
        );

        for (index, shop) in pending.iter().enumerate() {
            let Some(query) = self.format.query_for(shop, &self.state) else {
                tracing::warn!(
                    shop_number = index + 1,
                    total = pending.len(),
                    name = %shop.name,
                    "skipping shop without address"
                );
                self.store.mark_attempted(shop.id, Utc::now())?;
                report.skipped_no_address += 1;
                continue;
            };

            match self.geocoder.geocode(&query).await {
                Ok(coordinates) => {
                    self.store
                        .record_coordinates(shop.id, coordinates, Utc::now())?;
                    report.located += 1;
                    tracing::info!(
                        shop_number = index + 1,
                        total = pending.len(),
                        name = %shop.name,
                        latitude = coordinates.latitude,
                        longitude = coordinates.longitude,
                        "located shop"
                    );
                }
                Err(e) => {
                    self.store.mark_attempted(shop.id, Utc::now())?;
                    if e.is_rate_limited() {
                        report.rate_limited += 1;
                    } else {
                        report.failed += 1;
                    }
                    tracing::warn!(
                        shop_number = index + 1,
                        total = pending.len(),
                        name = %shop.name,
                        address = %query,
                        error = %e,
                        "geocoding failed"
                    );
                }
            }
        }

        report.geocoded_total = self.store.count_geocoded()?;
        report.shop_total = self.store.count()?;
        tracing::info!(
            located = report.located,
            failed = report.failed,
            rate_limited = report.rate_limited,
            skipped = report.skipped_no_address,
            geocoded_total = report.geocoded_total,
            shop_total = report.shop_total,
            "geocoding complete"
        );
        Ok(report)
    }
}

//! Nominatim (OpenStreetMap) geocoding client.
//!
//! The public instance allows at most one request per second and expects an
//! identifying User-Agent. Requests made through one client are spaced by
//! `min_interval`; a 429 is reported as [`GeocodeError::RateLimited`] so the
//! caller can leave the shop for a later run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::adapters::http::build_client;
use crate::domain::model::Coordinates;
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeocodeError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    async fn wait_for_slot(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn parse_axis(axis: &'static str, value: &str) -> std::result::Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            axis,
            value: value.to_string(),
        })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> std::result::Result<Coordinates, GeocodeError> {
        self.wait_for_slot().await;

        let url = format!("{}/search", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", address), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> = serde_json::from_str(&body)?;
        let place = places.into_iter().next().ok_or(GeocodeError::NoResults)?;

        Ok(Coordinates {
            latitude: parse_axis("latitude", &place.lat)?,
            longitude: parse_axis("longitude", &place.lon)?,
        })
    }
}

// Adapters layer: concrete implementations for external systems (http, html, pdf, sqlite, geocoder, storage)

pub mod html;
pub mod http;
pub mod nominatim;
pub mod pdf;
pub mod sqlite;
pub mod storage;

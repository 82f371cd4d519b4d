pub mod geocoding;
pub mod pipelines;

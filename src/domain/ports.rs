use crate::domain::model::{Coordinates, ExtractionOutcome, LoadReport};
use crate::utils::error::{GeocodeError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Turns raw PDF bytes into flattened text, one visual line per text line.
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> std::result::Result<Coordinates, GeocodeError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Whatever the source yields before the extraction engine sees it.
    type Raw: Send;

    async fn extract(&self) -> Result<Self::Raw>;
    async fn transform(&self, raw: Self::Raw) -> Result<ExtractionOutcome>;
    async fn load(&self, outcome: ExtractionOutcome) -> Result<LoadReport>;
}

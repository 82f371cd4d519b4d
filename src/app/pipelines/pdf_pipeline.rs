use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::http::{build_client, fetch_bytes};
use crate::app::pipelines::persist_outcome;
use crate::config::PdfSourceConfig;
use crate::domain::model::{ExtractionOutcome, LoadReport};
use crate::domain::ports::{PdfTextExtractor, Pipeline, Storage};
use crate::extraction::TokenStreamExtractor;
use crate::utils::error::{DirectoryError, Result};

/// Virginia list: a PDF downloaded once into storage, flattened to text and
/// read as a token stream.
pub struct PdfDirectoryPipeline<S: Storage, X: PdfTextExtractor> {
    config: PdfSourceConfig,
    storage: S,
    decoder: X,
    client: Client,
    extractor: TokenStreamExtractor,
}

impl<S: Storage, X: PdfTextExtractor> PdfDirectoryPipeline<S, X> {
    pub fn new(config: PdfSourceConfig, storage: S, decoder: X) -> Result<Self> {
        let client = build_client(&config.user_agent, config.timeout())?;
        let extractor = TokenStreamExtractor::new(config.classifier()?, config.policy());
        Ok(Self {
            config,
            storage,
            decoder,
            client,
            extractor,
        })
    }

    async fn cached_pdf(&self) -> Result<Vec<u8>> {
        let cache_file = &self.config.cache_file;

        if self.storage.exists(cache_file).await {
            tracing::info!("Using cached PDF {}", cache_file);
        } else {
            tracing::info!("Downloading PDF from {}", self.config.url);
            let bytes = fetch_bytes(&self.client, &self.config.url).await?;
            self.storage.write_file(cache_file, &bytes).await?;
            tracing::info!(bytes = bytes.len(), "Downloaded PDF to {}", cache_file);
        }

        self.storage.read_file(cache_file).await
    }
}

#[async_trait]
impl<S: Storage, X: PdfTextExtractor> Pipeline for PdfDirectoryPipeline<S, X> {
    type Raw = String;

    async fn extract(&self) -> Result<Self::Raw> {
        let pdf = self.cached_pdf().await?;

        tracing::info!("Extracting text from PDF");
        let text = self.decoder.extract_text(&pdf).await?;
        if text.trim().is_empty() {
            return Err(DirectoryError::Parse {
                message: format!("{} has no extractable text", self.config.cache_file),
            });
        }
        Ok(text)
    }

    async fn transform(&self, raw: Self::Raw) -> Result<ExtractionOutcome> {
        Ok(self.extractor.extract(&raw))
    }

    async fn load(&self, outcome: ExtractionOutcome) -> Result<LoadReport> {
        persist_outcome(&self.config.database_path, &outcome)
    }
}

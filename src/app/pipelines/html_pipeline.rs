use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::html::sections_from_html;
use crate::adapters::http::{build_client, fetch_text};
use crate::app::pipelines::persist_outcome;
use crate::config::HtmlSourceConfig;
use crate::domain::model::{ExtractionOutcome, LoadReport};
use crate::domain::ports::Pipeline;
use crate::extraction::{HtmlBlockExtractor, HtmlSection};
use crate::utils::error::{DirectoryError, Result};

/// California list: one web page, city headings followed by verse blocks.
pub struct HtmlDirectoryPipeline {
    config: HtmlSourceConfig,
    client: Client,
    extractor: HtmlBlockExtractor,
}

impl HtmlDirectoryPipeline {
    pub fn new(config: HtmlSourceConfig) -> Result<Self> {
        let client = build_client(&config.user_agent, config.timeout())?;
        let extractor = HtmlBlockExtractor::new(config.classifier(), config.policy());
        Ok(Self {
            config,
            client,
            extractor,
        })
    }
}

#[async_trait]
impl Pipeline for HtmlDirectoryPipeline {
    type Raw = Vec<HtmlSection>;

    async fn extract(&self) -> Result<Self::Raw> {
        tracing::info!("Fetching quilt shops data from {}", self.config.url);
        let html = fetch_text(&self.client, &self.config.url).await?;

        let sections = sections_from_html(&html);
        if sections.is_empty() {
            return Err(DirectoryError::Parse {
                message: format!("{} has no city headings", self.config.url),
            });
        }
        Ok(sections)
    }

    async fn transform(&self, raw: Self::Raw) -> Result<ExtractionOutcome> {
        Ok(self.extractor.extract(&raw))
    }

    async fn load(&self, outcome: ExtractionOutcome) -> Result<LoadReport> {
        persist_outcome(&self.config.database_path, &outcome)
    }
}

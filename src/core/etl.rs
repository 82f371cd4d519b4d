use std::time::Instant;

use crate::domain::model::LoadReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadReport> {
        tracing::info!("Starting ETL process");
        let started = Instant::now();

        tracing::info!("Extracting source");
        let phase = Instant::now();
        let raw = self.pipeline.extract().await?;
        tracing::debug!(elapsed_ms = phase.elapsed().as_millis() as u64, "extract done");

        tracing::info!("Extracting shop records");
        let phase = Instant::now();
        let outcome = self.pipeline.transform(raw).await?;
        tracing::info!(
            shops = outcome.stats.emitted,
            rejected = outcome.stats.rejected_by_gate,
            duplicates = outcome.stats.duplicates,
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Found {} quilt shops",
            outcome.shops.len()
        );

        tracing::info!("Loading shops");
        let report = self.pipeline.load(outcome).await?;
        tracing::info!(
            inserted = report.inserted,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Saved shops to {}",
            report.database_path
        );

        Ok(report)
    }
}

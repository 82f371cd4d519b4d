pub mod html_pipeline;
pub mod pdf_pipeline;

pub use html_pipeline::HtmlDirectoryPipeline;
pub use pdf_pipeline::PdfDirectoryPipeline;

use crate::adapters::sqlite::ShopStore;
use crate::domain::model::{ExtractionOutcome, LoadReport};
use crate::utils::error::Result;

/// Appends the extracted shops to the region database, creating it if needed.
pub(crate) fn persist_outcome(
    database_path: &str,
    outcome: &ExtractionOutcome,
) -> Result<LoadReport> {
    let store = ShopStore::open(database_path)?;
    store.init_schema()?;
    let summary = store.insert_shops(&outcome.shops)?;

    Ok(LoadReport {
        database_path: database_path.to_string(),
        inserted: summary.inserted,
        failed: summary.failed,
    })
}

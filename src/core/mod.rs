pub mod etl;

pub use crate::domain::model::{ExtractionOutcome, LoadReport, ShopRecord};
pub use crate::domain::ports::{Geocoder, PdfTextExtractor, Pipeline, Storage};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod extraction;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use app::geocoding::{AddressFormat, GeocodeOptions, GeocodeReport, GeocodeRunner};
pub use app::pipelines::{HtmlDirectoryPipeline, PdfDirectoryPipeline};
pub use config::DirectoryConfig;
pub use crate::core::etl::EtlEngine;
pub use domain::model::{Coordinates, ShopRecord};
pub use utils::error::{DirectoryError, GeocodeError, Result};

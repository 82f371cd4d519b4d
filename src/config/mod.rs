#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command, SourceKind};
pub use toml_config::{
    DirectoryConfig, GeocoderConfig, HtmlSourceConfig, MergeConfig, PdfSourceConfig,
};

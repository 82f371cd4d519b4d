use std::path::Path;

use anyhow::Context;
use clap::Parser;
use quilt_shops::adapters::nominatim::NominatimGeocoder;
use quilt_shops::adapters::pdf::PdfToText;
use quilt_shops::adapters::sqlite::{merge::merge_databases, ShopStore};
use quilt_shops::config::{Cli, Command, SourceKind};
use quilt_shops::utils::error::ErrorSeverity;
use quilt_shops::utils::{logger, validation::Validate};
use quilt_shops::{
    DirectoryConfig, DirectoryError, EtlEngine, GeocodeOptions, GeocodeRunner,
    HtmlDirectoryPipeline, LocalStorage, PdfDirectoryPipeline, Result,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI arguments: {:?}", cli);

    let config = DirectoryConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: &DirectoryConfig) -> Result<()> {
    match command {
        Command::California => {
            let pipeline = HtmlDirectoryPipeline::new(config.html_source.clone())?;
            let report = EtlEngine::new(pipeline).run().await?;
            println!(
                "Successfully created {} with {} quilt shops",
                report.database_path, report.inserted
            );
        }
        Command::Virginia => {
            let source = &config.pdf_source;
            let storage = LocalStorage::new(&source.storage_dir);
            let decoder = PdfToText::with_program(&source.pdftotext_program);
            let pipeline = PdfDirectoryPipeline::new(source.clone(), storage, decoder)?;
            let report = EtlEngine::new(pipeline).run().await?;
            println!(
                "Successfully created {} with {} quilt shops",
                report.database_path, report.inserted
            );
        }
        Command::Geocode {
            source,
            retry_failed,
            limit,
        } => {
            let (region, format) = match source {
                SourceKind::California => (
                    config.html_source.region(),
                    config.html_source.address_format,
                ),
                SourceKind::Virginia => (
                    config.pdf_source.region(),
                    config.pdf_source.address_format,
                ),
            };
            if !Path::new(&region.database_path).exists() {
                return Err(DirectoryError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!(
                        "{} does not exist; build it before geocoding",
                        region.database_path
                    ),
                )));
            }

            let store = ShopStore::open(&region.database_path)?;
            let geocoder = NominatimGeocoder::new(
                config.geocoder.endpoint.as_str(),
                &config.geocoder.user_agent,
                config.geocoder.timeout(),
                config.geocoder.min_interval(),
            )?;
            let runner = GeocodeRunner::new(&store, geocoder, format, region.state.as_str());
            let report = runner
                .run(GeocodeOptions {
                    retry_failed,
                    limit,
                })
                .await?;
            println!(
                "Geocoded {} of {} shops ({} failed, {} rate limited, {} without address)",
                report.located,
                report.pending,
                report.failed,
                report.rate_limited,
                report.skipped_no_address
            );
            println!(
                "{} of {} shops in {} now have coordinates",
                report.geocoded_total, report.shop_total, region.database_path
            );
        }
        Command::Merge { output } => {
            let output = output.unwrap_or_else(|| config.merge.output_path.clone());
            let report = merge_databases(&output, &config.merge_sources())?;
            for (state, copied) in &report.per_state {
                println!("  {}: {} shops", state, copied);
            }
            println!(
                "Merged {} geocoded shops into {}",
                report.total, report.output_path
            );
        }
    }
    Ok(())
}

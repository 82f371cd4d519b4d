//! Combines per-state databases into one state-tagged table.
//!
//! Only geocoded rows are copied. Sources written before the `website` column
//! existed are read with NULL in its place.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::adapters::sqlite::{has_column, SHOPS_TABLE};
use crate::domain::model::Region;
use crate::utils::error::{DirectoryError, Result};

const MERGED_SCHEMA: &str = "
CREATE TABLE quilt_shops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    phone TEXT,
    email TEXT,
    website TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    geocode_attempted_at DATETIME
);
CREATE INDEX idx_state ON quilt_shops(state);
CREATE INDEX idx_city ON quilt_shops(city);
CREATE INDEX idx_coordinates ON quilt_shops(latitude, longitude);
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output_path: String,
    /// Rows copied from each source, keyed by state code in source order.
    pub per_state: Vec<(String, usize)>,
    pub total: usize,
}

/// Rebuilds `output_path` from scratch out of the geocoded rows of each region.
pub fn merge_databases(output_path: &str, regions: &[Region]) -> Result<MergeReport> {
    ensure_output_is_not_a_source(output_path, regions)?;

    match std::fs::remove_file(output_path) {
        Ok(()) => tracing::debug!(path = output_path, "removed previous merged database"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    if let Some(parent) = Path::new(output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let merged = Connection::open(output_path)?;
    merged.execute_batch(MERGED_SCHEMA)?;

    let mut per_state = Vec::with_capacity(regions.len());
    for region in regions {
        let copied = copy_region(&merged, region)?;
        tracing::info!(
            state = %region.state,
            source = %region.database_path,
            copied,
            "merged region"
        );
        per_state.push((region.state.clone(), copied));
    }

    let total: i64 = merged.query_row("SELECT COUNT(*) FROM quilt_shops", [], |row| row.get(0))?;
    merged.execute_batch("VACUUM")?;

    Ok(MergeReport {
        output_path: output_path.to_string(),
        per_state,
        total: total as usize,
    })
}

/// The output is deleted before the rebuild, so it must not be one of the
/// inputs under any spelling of its path.
fn ensure_output_is_not_a_source(output_path: &str, regions: &[Region]) -> Result<()> {
    let Some(output) = existing_file(output_path)? else {
        return Ok(());
    };
    for region in regions {
        if existing_file(&region.database_path)?.as_ref() == Some(&output) {
            return Err(DirectoryError::InvalidConfigValueError {
                field: "merge.output_path".to_string(),
                value: output_path.to_string(),
                reason: format!("would overwrite the {} source database", region.state),
            });
        }
    }
    Ok(())
}

fn existing_file(path: &str) -> Result<Option<PathBuf>> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn copy_region(merged: &Connection, region: &Region) -> Result<usize> {
    // opening a missing path would silently create an empty database
    if !Path::new(&region.database_path).exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("source database {} not found", region.database_path),
        )
        .into());
    }
    let source = Connection::open(&region.database_path)?;

    if !has_column(&source, SHOPS_TABLE, "latitude")? {
        tracing::warn!(
            source = %region.database_path,
            "source has not been geocoded, nothing to merge"
        );
        return Ok(0);
    }

    let website = if has_column(&source, SHOPS_TABLE, "website")? {
        "website"
    } else {
        "NULL"
    };
    let query = format!(
        "SELECT name, address, city, phone, email, {}, latitude, longitude,
                created_at, geocode_attempted_at
         FROM quilt_shops
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL
         ORDER BY id",
        website
    );

    let mut select = source.prepare(&query)?;
    let tx = merged.unchecked_transaction()?;
    let mut copied = 0;
    {
        let mut insert = tx.prepare_cached(
            "INSERT INTO quilt_shops
                (name, address, city, state, phone, email, website,
                 latitude, longitude, created_at, geocode_attempted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;

        let mut rows = select.query([])?;
        while let Some(row) = rows.next()? {
            insert.execute(params![
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                region.state,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, Option<String>>(9)?,
            ])?;
            copied += 1;
        }
    }
    tx.commit()?;
    Ok(copied)
}

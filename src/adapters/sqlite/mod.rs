//! SQLite persistence for one region's shop table.

pub mod merge;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::model::{Coordinates, PendingShop, ShopRecord};
use crate::utils::error::Result;

pub const SHOPS_TABLE: &str = "quilt_shops";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS quilt_shops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT,
    city TEXT NOT NULL,
    phone TEXT,
    email TEXT,
    website TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_city ON quilt_shops(city);
CREATE INDEX IF NOT EXISTS idx_name ON quilt_shops(name);
";

const GEOCODE_COLUMNS: [(&str, &str); 3] = [
    ("latitude", "REAL"),
    ("longitude", "REAL"),
    ("geocode_attempted_at", "DATETIME"),
];

pub(crate) fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub failed: usize,
}

pub struct ShopStore {
    conn: Connection,
    path: String,
}

impl ShopStore {
    /// Opens (creating if needed) the database file and its parent directory.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: ":memory:".to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Inserts every shop in one transaction. A row that fails is logged and
    /// counted; the rest still go in.
    pub fn insert_shops(&self, shops: &[ShopRecord]) -> Result<InsertSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = InsertSummary::default();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO quilt_shops (name, address, city, phone, email, website)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for shop in shops {
                let result = stmt.execute(params![
                    shop.name,
                    non_empty(&shop.address),
                    shop.city,
                    non_empty(&shop.phone),
                    non_empty(&shop.email),
                    non_empty(&shop.website),
                ]);
                match result {
                    Ok(_) => summary.inserted += 1,
                    Err(e) => {
                        tracing::warn!(name = %shop.name, error = %e, "failed to insert shop");
                        summary.failed += 1;
                    }
                }
            }
        }
        tx.commit()?;

        tracing::info!(
            path = %self.path,
            inserted = summary.inserted,
            failed = summary.failed,
            "stored shops"
        );
        Ok(summary)
    }

    /// Adds the latitude, longitude and attempt-timestamp columns when missing.
    pub fn ensure_geocode_columns(&self) -> Result<()> {
        for (column, kind) in GEOCODE_COLUMNS {
            if !has_column(&self.conn, SHOPS_TABLE, column)? {
                self.conn.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    SHOPS_TABLE, column, kind
                ))?;
                tracing::debug!(column, "added geocode column");
            }
        }

        if let Err(e) = self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_coordinates ON quilt_shops(latitude, longitude)",
        ) {
            tracing::warn!(error = %e, "could not create coordinate index");
        }
        Ok(())
    }

    /// Shops without coordinates, oldest first. Shops that already failed once
    /// are left out unless `include_attempted` is set.
    pub fn pending_geocode(
        &self,
        include_attempted: bool,
        limit: Option<usize>,
    ) -> Result<Vec<PendingShop>> {
        let mut query = String::from(
            "SELECT id, name, address, city FROM quilt_shops WHERE latitude IS NULL",
        );
        if !include_attempted {
            query.push_str(" AND geocode_attempted_at IS NULL");
        }
        query.push_str(" ORDER BY id");
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&query)?;
        let shops = stmt
            .query_map([], |row| {
                Ok(PendingShop {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                    city: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shops)
    }

    pub fn record_coordinates(
        &self,
        id: i64,
        coordinates: Coordinates,
        attempted_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE quilt_shops SET latitude = ?1, longitude = ?2, geocode_attempted_at = ?3
             WHERE id = ?4",
            params![coordinates.latitude, coordinates.longitude, attempted_at, id],
        )?;
        Ok(())
    }

    pub fn mark_attempted(&self, id: i64, attempted_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE quilt_shops SET geocode_attempted_at = ?1 WHERE id = ?2",
            params![attempted_at, id],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quilt_shops", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_geocoded(&self) -> Result<usize> {
        if !has_column(&self.conn, SHOPS_TABLE, "latitude")? {
            return Ok(0);
        }
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quilt_shops WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Loads every stored shop in insertion order, with coordinates when the
    /// table has been through geocoding.
    pub fn all_shops(&self) -> Result<Vec<ShopRecord>> {
        let geocoded = has_column(&self.conn, SHOPS_TABLE, "latitude")?;
        let query = if geocoded {
            "SELECT name, address, city, phone, email, website,
                    latitude, longitude, geocode_attempted_at
             FROM quilt_shops ORDER BY id"
        } else {
            "SELECT name, address, city, phone, email, website,
                    NULL, NULL, NULL
             FROM quilt_shops ORDER BY id"
        };

        let mut stmt = self.conn.prepare(query)?;
        let shops = stmt
            .query_map([], |row| {
                let latitude: Option<f64> = row.get(6)?;
                let longitude: Option<f64> = row.get(7)?;
                Ok(ShopRecord {
                    name: row.get(0)?,
                    address: row.get(1)?,
                    city: row.get(2)?,
                    phone: row.get(3)?,
                    email: row.get(4)?,
                    website: row.get(5)?,
                    geocode_attempted_at: row.get(8)?,
                    coordinates: latitude.zip(longitude).map(|(latitude, longitude)| {
                        Coordinates {
                            latitude,
                            longitude,
                        }
                    }),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shops)
    }

    #[cfg(test)]
    pub(crate) fn find_by_name(&self, name: &str) -> Result<Option<i64>> {
        use rusqlite::OptionalExtension;

        let id = self
            .conn
            .query_row(
                "SELECT id FROM quilt_shops WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn shop(name: &str, address: Option<&str>) -> ShopRecord {
        let mut shop = ShopRecord::new(name, "Roanoke");
        shop.address = address.map(str::to_string);
        shop.phone = Some("540-555-0100".to_string());
        shop
    }

    fn store() -> ShopStore {
        let store = ShopStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = store();
        let summary = store
            .insert_shops(&[shop("Fabric Hut", Some("1 Main St")), shop("Quilt Barn", None)])
            .unwrap();

        assert_eq!(summary, InsertSummary { inserted: 2, failed: 0 });
        let shops = store.all_shops().unwrap();
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].name, "Fabric Hut");
        assert_eq!(shops[0].address.as_deref(), Some("1 Main St"));
        assert_eq!(shops[1].address, None);
        assert_eq!(shops[1].coordinates, None);
    }

    #[test]
    fn test_empty_strings_are_stored_as_null() {
        let store = store();
        let mut record = shop("Fabric Hut", Some(""));
        record.email = Some(String::new());
        store.insert_shops(&[record]).unwrap();

        let stored = &store.all_shops().unwrap()[0];
        assert_eq!(stored.address, None);
        assert_eq!(stored.email, None);
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let store = store();
        store.init_schema().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_geocode_columns_added_once() {
        let store = store();
        store.ensure_geocode_columns().unwrap();
        store.ensure_geocode_columns().unwrap();

        assert!(has_column(&store.conn, SHOPS_TABLE, "latitude").unwrap());
        assert!(has_column(&store.conn, SHOPS_TABLE, "geocode_attempted_at").unwrap());
    }

    #[test]
    fn test_pending_respects_attempts_and_limit() {
        let store = store();
        store
            .insert_shops(&[
                shop("A", Some("1 Main St")),
                shop("B", Some("2 Main St")),
                shop("C", Some("3 Main St")),
            ])
            .unwrap();
        store.ensure_geocode_columns().unwrap();

        let a = store.find_by_name("A").unwrap().unwrap();
        let b = store.find_by_name("B").unwrap().unwrap();
        store
            .record_coordinates(
                a,
                Coordinates {
                    latitude: 37.27,
                    longitude: -79.94,
                },
                Utc::now(),
            )
            .unwrap();
        store.mark_attempted(b, Utc::now()).unwrap();

        let pending: Vec<String> = store
            .pending_geocode(false, None)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(pending, vec!["C"]);

        let retry: Vec<String> = store
            .pending_geocode(true, Some(1))
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(retry, vec!["B"]);

        assert_eq!(store.count_geocoded().unwrap(), 1);
        let stored = store.all_shops().unwrap();
        assert!(stored[0].coordinates.is_some());
        assert!(stored[0].geocode_attempted_at.is_some());
        assert!(stored[1].coordinates.is_none());
        assert!(stored[1].geocode_attempted_at.is_some());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/shops.db");
        let store = ShopStore::open(path.to_str().unwrap()).unwrap();
        store.init_schema().unwrap();

        assert!(path.exists());
        assert_eq!(store.count_geocoded().unwrap(), 0);
    }
}

use async_trait::async_trait;
use httpmock::prelude::*;
use quilt_shops::adapters::sqlite::ShopStore;
use quilt_shops::config::PdfSourceConfig;
use quilt_shops::domain::ports::{PdfTextExtractor, Storage};
use quilt_shops::extraction::{AcceptanceGate, CityHeaderStrategy};
use quilt_shops::{EtlEngine, LocalStorage, PdfDirectoryPipeline, Result};
use tempfile::TempDir;

/// Text as pdftotext lays out the Virginia list.
const VIRGINIA_TEXT: &str = "\
Quilt Shops
2025-V1.0

Abingdon
Quilt Shop of Abingdon
Suite 4
123 Main St
Abingdon, VA 24210
(276) 555-0101
info@abingdonquilts.com
www.abingdonquilts.com
Hours
Mon-Sat 10-5

Roanoke
Fabric Hut
4500 Electric Rd
Roanoke, VA 24018
540-555-0199
Owner
Family owned since 1998

Virginia
Beach
Seaside Stitches
200 Atlantic Ave
Virginia Beach, VA 23451
seaside@stitches.com

Richmond
No Contact Quilts
9 Broad St
Richmond, VA 23219
";

/// Hands back the stored bytes as text, standing in for pdftotext.
struct PassThrough;

#[async_trait]
impl PdfTextExtractor for PassThrough {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(pdf).into_owned())
    }
}

fn config(url: String, dir: &TempDir) -> PdfSourceConfig {
    PdfSourceConfig {
        url,
        database_path: dir.path().join("va.db").to_str().unwrap().to_string(),
        storage_dir: dir.path().join("cache").to_str().unwrap().to_string(),
        ..PdfSourceConfig::default()
    }
}

#[tokio::test]
async fn test_virginia_pdf_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let download = server.mock(|when, then| {
        when.method(GET).path("/2025_3-V1.0-Quilt-Shop-List.pdf");
        then.status(200)
            .header("Content-Type", "application/pdf")
            .body(VIRGINIA_TEXT);
    });

    let mut config = config(server.url("/2025_3-V1.0-Quilt-Shop-List.pdf"), &temp_dir);
    config.city_headers = CityHeaderStrategy::KnownCitiesThenHeuristic;
    config.known_cities = vec!["Virginia Beach".to_string()];
    let database_path = config.database_path.clone();
    let storage = LocalStorage::new(&config.storage_dir);

    let pipeline = PdfDirectoryPipeline::new(config, storage.clone(), PassThrough).unwrap();
    let report = EtlEngine::new(pipeline).run().await.unwrap();

    download.assert();
    assert!(storage.exists("virginia-quilt-shops.pdf").await);
    // the Richmond shop has no phone, email or website
    assert_eq!(report.inserted, 3);

    let shops = ShopStore::open(&database_path).unwrap().all_shops().unwrap();
    let abingdon = &shops[0];
    assert_eq!(abingdon.name, "Quilt Shop of Abingdon");
    assert_eq!(abingdon.city, "Abingdon");
    assert_eq!(abingdon.address.as_deref(), Some("Suite 4, 123 Main St"));
    assert_eq!(abingdon.phone.as_deref(), Some("(276) 555-0101"));
    assert_eq!(abingdon.email.as_deref(), Some("info@abingdonquilts.com"));
    assert_eq!(abingdon.website.as_deref(), Some("www.abingdonquilts.com"));

    assert_eq!(shops[1].name, "Fabric Hut");
    assert_eq!(shops[1].city, "Roanoke");
    assert_eq!(shops[1].phone.as_deref(), Some("540-555-0199"));

    assert_eq!(shops[2].name, "Seaside Stitches");
    assert_eq!(shops[2].city, "Virginia Beach");
    assert_eq!(shops[2].address.as_deref(), Some("200 Atlantic Ave"));
}

#[tokio::test]
async fn test_name_and_city_gate_keeps_contactless_shop() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config("http://127.0.0.1:9/unused.pdf".to_string(), &temp_dir);
    config.acceptance = AcceptanceGate::NameAndCity;
    let storage = LocalStorage::new(&config.storage_dir);
    storage
        .write_file("virginia-quilt-shops.pdf", VIRGINIA_TEXT.as_bytes())
        .await
        .unwrap();

    let pipeline = PdfDirectoryPipeline::new(config, storage, PassThrough).unwrap();
    let report = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(report.inserted, 4);
}

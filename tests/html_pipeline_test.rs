use httpmock::prelude::*;
use quilt_shops::adapters::sqlite::ShopStore;
use quilt_shops::config::HtmlSourceConfig;
use quilt_shops::{DirectoryError, EtlEngine, HtmlDirectoryPipeline};
use tempfile::TempDir;

const CALIFORNIA_PAGE: &str = r#"<!DOCTYPE html>
<html><body><article>
<h2>Quilt Shops in California</h2>
<h3>Anaheim</h3>
<div class="wp-block-group">
<pre class="wp-block-verse"><strong>Mel's Sewing &amp; Fabric Center</strong>
1189 N Euclid St, Anaheim, CA 92801
714-774-3460
info@melssewing.com

<strong>M &amp; L Fabrics Discount Store</strong>
3430 W Ball Rd, Anaheim, CA 92804
714-995-3178</pre>
</div>
<h3>Fullerton</h3>
<pre class="wp-block-verse"><strong>Email Only Quilts</strong>
hello@emailonly.com</pre>
<pre class="wp-block-verse"><strong>Mel's Sewing &amp; Fabric Center</strong>
1189 N Euclid St, Anaheim, CA 92801</pre>
<h3>Anaheim</h3>
<pre class="wp-block-verse"><strong>Mel's Sewing &amp; Fabric Center</strong>
1189 N Euclid St, Anaheim, CA 92801
714-774-3460</pre>
<div><h3>Related Posts</h3></div>
<p><strong>Click Here</strong></p>
</article></body></html>"#;

fn config(url: String, dir: &TempDir) -> HtmlSourceConfig {
    HtmlSourceConfig {
        url,
        database_path: dir.path().join("ca.db").to_str().unwrap().to_string(),
        ..HtmlSourceConfig::default()
    }
}

#[tokio::test]
async fn test_california_page_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/quilt-shops-california/");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(CALIFORNIA_PAGE);
    });

    let config = config(server.url("/quilt-shops-california/"), &temp_dir);
    let database_path = config.database_path.clone();
    let pipeline = HtmlDirectoryPipeline::new(config).unwrap();

    let report = EtlEngine::new(pipeline).run().await.unwrap();
    page.assert();

    // email-only shop fails the address-or-phone gate; the second Anaheim
    // section repeats a shop already seen there
    assert_eq!(report.inserted, 3);
    assert_eq!(report.failed, 0);

    let shops = ShopStore::open(&database_path).unwrap().all_shops().unwrap();
    let summary: Vec<(&str, &str)> = shops
        .iter()
        .map(|s| (s.name.as_str(), s.city.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Mel's Sewing & Fabric Center", "anaheim"),
            ("M & L Fabrics Discount Store", "anaheim"),
            ("Mel's Sewing & Fabric Center", "fullerton"),
        ]
    );

    let mels = &shops[0];
    assert_eq!(
        mels.address.as_deref(),
        Some("1189 N Euclid St, Anaheim, CA 92801")
    );
    assert_eq!(mels.phone.as_deref(), Some("714-774-3460"));
    assert_eq!(mels.email.as_deref(), Some("info@melssewing.com"));
    assert_eq!(shops[1].email, None);
}

#[tokio::test]
async fn test_rerun_appends_rows() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ca");
        then.status(200).body(CALIFORNIA_PAGE);
    });

    for _ in 0..2 {
        let pipeline = HtmlDirectoryPipeline::new(config(server.url("/ca"), &temp_dir)).unwrap();
        EtlEngine::new(pipeline).run().await.unwrap();
    }

    let store = ShopStore::open(temp_dir.path().join("ca.db").to_str().unwrap()).unwrap();
    assert_eq!(store.count().unwrap(), 6);
}

#[tokio::test]
async fn test_server_error_is_fatal_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ca");
        then.status(503);
    });

    let pipeline = HtmlDirectoryPipeline::new(config(server.url("/ca"), &temp_dir)).unwrap();
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, DirectoryError::Status { status: 503, .. }));
    assert!(!temp_dir.path().join("ca.db").exists());
}

#[tokio::test]
async fn test_page_without_city_headings_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ca");
        then.status(200)
            .body("<html><body><p>Temporarily down for maintenance</p></body></html>");
    });

    let pipeline = HtmlDirectoryPipeline::new(config(server.url("/ca"), &temp_dir)).unwrap();
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, DirectoryError::Parse { .. }));
    assert!(!temp_dir.path().join("ca.db").exists());
}

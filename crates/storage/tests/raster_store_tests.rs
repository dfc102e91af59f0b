//! Raster store and cache tests against a local directory and a mock HTTP host.

use std::sync::Arc;

use futures::TryStreamExt;
use storage::{CacheOutcome, RasterCache, RasterStore, RasterStoreConfig, StorageError};
use test_utils::{temp_test_dir, write_rasters};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_store(dir: &tempfile::TempDir) -> Arc<RasterStore> {
    let config = RasterStoreConfig {
        base: dir.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    Arc::new(RasterStore::new(&config).expect("local store"))
}

#[tokio::test]
async fn test_local_get_and_exists() {
    let dir = temp_test_dir();
    write_rasters(dir.path(), &[("PM25_20240501_3km.tif", vec![1, 2, 3, 4])]);
    let store = local_store(&dir);

    assert_eq!(store.get("PM25_20240501_3km.tif").await.unwrap().as_ref(), &[1, 2, 3, 4]);
    assert!(store.exists("PM25_20240501_3km.tif").await.unwrap());
    assert!(!store.exists("PM25_20240502_3km.tif").await.unwrap());
}

#[tokio::test]
async fn test_local_missing_is_not_found() {
    let dir = temp_test_dir();
    let store = local_store(&dir);

    let err = store.get("DEM_VN_3km.tif").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(ref name) if name == "DEM_VN_3km.tif"));
}

#[tokio::test]
async fn test_local_stream() {
    let dir = temp_test_dir();
    let payload: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    write_rasters(dir.path(), &[("DEM_VN_3km.tif", payload.clone())]);
    let store = local_store(&dir);

    let object = store.get_stream("DEM_VN_3km.tif").await.unwrap();
    assert_eq!(object.size, payload.len());
    let chunks: Vec<bytes::Bytes> = object.stream.try_collect().await.unwrap();
    let joined: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(joined, payload);
}

#[tokio::test]
async fn test_cache_hits_and_evictions() {
    let dir = temp_test_dir();
    write_rasters(
        dir.path(),
        &[
            ("a.tif", vec![1; 10]),
            ("b.tif", vec![2; 20]),
            ("c.tif", vec![3; 30]),
        ],
    );
    let cache = RasterCache::new(2, local_store(&dir));

    let (_, outcome) = cache.get_with_outcome("a.tif").await.unwrap();
    assert_eq!(outcome, CacheOutcome::Miss);
    let (_, outcome) = cache.get_with_outcome("a.tif").await.unwrap();
    assert_eq!(outcome, CacheOutcome::Hit);

    cache.get("b.tif").await.unwrap();
    cache.get("c.tif").await.unwrap(); // evicts a.tif

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.total_bytes_cached, 50);
    assert_eq!(cache.len().await, 2);

    let (_, outcome) = cache.get_with_outcome("a.tif").await.unwrap();
    assert_eq!(outcome, CacheOutcome::Miss);
}

#[tokio::test]
async fn test_cache_does_not_keep_failures() {
    let dir = temp_test_dir();
    let cache = RasterCache::new(4, local_store(&dir));

    assert!(cache.get("missing.tif").await.is_err());
    assert!(cache.is_empty().await);

    write_rasters(dir.path(), &[("missing.tif", vec![9])]);
    assert_eq!(cache.get("missing.tif").await.unwrap().as_ref(), &[9]);
}

#[tokio::test]
async fn test_http_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rasters/PM25_20240501_3km.tif"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", "Wed, 01 May 2024 00:00:00 GMT")
                .insert_header("ETag", "\"pm25-20240501\"")
                .set_body_bytes(vec![7u8; 64]),
        )
        .mount(&server)
        .await;

    let config = RasterStoreConfig {
        base: format!("{}/rasters", server.uri()),
        max_retries: 0,
        ..Default::default()
    };
    let store = RasterStore::new(&config).unwrap();

    let bytes = store.get("PM25_20240501_3km.tif").await.unwrap();
    assert_eq!(bytes.len(), 64);
}

//! Common test utilities.

use bytes::Bytes;
use polystore::blob::BlobStorage;

/// Install a test tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Populate a storage backend with files at the given paths.
pub async fn seed_files(storage: &dyn BlobStorage, paths: &[&str]) {
    for path in paths {
        storage
            .write(path, Bytes::copy_from_slice(path.as_bytes()), false)
            .await
            .unwrap();
    }
}

//! JSON persistence for the global store.
//!
//! The file's top level is exactly the key to record mapping, written with four-space
//! indentation and without escaping non-ASCII text.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::Path;

use super::global::GlobalStore;
use super::types::StoreError;

/// Load the store from `path`.
///
/// A missing file yields an empty store. So does a file that does not parse as a store, so
/// that new submissions can still be appended and the corrupt file overwritten.
pub fn load_store(path: &Path) -> Result<GlobalStore, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No persisted store found; starting empty");
            return Ok(GlobalStore::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match serde_json::from_slice::<GlobalStore>(&bytes) {
        Ok(store) => {
            tracing::debug!(path = %path.display(), records = store.len(), "Loaded store");
            Ok(store)
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "Persisted store is malformed; treating it as empty"
            );
            Ok(GlobalStore::new())
        }
    }
}

/// Rewrite the whole store at `path`, creating parent directories as needed.
pub fn save_store(path: &Path, store: &GlobalStore) -> Result<(), StoreError> {
    let bytes = encode_store(store)?;
    if let Some(parent) = parent_dir(path) {
        std::fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
    }
    std::fs::write(path, bytes).map_err(|source| io_error(path, source))?;
    tracing::debug!(path = %path.display(), records = store.len(), "Store written");
    Ok(())
}

/// Async counterpart of [`save_store`] for callers on the tokio runtime.
///
/// The store is encoded on the calling task; only the filesystem work goes through
/// `tokio::fs`.
pub async fn write_store(path: &Path, store: &GlobalStore) -> Result<(), StoreError> {
    let bytes = encode_store(store)?;
    if let Some(parent) = parent_dir(path) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| io_error(path, source))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| io_error(path, source))?;
    tracing::debug!(path = %path.display(), records = store.len(), "Store written");
    Ok(())
}

fn encode_store(store: &GlobalStore) -> Result<Vec<u8>, StoreError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    store.serialize(&mut serializer)?;
    Ok(buffer)
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

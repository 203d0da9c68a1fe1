use crate::domain::model::{RawPayload, SourceKind};
use crate::domain::ports::{DataSource, FetchResult};
use crate::utils::error::FetchError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 本地儲存：讀取 `<base_path>/<key>`
#[derive(Debug, Clone)]
pub struct LocalStoreSource {
    name: String,
    base_path: PathBuf,
    key: String,
}

impl LocalStoreSource {
    pub fn new(base_path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            name: "local_store".to_string(),
            base_path: base_path.into(),
            key: key.into(),
        }
    }

    pub fn full_path(&self) -> PathBuf {
        Path::new(&self.base_path).join(&self.key)
    }
}

#[async_trait]
impl DataSource for LocalStoreSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LocalStore
    }

    async fn fetch(&self) -> FetchResult {
        let full_path = self.full_path();
        tracing::debug!("Reading local store entry: {}", full_path.display());

        let data = tokio::fs::read(&full_path)
            .await
            .map_err(|e| FetchError::StoreUnavailable {
                path: full_path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(RawPayload::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_entry_from_base_path() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("cache.json"), b"{\"title\":\"cached\"}").unwrap();

        let store = LocalStoreSource::new(temp_dir.path(), "cache.json");
        let payload = store.fetch().await.unwrap();

        assert_eq!(payload.as_bytes(), b"{\"title\":\"cached\"}");
    }

    #[tokio::test]
    async fn test_missing_entry_is_store_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStoreSource::new(temp_dir.path(), "nope.json");

        match store.fetch().await {
            Err(FetchError::StoreUnavailable { path, .. }) => assert!(path.ends_with("nope.json")),
            other => panic!("expected StoreUnavailable, got {:?}", other),
        }
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::application::ReferenceSource;
use crate::domain::{ReferenceLoad, ReferencePolicy, ReferenceText};

/// Reads the reference corpus from a UTF-8 text file.
pub struct FileReferenceSource {
    path: PathBuf,
    policy: ReferencePolicy,
    /// Populated only under [`ReferencePolicy::Startup`].
    cached: Option<ReferenceLoad>,
}

impl FileReferenceSource {
    pub async fn new(path: impl Into<PathBuf>, policy: ReferencePolicy) -> Self {
        let path = path.into();
        let cached = match policy {
            ReferencePolicy::Startup => Some(read_reference(&path).await),
            ReferencePolicy::PerRequest => None,
        };
        Self {
            path,
            policy,
            cached,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReferenceSource for FileReferenceSource {
    async fn load(&self) -> ReferenceLoad {
        match &self.cached {
            Some(load) => load.clone(),
            None => read_reference(&self.path).await,
        }
    }

    fn policy(&self) -> ReferencePolicy {
        self.policy
    }
}

/// Reads `path` in full. Missing files, permission problems and invalid
/// UTF-8 all come back as [`ReferenceLoad::Unavailable`].
pub async fn read_reference(path: &Path) -> ReferenceLoad {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            debug!("Loaded {} bytes of reference text from {:?}", content.len(), path);
            ReferenceLoad::Loaded(ReferenceText::new(path, content))
        }
        Err(e) => {
            debug!("Could not read reference text from {:?}: {}", path, e);
            ReferenceLoad::Unavailable {
                path: path.to_path_buf(),
                reason: format!("{}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            FileReferenceSource::new(dir.path().join("nope.txt"), ReferencePolicy::PerRequest).await;

        let load = source.load().await;
        assert!(!load.is_loaded());
        assert_eq!(load.text(), "");
        assert!(load.reason().unwrap().contains("nope.txt"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        let load = read_reference(&path).await;
        assert!(!load.is_loaded());
        assert_eq!(load.text(), "");
    }

    #[tokio::test]
    async fn test_per_request_policy_sees_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.txt");
        std::fs::write(&path, "old").unwrap();

        let source = FileReferenceSource::new(&path, ReferencePolicy::PerRequest).await;
        assert_eq!(source.load().await.text(), "old");

        std::fs::write(&path, "new").unwrap();
        assert_eq!(source.load().await.text(), "new");
    }

    #[tokio::test]
    async fn test_startup_policy_keeps_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.txt");
        std::fs::write(&path, "old").unwrap();

        let source = FileReferenceSource::new(&path, ReferencePolicy::Startup).await;
        std::fs::write(&path, "new").unwrap();

        assert_eq!(source.load().await.text(), "old");
        assert_eq!(source.policy(), ReferencePolicy::Startup);
    }
}

//! Access token persistence
//!
//! The access token is the only thing this crate keeps on disk.

use std::path::PathBuf;

use crate::error::AppError;

/// Where the access token lives between runs
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Persist the token in a file at `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Keep nothing on disk
    pub fn ephemeral() -> Self {
        Self { path: None }
    }

    /// Read the stored token; a missing file or blank content means none
    pub async fn load(&self) -> Result<Option<String>, AppError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read token from {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn save(&self, token: &str) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, token).await.map_err(|e| {
            AppError::Storage(format!("Failed to write token to {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "Access token persisted");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove token at {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

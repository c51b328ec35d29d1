//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Warn when the static site directory is missing and make sure the local
/// blob directory exists when the file backend is in use.
pub async fn ensure_env(static_dir: Option<&str>, data_dir: Option<&str>) -> anyhow::Result<()> {
    if let Some(static_dir) = static_dir {
        if tokio::fs::metadata(static_dir).await.is_err() {
            warn!(%static_dir, "static site directory not found; site assets will 404");
        }
    }
    if let Some(data_dir) = data_dir {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_data_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("common_env_{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();
        ensure_env(Some("/nonexistent-static-dir"), Some(&dir_str)).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}

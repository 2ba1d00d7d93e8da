//! Static JSON snapshots used as a fallback when live data is unavailable

use super::FetchError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load a raw sample from a JSON snapshot file
pub async fn load_snapshot<S: DeserializeOwned>(path: &Path) -> Result<S, FetchError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| FetchError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MarketsSample, SpaceSample};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"price_usd": 64000.0, "change_24h_pct": -3.2}"#).unwrap();

        let sample: MarketsSample = load_snapshot(file.path()).await.unwrap();
        assert_eq!(sample.price_usd, Some(64000.0));
        assert_eq!(sample.change_24h_pct, Some(-3.2));
        assert_eq!(sample.volume_24h_usd, None);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let result: Result<SpaceSample, _> = load_snapshot(Path::new("/nonexistent/space.json")).await;
        assert!(matches!(result, Err(FetchError::SnapshotIo { .. })));
    }

    #[tokio::test]
    async fn test_malformed_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"kp_index: 4").unwrap();

        let result: Result<SpaceSample, _> = load_snapshot(file.path()).await;
        assert!(matches!(result, Err(FetchError::SnapshotParse { .. })));
    }
}

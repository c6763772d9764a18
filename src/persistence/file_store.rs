use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ParamProfit;
use crate::persistence::ParamStore;

/// Flat-file parameter store: one `parameter_{pair}.json` per pair.
///
/// Replacement writes a sibling temp file and renames it over the old one;
/// on the same filesystem the rename is atomic, so a concurrent reader sees
/// either the previous complete ranking or the new one.
#[derive(Debug, Clone)]
pub struct JsonParamStore {
    dir: PathBuf,
}

impl JsonParamStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, pair: &str) -> PathBuf {
        self.dir.join(format!("parameter_{}.json", pair))
    }
}

#[async_trait]
impl ParamStore for JsonParamStore {
    async fn replace_all(&mut self, pair: &str, records: &[ParamProfit]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path(pair);
        let tmp = self.dir.join(format!("parameter_{}.json.tmp", pair));
        let payload = serde_json::to_string(records)?;

        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(pair, count = records.len(), path = %path.display(),
            "replaced parameter ranking");
        Ok(())
    }

    async fn find_ranked(&mut self, pair: &str) -> Result<Vec<ParamProfit>> {
        let path = self.path(pair);
        let payload = match tokio::fs::read_to_string(&path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records: Vec<ParamProfit> = serde_json::from_str(&payload)?;
        records.sort_by(|a, b| {
            b.profit
                .partial_cmp(&a.profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(records)
    }
}

/// Convenience for binaries: the data directory, overridable via `DATA_DIR`.
pub fn default_data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new("data").to_path_buf())
}

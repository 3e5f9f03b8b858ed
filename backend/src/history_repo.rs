//! JSON file-per-instrument history persistence.
//!
//! Format: `{symbol}_bars.json` under the data dir, an envelope of
//! `{symbol, last_update, bars}`. Saves rewrite the whole bounded list;
//! loads of unknown instruments return an empty history.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use market::repository::BarRepository;
use market::types::Bar;

#[derive(Serialize, Deserialize)]
struct HistoryFile {
    symbol: String,
    last_update: String,
    bars: Vec<Bar>,
}

pub struct JsonFileRepository {
    data_dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("create history dir {}", data_dir.display()))?;

        Ok(Self { data_dir })
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_bars.json"))
    }
}

#[async_trait]
impl BarRepository for JsonFileRepository {
    async fn load(&self, symbol: &str) -> anyhow::Result<Vec<Bar>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let file: HistoryFile =
            serde_json::from_str(&raw).with_context(|| format!("decode {}", path.display()))?;

        Ok(file.bars)
    }

    async fn save(&self, symbol: &str, bars: &[Bar]) -> anyhow::Result<()> {
        let file = HistoryFile {
            symbol: symbol.to_string(),
            last_update: Utc::now().to_rfc3339(),
            bars: bars.to_vec(),
        };

        let path = self.path_for(symbol);
        let raw = serde_json::to_string(&file)?;
        tokio::fs::write(&path, raw)
            .await
            .with_context(|| format!("write {}", path.display()))?;

        Ok(())
    }
}

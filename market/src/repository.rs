use async_trait::async_trait;

use crate::types::Bar;

/// Storage seam for per-instrument bar history.
///
/// The pipeline loads on start and saves after appends, both best-effort;
/// implementations own format and location. An unknown instrument loads as
/// an empty history, not an error.
#[async_trait]
pub trait BarRepository: Send + Sync {
    async fn load(&self, symbol: &str) -> anyhow::Result<Vec<Bar>>;

    async fn save(&self, symbol: &str, bars: &[Bar]) -> anyhow::Result<()>;
}

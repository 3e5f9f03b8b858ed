pub mod api;
pub mod errors;
pub mod parser;
pub mod partition;
pub mod types;
pub mod ws;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use market::types::BarEvent;

use crate::binance::errors::FeedError;
use crate::binance::partition::ConnectionGroup;

/// Stream seam between the Binance edge and the processing pipeline.
///
/// One call per connection group: decoded closed-bar events flow into
/// `sender` until the group either ends cleanly (receiver dropped) or fails
/// permanently. Mockable so the pipeline can be driven without a venue.
#[async_trait]
pub trait BarStreamApi: Send + Sync {
    async fn stream_bars(
        &self,
        group: ConnectionGroup,
        sender: Sender<BarEvent>,
    ) -> Result<(), FeedError>;
}

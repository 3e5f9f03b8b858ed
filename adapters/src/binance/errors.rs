use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed feed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("numeric parse error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("invalid feed frame")]
    InvalidFrame,

    #[error("group {group} exhausted its reconnect budget after {attempts} attempts")]
    RetriesExhausted { group: usize, attempts: u32 },
}

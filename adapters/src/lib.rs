pub mod binance;
pub mod notify;

// fanlink-api: Async Rust client for fan-controller dashboards (REST + push channel)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod websocket;

mod curve;
mod dashboard;
mod logs;
mod settings;

pub use client::FanClient;
pub use error::Error;
pub use models::{
    CurveBody, CurvePointRecord, HistoryRange, HistoryRecord, HistoryResponse, LogQuery,
    LogRecord, LogsResponse, PushFrame, SettingsRecord, SettingsUpdate, StatusRecord,
};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{PushConnection, TransportEvent};

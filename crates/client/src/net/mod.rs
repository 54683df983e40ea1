mod config;
mod ws;

pub use config::{ClientConfig, DEFAULT_SERVER_URL};
pub use ws::{WsConnector, WsTransport};

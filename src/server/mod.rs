pub mod config;
mod http_layers;
pub mod image_relay;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use image_relay::{ImageRelay, RelayError};
pub use server::{make_app, run_server};

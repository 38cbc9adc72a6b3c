mod error;
mod relay;
mod server;

pub use error::ApiError;
pub use relay::{RelayOutcome, canned_stream, spawn_live_relay};
pub use server::{AppState, FactGuardServer, create_router};

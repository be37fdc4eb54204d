pub mod config;
pub mod constants;
pub mod error;
pub mod feed;
pub mod geo;
pub mod object;
pub mod processor;
pub mod runtime;
pub mod server;
pub mod store;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::FuseConfig;
pub use error::{FuseError, Result};
pub use store::{Candidate, Store, TickSummary};

//! Upstream feeds: wire protocol parsers and the TCP clients running them.

pub mod client;
pub mod parser;

pub use client::{Backoff, FeedClient};
pub use parser::{AprsParser, GpsParser, Parser, SbsParser, SensorParser, Update, create_parser};

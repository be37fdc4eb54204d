mod traffic;

pub use traffic::{FeedLine, TrafficConfig, TrafficSimulator};

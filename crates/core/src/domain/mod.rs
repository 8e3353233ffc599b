pub mod channel;
pub mod insight;
pub mod metrics;

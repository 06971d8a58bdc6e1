// Pi-hole module - REST client for the ad-blocking appliance

mod client;
mod error;
mod types;

pub use client::PiholeClient;
pub use error::AdBlockerError;
pub use types::{
    AdBlockerStatus, AdBlockerSummary, BlacklistOutcome, BlacklistResult, OrderedCounts,
    TopBlocked,
};

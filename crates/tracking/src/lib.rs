//! Live fleet tracking domain logic.
//!
//! One [`store::PositionStore`] holds the latest known state per vehicle.
//! Reports flow in through [`ingest::IngestGateway`], reads fan out through
//! [`query::QueryService`], and [`sweeper::Sweeper`] periodically persists
//! the Offline classification the read path derives lazily.

pub mod clock;
pub mod config;
pub mod error;
pub mod fleet;
pub mod ingest;
pub mod models;
pub mod provider;
pub mod query;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, SharedClock, SystemClock};
pub use config::Config;
pub use error::*;
pub use models::*;
pub use provider::*;

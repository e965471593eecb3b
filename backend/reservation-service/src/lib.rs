pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;

pub use config::Config;
pub use error::{AppConfigError, ConfigError, ReserverError};
pub use models::{PollOutcome, PollReport, Snapshot};
pub use policy::{CategoryId, PriorityPolicy, RankingMode, TimeDirection, Weight};
pub use services::{AutoReserver, PollingConfig, PollingLoop, SystemClock};

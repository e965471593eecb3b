pub mod classifier;
pub mod polling;
pub mod ranking;
pub mod replay;
pub mod reserver;
pub mod window;

pub use classifier::{classify, classify_snapshot, Classified};
pub use polling::{
    Clock, CommitGateway, PollingConfig, PollingLoop, SnapshotSource, SystemClock,
};
pub use ranking::rank;
pub use replay::{DryRunGateway, FileSnapshotSource};
pub use reserver::{AutoReserver, ReservationRequest, SessionGateway};
pub use window::filter;

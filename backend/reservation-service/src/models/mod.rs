use crate::error::ParseError;
use crate::policy::{CategoryId, SeatClass};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod search;

pub use search::{Credentials, PassengerCount, SearchCriteria, SeatAttribute, SeatLocation, Station};

/// Availability printed in one class column of a departure row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    StandingAvailable,
    Insufficient,
    SoldOut,
}

impl FromStr for SeatStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "예약하기" | "AVAILABLE" => Ok(SeatStatus::Available),
            "입석+좌석" | "STANDING_AVAILABLE" => Ok(SeatStatus::StandingAvailable),
            "좌석부족" | "INSUFFICIENT" => Ok(SeatStatus::Insufficient),
            "매진" | "SOLD_OUT" => Ok(SeatStatus::SoldOut),
            other => Err(ParseError::UnknownStatus(other.to_string())),
        }
    }
}

/// One untyped departure row as scraped from the board.
///
/// `handle` points back at whatever the commit collaborator needs to book
/// this train (a button reference, a train number...). The engine only ever
/// borrows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow<H> {
    /// Departure cell, e.g. `"수서\n10:00"`; the last line holds the time.
    pub departure: String,
    pub standard: String,
    pub premium: String,
    pub handle: H,
}

impl<H> RawRow<H> {
    /// Validate the row once and produce a typed accessor.
    pub fn parse(&self, service_date: NaiveDate) -> Result<InventoryRow<'_, H>, ParseError> {
        let time_text = self
            .departure
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .next_back()
            .ok_or(ParseError::EmptyDeparture)?;

        let time = NaiveTime::parse_from_str(time_text, "%H:%M")
            .map_err(|_| ParseError::InvalidTime(time_text.to_string()))?;

        Ok(InventoryRow {
            departure: service_date.and_time(time),
            standard: self.standard.parse()?,
            premium: self.premium.parse()?,
            handle: &self.handle,
        })
    }
}

/// Typed view of a [`RawRow`], valid for the lifetime of its snapshot.
pub struct InventoryRow<'s, H> {
    pub departure: NaiveDateTime,
    pub standard: SeatStatus,
    pub premium: SeatStatus,
    pub handle: &'s H,
}

impl<'s, H> InventoryRow<'s, H> {
    pub fn status(&self, class: SeatClass) -> SeatStatus {
        match class {
            SeatClass::Standard => self.standard,
            SeatClass::Premium => self.premium,
        }
    }
}

/// Inventory as seen in a single polling iteration.
///
/// Rows carry only a time of day; `service_date` is the date the search was
/// made for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<H> {
    pub service_date: NaiveDate,
    pub rows: Vec<RawRow<H>>,
}

impl<H> Snapshot<H> {
    pub fn new(service_date: NaiveDate, rows: Vec<RawRow<H>>) -> Self {
        Self { service_date, rows }
    }

    pub fn empty(service_date: NaiveDate) -> Self {
        Self::new(service_date, Vec::new())
    }
}

/// A bookable (departure, category) pair borrowed from a snapshot.
pub struct Candidate<'s, H> {
    pub departure: NaiveDateTime,
    pub category: CategoryId,
    pub handle: &'s H,
}

impl<'s, H> Candidate<'s, H> {
    pub fn new(departure: NaiveDateTime, category: CategoryId, handle: &'s H) -> Self {
        Self {
            departure,
            category,
            handle,
        }
    }

    pub fn to_committed(&self) -> CommittedSeat {
        CommittedSeat {
            departure: self.departure,
            category: self.category,
        }
    }
}

impl<'s, H> Clone for Candidate<'s, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'s, H> Copy for Candidate<'s, H> {}

impl<'s, H> fmt::Debug for Candidate<'s, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("departure", &self.departure)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Report of a single commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Accepted,
    /// Someone else got the seat first; expected and recoverable.
    Rejected,
    TransientError,
}

/// The seat that was successfully reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedSeat {
    pub departure: NaiveDateTime,
    pub category: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbortReason {
    #[error("cancelled")]
    Cancelled,

    #[error("snapshot acquisition failed after {attempts} attempts: {last_error}")]
    SnapshotRetriesExhausted { attempts: u32, last_error: String },

    #[error("snapshot source failed: {0}")]
    SnapshotSourceFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Committed(CommittedSeat),
    DeadlineExceeded,
    Aborted(AbortReason),
}

impl PollOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, PollOutcome::Committed(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    pub iterations: u32,
    pub snapshots_acquired: u32,
    pub snapshot_failures: u32,
    pub rows_skipped: u32,
    pub candidates_seen: u32,
    pub commit_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub stats: PollStats,
}

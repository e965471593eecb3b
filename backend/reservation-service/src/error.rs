use crate::policy::RankingMode;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Invalid [`PriorityPolicy`](crate::policy::PriorityPolicy). Raised at
/// construction only, never while polling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("every seat category is disabled")]
    AllCategoriesDisabled,

    #[error("min time {min} is after max time {max}")]
    InvertedWindow {
        min: NaiveDateTime,
        max: NaiveDateTime,
    },

    #[error("preferred instant {preferred} lies outside the departure window")]
    PreferredOutsideWindow { preferred: NaiveDateTime },

    #[error("ranking mode {0:?} needs a preferred instant")]
    MissingPreferredInstant(RankingMode),
}

/// A single malformed inventory row. Recovered locally by skipping the row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("departure cell is empty")]
    EmptyDeparture,

    #[error("invalid departure time: {0:?}")]
    InvalidTime(String),

    #[error("unknown seat status: {0:?}")]
    UnknownStatus(String),
}

/// Failure to read the current inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Navigation or lookup hiccup; worth retrying.
    #[error("transient snapshot failure: {0}")]
    Transient(String),

    /// The collaborator cannot produce snapshots any more.
    #[error("snapshot source failed: {0}")]
    Fatal(String),
}

impl SnapshotError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SnapshotError::Transient(_))
    }
}

/// Invalid search request or credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("member id must be exactly 10 digits")]
    InvalidMemberId,

    #[error("password is empty")]
    EmptyPassword,

    #[error("departure and destination are both {0}")]
    SameStation(String),

    #[error("departure date {0} is in the past")]
    DateInPast(chrono::NaiveDate),

    #[error("at least one passenger is required")]
    NoPassengers,

    #[error("validation failed: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for RequestError {
    fn from(err: validator::ValidationErrors) -> Self {
        RequestError::Validation(err.to_string())
    }
}

/// Failure reported by the session collaborator (login, search form).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("search failed: {0}")]
    SearchFailed(String),

    #[error("session unavailable: {0}")]
    Unavailable(String),
}

/// Failure to load [`Config`](crate::config::Config) from the environment.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid policy: {0}")]
    Policy(#[from] ConfigError),
}

impl From<validator::ValidationErrors> for AppConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppConfigError::Invalid(err.to_string())
    }
}

/// Top-level error of an end-to-end reservation run.
#[derive(Debug, Error)]
pub enum ReserverError {
    #[error("Invalid policy: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, ReserverError>;

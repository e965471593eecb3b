//! Search form inputs
//!
//! The session collaborator types these into the operator's search form; the
//! engine validates them up front so a bad request fails before login.

use crate::error::RequestError;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Stations served by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Station {
    Suseo,
    Dongtan,
    PyeongtaekJije,
    CheonanAsan,
    Osong,
    Daejeon,
    GimcheonGumi,
    Dongdaegu,
    Seodaegu,
    Gyeongju,
    UlsanTongdosa,
    Ulsan,
    Busan,
}

impl Station {
    /// Name as printed on the board and typed into the search form.
    pub fn label(self) -> &'static str {
        match self {
            Station::Suseo => "수서",
            Station::Dongtan => "동탄",
            Station::PyeongtaekJije => "평택지제",
            Station::CheonanAsan => "천안아산",
            Station::Osong => "오송",
            Station::Daejeon => "대전",
            Station::GimcheonGumi => "김천구미",
            Station::Dongdaegu => "동대구",
            Station::Seodaegu => "서대구",
            Station::Gyeongju => "경주",
            Station::UlsanTongdosa => "울산(통도사)",
            Station::Ulsan => "울산",
            Station::Busan => "부산",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Passengers per fare type. The form offers 0..=9 for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PassengerCount {
    #[validate(range(max = 9))]
    pub adult: u8,
    #[validate(range(max = 9))]
    pub elder: u8,
    #[validate(range(max = 9))]
    pub child: u8,
    #[validate(range(max = 9))]
    pub severe_disabled: u8,
    #[validate(range(max = 9))]
    pub mild_disabled: u8,
}

impl Default for PassengerCount {
    fn default() -> Self {
        Self {
            adult: 1,
            elder: 0,
            child: 0,
            severe_disabled: 0,
            mild_disabled: 0,
        }
    }
}

impl PassengerCount {
    pub fn total(&self) -> u32 {
        [
            self.adult,
            self.elder,
            self.child,
            self.severe_disabled,
            self.mild_disabled,
        ]
        .iter()
        .map(|&n| u32::from(n))
        .sum()
    }
}

/// Seat location option; the discriminant is the form's option index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatLocation {
    #[default]
    Default = 0,
    Single = 1,
    Window = 2,
    Aisle = 3,
}

/// Seat attribute option; the discriminant is the form's option index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatAttribute {
    #[default]
    Default = 1,
    Wheelchair = 2,
    ElectricWheelchair = 3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub departure: Station,
    pub destination: Station,
    /// Earliest departure wanted; also picks the date and hour slot.
    pub departure_time: NaiveDateTime,
    #[serde(default)]
    pub passengers: PassengerCount,
    #[serde(default)]
    pub seat_location: SeatLocation,
    #[serde(default)]
    pub seat_attribute: SeatAttribute,
}

impl SearchCriteria {
    pub fn validate(&self, today: NaiveDate) -> Result<(), RequestError> {
        if self.departure == self.destination {
            return Err(RequestError::SameStation(self.departure.to_string()));
        }
        if self.departure_time.date() < today {
            return Err(RequestError::DateInPast(self.departure_time.date()));
        }
        self.passengers.validate()?;
        if self.passengers.total() == 0 {
            return Err(RequestError::NoPassengers);
        }
        Ok(())
    }

    /// The form lists departure hours in two-hour steps starting at 00.
    pub fn search_slot_hour(&self) -> u32 {
        let hour = self.departure_time.hour();
        hour - hour % 2
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub member_id: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    pub fn new(member_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.member_id.len() != 10 || !self.member_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(RequestError::InvalidMemberId);
        }
        if self.password.is_empty() {
            return Err(RequestError::EmptyPassword);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("member_id", &self.member_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

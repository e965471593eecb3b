/// Candidate Classifier
///
/// Turns inventory rows into typed candidates, one per seat class at most.
/// Standing offers are only ever emitted into a standing category; when that
/// category is disabled the offer is dropped rather than booked as a seat.
use crate::models::{Candidate, InventoryRow, SeatStatus, Snapshot};
use crate::policy::{PriorityPolicy, SeatClass};
use tracing::debug;

/// Result of classifying a whole snapshot.
#[derive(Debug)]
pub struct Classified<'s, H> {
    pub candidates: Vec<Candidate<'s, H>>,
    pub rows_skipped: usize,
}

/// Classify one parsed row.
pub fn classify<'s, H>(row: &InventoryRow<'s, H>, policy: &PriorityPolicy) -> Vec<Candidate<'s, H>> {
    let mut candidates = Vec::with_capacity(2);

    for class in SeatClass::ALL {
        let seated = class.seated();
        // Standing is never enabled without its seated counterpart
        if !policy.is_enabled(seated) {
            continue;
        }

        match row.status(class) {
            SeatStatus::Available => {
                candidates.push(Candidate::new(row.departure, seated, row.handle));
            }
            SeatStatus::StandingAvailable => {
                let standing = class.standing();
                if policy.is_enabled(standing) {
                    candidates.push(Candidate::new(row.departure, standing, row.handle));
                }
            }
            SeatStatus::Insufficient | SeatStatus::SoldOut => {}
        }
    }

    candidates
}

/// Parse and classify every row of a snapshot, skipping malformed rows.
pub fn classify_snapshot<'s, H>(
    snapshot: &'s Snapshot<H>,
    policy: &PriorityPolicy,
) -> Classified<'s, H> {
    let mut candidates = Vec::new();
    let mut rows_skipped = 0;

    for (index, raw) in snapshot.rows.iter().enumerate() {
        match raw.parse(snapshot.service_date) {
            Ok(row) => candidates.extend(classify(&row, policy)),
            Err(e) => {
                rows_skipped += 1;
                debug!(row = index, error = %e, "Skipping malformed inventory row");
            }
        }
    }

    Classified {
        candidates,
        rows_skipped,
    }
}

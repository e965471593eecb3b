/// Window Filter
///
/// Keeps candidates departing inside the policy window and far enough in the
/// future that a booking can still complete.
use crate::models::Candidate;
use crate::policy::PriorityPolicy;
use chrono::{Duration, NaiveDateTime};

/// Minimum lead time, in minutes, between now and a departure worth committing to.
pub const LEAD_MARGIN_MINUTES: i64 = 20;

pub fn lead_margin() -> Duration {
    Duration::minutes(LEAD_MARGIN_MINUTES)
}

/// Earliest acceptable departure: after both `min_time` and `now` plus the lead margin.
pub fn effective_min_time(policy: &PriorityPolicy, now: NaiveDateTime) -> NaiveDateTime {
    policy.min_time().max(now + lead_margin())
}

pub fn is_within_window(departure: NaiveDateTime, policy: &PriorityPolicy, now: NaiveDateTime) -> bool {
    departure >= policy.min_time()
        && departure > now + lead_margin()
        && policy.max_time().map_or(true, |max| departure <= max)
}

/// Order-preserving filter; never fails.
pub fn filter<'s, H>(
    candidates: Vec<Candidate<'s, H>>,
    policy: &PriorityPolicy,
    now: NaiveDateTime,
) -> Vec<Candidate<'s, H>> {
    candidates
        .into_iter()
        .filter(|c| is_within_window(c.departure, policy, now))
        .collect()
}

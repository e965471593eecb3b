/// Ranking Module
///
/// Orders filtered candidates according to the policy's ranking mode.
///
/// # Modes
/// - **by-category-then-time** (default): categories by descending weight,
///   departure time inside each category
/// - **by-time-only**: departure time, categories ignored
/// - **nearest-to-preferred**: distance to the preferred instant
/// - **by-category-then-nearest**: categories by descending weight, distance
///   to the preferred instant inside each category
///
/// Every mode is a stable permutation of its input: nothing is dropped or
/// created, and equal keys keep their original relative order.
use crate::models::Candidate;
use crate::policy::{PriorityPolicy, RankingMode, TimeDirection};
use chrono::NaiveDateTime;
use std::cmp::Reverse;

pub fn rank<'s, H>(
    candidates: Vec<Candidate<'s, H>>,
    policy: &PriorityPolicy,
    _now: NaiveDateTime,
) -> Vec<Candidate<'s, H>> {
    if candidates.is_empty() {
        return candidates;
    }

    let direction = policy.time_direction();

    match (policy.ranking_mode(), policy.preferred_instant()) {
        (RankingMode::NearestToPreferred, Some(preferred)) => {
            sort_by_distance(candidates, preferred)
        }
        (RankingMode::ByCategoryThenNearest, Some(preferred)) => {
            by_category(candidates, policy, |group| sort_by_distance(group, preferred))
        }
        (RankingMode::ByTimeOnly, _)
        | (RankingMode::NearestToPreferred, None) => sort_by_time(candidates, direction),
        (RankingMode::ByCategoryThenTime, _) | (RankingMode::ByCategoryThenNearest, None) => {
            by_category(candidates, policy, |group| sort_by_time(group, direction))
        }
    }
}

fn sort_by_time<'s, H>(
    mut candidates: Vec<Candidate<'s, H>>,
    direction: TimeDirection,
) -> Vec<Candidate<'s, H>> {
    match direction {
        TimeDirection::Ascending => candidates.sort_by_key(|c| c.departure),
        TimeDirection::Descending => candidates.sort_by_key(|c| Reverse(c.departure)),
    }
    candidates
}

/// Decorate with `(distance, original index)`, sort, undecorate.
fn sort_by_distance<'s, H>(
    candidates: Vec<Candidate<'s, H>>,
    preferred: NaiveDateTime,
) -> Vec<Candidate<'s, H>> {
    let mut keyed: Vec<(i64, usize, Candidate<'s, H>)> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, c)| {
            let distance = c.departure.signed_duration_since(preferred).num_seconds().abs();
            (distance, index, c)
        })
        .collect();

    keyed.sort_by_key(|(distance, index, _)| (*distance, *index));
    keyed.into_iter().map(|(_, _, c)| c).collect()
}

/// Partition by category in priority order and sort each partition.
fn by_category<'s, H, F>(
    candidates: Vec<Candidate<'s, H>>,
    policy: &PriorityPolicy,
    sort_group: F,
) -> Vec<Candidate<'s, H>>
where
    F: Fn(Vec<Candidate<'s, H>>) -> Vec<Candidate<'s, H>>,
{
    let mut remaining = candidates;
    let mut ranked = Vec::with_capacity(remaining.len());

    for category in policy.category_order() {
        let (group, rest): (Vec<_>, Vec<_>) =
            remaining.into_iter().partition(|c| c.category == category);
        remaining = rest;
        ranked.extend(sort_group(group));
    }

    // Categories the policy does not rank keep their input order at the tail
    ranked.extend(remaining);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CategoryId, Weight};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn keys(ranked: &[Candidate<'_, u32>]) -> Vec<u32> {
        ranked.iter().map(|c| *c.handle).collect()
    }

    #[test]
    fn test_category_then_time() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .weight(CategoryId::StandardSeated, Weight::High)
            .weight(CategoryId::PremiumSeated, Weight::Low)
            .allow_standing(false)
            .build()
            .unwrap();
        let handles = [0u32, 1, 2];
        let candidates = vec![
            Candidate::new(at(11, 0), CategoryId::StandardSeated, &handles[0]),
            Candidate::new(at(10, 0), CategoryId::PremiumSeated, &handles[1]),
            Candidate::new(at(10, 0), CategoryId::StandardSeated, &handles[2]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        assert_eq!(keys(&ranked), vec![2, 0, 1]);
    }

    #[test]
    fn test_category_then_time_descending() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .time_direction(TimeDirection::Descending)
            .build()
            .unwrap();
        let handles = [0u32, 1, 2];
        let candidates = vec![
            Candidate::new(at(9, 0), CategoryId::StandardSeated, &handles[0]),
            Candidate::new(at(13, 0), CategoryId::PremiumSeated, &handles[1]),
            Candidate::new(at(12, 0), CategoryId::StandardSeated, &handles[2]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        assert_eq!(keys(&ranked), vec![2, 0, 1]);
    }

    #[test]
    fn test_time_only_is_stable() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .ranking_mode(RankingMode::ByTimeOnly)
            .build()
            .unwrap();
        let handles = [0u32, 1, 2, 3];
        let candidates = vec![
            Candidate::new(at(12, 0), CategoryId::StandardSeated, &handles[0]),
            Candidate::new(at(10, 0), CategoryId::PremiumSeated, &handles[1]),
            Candidate::new(at(10, 0), CategoryId::StandardSeated, &handles[2]),
            Candidate::new(at(11, 0), CategoryId::StandardSeated, &handles[3]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        assert_eq!(keys(&ranked), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_nearest_to_preferred() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .ranking_mode(RankingMode::NearestToPreferred)
            .preferred_instant(Some(at(12, 0)))
            .build()
            .unwrap();
        let handles = [0u32, 1, 2, 3];
        let candidates = vec![
            Candidate::new(at(11, 0), CategoryId::StandardSeated, &handles[0]),
            Candidate::new(at(13, 30), CategoryId::StandardSeated, &handles[1]),
            Candidate::new(at(12, 10), CategoryId::PremiumSeated, &handles[2]),
            Candidate::new(at(13, 0), CategoryId::StandardSeated, &handles[3]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        // 11:00 and 13:00 are equally far; input order wins
        assert_eq!(keys(&ranked), vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_category_then_nearest_keeps_grouping() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .ranking_mode(RankingMode::ByCategoryThenNearest)
            .preferred_instant(Some(at(12, 0)))
            .build()
            .unwrap();
        let handles = [0u32, 1, 2, 3];
        let candidates = vec![
            Candidate::new(at(12, 0), CategoryId::PremiumSeated, &handles[0]),
            Candidate::new(at(9, 0), CategoryId::StandardSeated, &handles[1]),
            Candidate::new(at(12, 30), CategoryId::StandardSeated, &handles[2]),
            Candidate::new(at(14, 0), CategoryId::PremiumSeated, &handles[3]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        assert_eq!(keys(&ranked), vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .ranking_mode(RankingMode::NearestToPreferred)
            .preferred_instant(Some(at(12, 0)))
            .build()
            .unwrap();
        let handles = [0u32, 1, 2];
        let candidates = vec![
            Candidate::new(at(13, 0), CategoryId::StandardSeated, &handles[0]),
            Candidate::new(at(11, 0), CategoryId::StandardSeated, &handles[1]),
            Candidate::new(at(12, 5), CategoryId::StandardSeated, &handles[2]),
        ];

        let once = rank(candidates, &policy, at(6, 0));
        let first = keys(&once);
        let twice = rank(once, &policy, at(6, 0));

        assert_eq!(keys(&twice), first);
    }

    #[test]
    fn test_unranked_category_is_kept_at_tail() {
        let policy = PriorityPolicy::builder(at(6, 0))
            .weight(CategoryId::PremiumSeated, Weight::Disable)
            .build()
            .unwrap();
        let handles = [0u32, 1];
        let candidates = vec![
            Candidate::new(at(9, 0), CategoryId::PremiumSeated, &handles[0]),
            Candidate::new(at(10, 0), CategoryId::StandardSeated, &handles[1]),
        ];

        let ranked = rank(candidates, &policy, at(6, 0));

        assert_eq!(keys(&ranked), vec![1, 0]);
    }

    #[test]
    fn test_empty_input() {
        let policy = PriorityPolicy::builder(at(6, 0)).build().unwrap();
        let ranked: Vec<Candidate<'_, u32>> = rank(Vec::new(), &policy, at(6, 0));
        assert!(ranked.is_empty());
    }
}

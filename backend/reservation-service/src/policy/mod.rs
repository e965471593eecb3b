/// Priority Policy
///
/// Immutable description of how candidate seats are ranked: per-category
/// weights, the standing-room gate, the acceptable departure window and the
/// ranking mode.
///
/// # Effective weights
/// The configured weights are normalised once at construction:
/// - every standing category is `Disable` when `allow_standing` is false
/// - a standing category is `Disable` when its seated counterpart is `Disable`
///
/// Construction fails when no category is left enabled or the time window is
/// inconsistent.
use crate::error::ConfigError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preference level of a category. `Disable` removes the category entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    Disable = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    VeryHigh = 4,
}

impl Weight {
    pub fn is_enabled(self) -> bool {
        self != Weight::Disable
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Car class printed as a separate column on the departure board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatClass {
    Standard,
    Premium,
}

impl SeatClass {
    pub const ALL: [SeatClass; 2] = [SeatClass::Standard, SeatClass::Premium];

    pub fn seated(self) -> CategoryId {
        match self {
            SeatClass::Standard => CategoryId::StandardSeated,
            SeatClass::Premium => CategoryId::PremiumSeated,
        }
    }

    pub fn standing(self) -> CategoryId {
        match self {
            SeatClass::Standard => CategoryId::StandardStanding,
            SeatClass::Premium => CategoryId::PremiumStanding,
        }
    }
}

/// Ranking bucket a candidate falls into.
///
/// The declaration order (see [`CategoryId::ALL`]) breaks ties between
/// categories configured with the same weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    StandardSeated,
    PremiumSeated,
    StandardStanding,
    PremiumStanding,
}

impl CategoryId {
    pub const ALL: [CategoryId; 4] = [
        CategoryId::StandardSeated,
        CategoryId::PremiumSeated,
        CategoryId::StandardStanding,
        CategoryId::PremiumStanding,
    ];

    pub fn class(self) -> SeatClass {
        match self {
            CategoryId::StandardSeated | CategoryId::StandardStanding => SeatClass::Standard,
            CategoryId::PremiumSeated | CategoryId::PremiumStanding => SeatClass::Premium,
        }
    }

    pub fn is_standing(self) -> bool {
        matches!(
            self,
            CategoryId::StandardStanding | CategoryId::PremiumStanding
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryId::StandardSeated => "standard_seated",
            CategoryId::PremiumSeated => "premium_seated",
            CategoryId::StandardStanding => "standard_standing",
            CategoryId::PremiumStanding => "premium_standing",
        }
    }

    fn declaration_index(self) -> usize {
        CategoryId::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or(CategoryId::ALL.len())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Category weight first, then departure time inside each category.
    #[default]
    ByCategoryThenTime,
    /// Departure time only, categories ignored.
    ByTimeOnly,
    /// Distance to the preferred instant only, categories ignored.
    NearestToPreferred,
    /// Category weight first, then distance to the preferred instant.
    ByCategoryThenNearest,
}

impl RankingMode {
    pub fn requires_preferred_instant(self) -> bool {
        matches!(
            self,
            RankingMode::NearestToPreferred | RankingMode::ByCategoryThenNearest
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeDirection {
    /// Earliest departure first
    #[default]
    Ascending,
    /// Latest departure first
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityPolicy {
    categories: Vec<(CategoryId, Weight)>,
    allow_standing: bool,
    ranking_mode: RankingMode,
    time_direction: TimeDirection,
    min_time: NaiveDateTime,
    max_time: Option<NaiveDateTime>,
    preferred_instant: Option<NaiveDateTime>,
}

impl PriorityPolicy {
    pub fn builder(min_time: NaiveDateTime) -> PriorityPolicyBuilder {
        PriorityPolicyBuilder::new(min_time)
    }

    /// Effective `(category, weight)` pairs in declaration order.
    pub fn categories(&self) -> &[(CategoryId, Weight)] {
        &self.categories
    }

    pub fn effective_weight(&self, category: CategoryId) -> Weight {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, w)| *w)
            .unwrap_or(Weight::Disable)
    }

    pub fn is_enabled(&self, category: CategoryId) -> bool {
        self.effective_weight(category).is_enabled()
    }

    /// Enabled categories by descending weight, ties in declaration order.
    pub fn category_order(&self) -> Vec<CategoryId> {
        let mut enabled: Vec<(CategoryId, Weight)> = self
            .categories
            .iter()
            .copied()
            .filter(|(_, w)| w.is_enabled())
            .collect();
        enabled.sort_by(|(ca, wa), (cb, wb)| {
            wb.cmp(wa)
                .then_with(|| ca.declaration_index().cmp(&cb.declaration_index()))
        });
        enabled.into_iter().map(|(c, _)| c).collect()
    }

    pub fn allow_standing(&self) -> bool {
        self.allow_standing
    }

    pub fn ranking_mode(&self) -> RankingMode {
        self.ranking_mode
    }

    pub fn time_direction(&self) -> TimeDirection {
        self.time_direction
    }

    pub fn min_time(&self) -> NaiveDateTime {
        self.min_time
    }

    pub fn max_time(&self) -> Option<NaiveDateTime> {
        self.max_time
    }

    pub fn preferred_instant(&self) -> Option<NaiveDateTime> {
        self.preferred_instant
    }

    /// Builder pre-filled with this policy's effective settings.
    pub fn to_builder(&self) -> PriorityPolicyBuilder {
        PriorityPolicyBuilder {
            weights: self.categories.clone(),
            allow_standing: self.allow_standing,
            ranking_mode: self.ranking_mode,
            time_direction: self.time_direction,
            min_time: self.min_time,
            max_time: self.max_time,
            preferred_instant: self.preferred_instant,
        }
    }
}

/// Builder for [`PriorityPolicy`].
///
/// Defaults mirror the common case: standard seats `High`, premium seats and
/// both standing categories `Low`, standing not allowed.
#[derive(Debug, Clone)]
pub struct PriorityPolicyBuilder {
    weights: Vec<(CategoryId, Weight)>,
    allow_standing: bool,
    ranking_mode: RankingMode,
    time_direction: TimeDirection,
    min_time: NaiveDateTime,
    max_time: Option<NaiveDateTime>,
    preferred_instant: Option<NaiveDateTime>,
}

impl PriorityPolicyBuilder {
    pub fn new(min_time: NaiveDateTime) -> Self {
        Self {
            weights: vec![
                (CategoryId::StandardSeated, Weight::High),
                (CategoryId::PremiumSeated, Weight::Low),
                (CategoryId::StandardStanding, Weight::Low),
                (CategoryId::PremiumStanding, Weight::Low),
            ],
            allow_standing: false,
            ranking_mode: RankingMode::default(),
            time_direction: TimeDirection::default(),
            min_time,
            max_time: None,
            preferred_instant: None,
        }
    }

    pub fn weight(mut self, category: CategoryId, weight: Weight) -> Self {
        match self.weights.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = weight,
            None => self.weights.push((category, weight)),
        }
        self
    }

    pub fn allow_standing(mut self, allow: bool) -> Self {
        self.allow_standing = allow;
        self
    }

    pub fn ranking_mode(mut self, mode: RankingMode) -> Self {
        self.ranking_mode = mode;
        self
    }

    pub fn time_direction(mut self, direction: TimeDirection) -> Self {
        self.time_direction = direction;
        self
    }

    pub fn max_time(mut self, max_time: Option<NaiveDateTime>) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn preferred_instant(mut self, preferred: Option<NaiveDateTime>) -> Self {
        self.preferred_instant = preferred;
        self
    }

    pub fn build(self) -> Result<PriorityPolicy, ConfigError> {
        if let Some(max) = self.max_time {
            if self.min_time > max {
                return Err(ConfigError::InvertedWindow {
                    min: self.min_time,
                    max,
                });
            }
        }

        if let Some(preferred) = self.preferred_instant {
            let above_max = self.max_time.map_or(false, |max| preferred > max);
            if preferred < self.min_time || above_max {
                return Err(ConfigError::PreferredOutsideWindow { preferred });
            }
        } else if self.ranking_mode.requires_preferred_instant() {
            return Err(ConfigError::MissingPreferredInstant(self.ranking_mode));
        }

        let configured = |category: CategoryId| {
            self.weights
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, w)| *w)
                .unwrap_or(Weight::Disable)
        };

        let categories: Vec<(CategoryId, Weight)> = CategoryId::ALL
            .iter()
            .map(|&category| {
                let weight = if category.is_standing() {
                    let seated = configured(category.class().seated());
                    if !self.allow_standing || !seated.is_enabled() {
                        Weight::Disable
                    } else {
                        configured(category)
                    }
                } else {
                    configured(category)
                };
                (category, weight)
            })
            .collect();

        if categories.iter().all(|(_, w)| !w.is_enabled()) {
            return Err(ConfigError::AllCategoriesDisabled);
        }

        Ok(PriorityPolicy {
            categories,
            allow_standing: self.allow_standing,
            ranking_mode: self.ranking_mode,
            time_direction: self.time_direction,
            min_time: self.min_time,
            max_time: self.max_time,
            preferred_instant: self.preferred_instant,
        })
    }
}

/// Configuration management
///
/// Flat `RESERVER_`-prefixed environment surface, e.g.
///
/// ```text
/// RESERVER_MIN_TIME=2026-10-20T09:00:00
/// RESERVER_MAX_TIME=2026-10-20T13:00:00
/// RESERVER_STANDARD_SEATED_WEIGHT=very_high
/// RESERVER_ALLOW_STANDING=true
/// RESERVER_RANKING_MODE=nearest_to_preferred
/// RESERVER_PREFERRED_INSTANT=2026-10-20T11:00:00
/// ```
use crate::error::{AppConfigError, ConfigError};
use crate::policy::{CategoryId, PriorityPolicy, RankingMode, TimeDirection, Weight};
use crate::services::PollingConfig;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    /// Pause between searches in milliseconds
    #[validate(range(min = 1))]
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Retries of a failed snapshot acquisition per iteration
    #[validate(range(max = 50))]
    #[serde(default = "default_max_snapshot_retries")]
    pub max_snapshot_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound on a single collaborator call in milliseconds
    #[validate(range(min = 1))]
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    pub hard_stop: Option<NaiveDateTime>,

    #[serde(default = "default_standard_seated_weight")]
    pub standard_seated_weight: Weight,
    #[serde(default = "default_low_weight")]
    pub premium_seated_weight: Weight,
    #[serde(default = "default_low_weight")]
    pub standard_standing_weight: Weight,
    #[serde(default = "default_low_weight")]
    pub premium_standing_weight: Weight,
    #[serde(default)]
    pub allow_standing: bool,

    #[serde(default)]
    pub ranking_mode: RankingMode,
    #[serde(default)]
    pub time_direction: TimeDirection,

    /// Defaults to the current time when absent
    pub min_time: Option<NaiveDateTime>,
    pub max_time: Option<NaiveDateTime>,
    pub preferred_instant: Option<NaiveDateTime>,

    /// JSON departure board used by the dry-run binary
    pub snapshot_file: Option<String>,

    #[serde(default)]
    pub log_json: bool,
}

fn default_refresh_interval_ms() -> u64 {
    500
}

fn default_max_snapshot_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_call_timeout_ms() -> u64 {
    15_000
}

fn default_standard_seated_weight() -> Weight {
    Weight::High
}

fn default_low_weight() -> Weight {
    Weight::Low
}

impl Config {
    pub fn from_env() -> Result<Self, AppConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit `(key, value)` pairs using the same prefix rules.
    pub fn from_vars<I>(vars: I) -> Result<Self, AppConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::prefixed("RESERVER_").from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn policy(&self, now: NaiveDateTime) -> Result<PriorityPolicy, ConfigError> {
        PriorityPolicy::builder(self.min_time.unwrap_or(now))
            .weight(CategoryId::StandardSeated, self.standard_seated_weight)
            .weight(CategoryId::PremiumSeated, self.premium_seated_weight)
            .weight(CategoryId::StandardStanding, self.standard_standing_weight)
            .weight(CategoryId::PremiumStanding, self.premium_standing_weight)
            .allow_standing(self.allow_standing)
            .ranking_mode(self.ranking_mode)
            .time_direction(self.time_direction)
            .max_time(self.max_time)
            .preferred_instant(self.preferred_instant)
            .build()
    }

    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            max_snapshot_retries: self.max_snapshot_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            hard_stop: self.hard_stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[("UNRELATED", "1")])).unwrap();

        assert_eq!(config.refresh_interval_ms, 500);
        assert_eq!(config.max_snapshot_retries, 3);
        assert_eq!(config.standard_seated_weight, Weight::High);
        assert_eq!(config.premium_standing_weight, Weight::Low);
        assert!(!config.allow_standing);
        assert_eq!(config.ranking_mode, RankingMode::ByCategoryThenTime);

        let polling = config.polling();
        assert_eq!(polling.refresh_interval, Duration::from_millis(500));
        assert_eq!(polling.call_timeout, Duration::from_secs(15));
        assert!(polling.hard_stop.is_none());
    }

    #[test]
    fn test_policy_from_env() {
        let config = Config::from_vars(vars(&[
            ("RESERVER_MIN_TIME", "2026-10-20T09:00:00"),
            ("RESERVER_MAX_TIME", "2026-10-20T13:00:00"),
            ("RESERVER_PREFERRED_INSTANT", "2026-10-20T11:00:00"),
            ("RESERVER_RANKING_MODE", "nearest_to_preferred"),
            ("RESERVER_PREMIUM_SEATED_WEIGHT", "very_high"),
            ("RESERVER_ALLOW_STANDING", "true"),
            ("RESERVER_STANDARD_STANDING_WEIGHT", "medium"),
        ]))
        .unwrap();

        let policy = config.policy(at(7, 0)).unwrap();

        assert_eq!(policy.min_time(), at(9, 0));
        assert_eq!(policy.max_time(), Some(at(13, 0)));
        assert_eq!(policy.preferred_instant(), Some(at(11, 0)));
        assert_eq!(policy.ranking_mode(), RankingMode::NearestToPreferred);
        assert_eq!(
            policy.category_order(),
            vec![
                CategoryId::PremiumSeated,
                CategoryId::StandardSeated,
                CategoryId::StandardStanding,
                CategoryId::PremiumStanding,
            ]
        );
    }

    #[test]
    fn test_min_time_defaults_to_now() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.policy(at(7, 0)).unwrap().min_time(), at(7, 0));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_vars(vars(&[("RESERVER_REFRESH_INTERVAL_MS", "0")])),
            Err(AppConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("RESERVER_RANKING_MODE", "random")])),
            Err(AppConfigError::Env(_))
        ));
    }

    #[test]
    fn test_all_disabled_policy_fails() {
        let config = Config::from_vars(vars(&[
            ("RESERVER_STANDARD_SEATED_WEIGHT", "disable"),
            ("RESERVER_PREMIUM_SEATED_WEIGHT", "disable"),
        ]))
        .unwrap();

        assert_eq!(
            config.policy(at(7, 0)),
            Err(ConfigError::AllCategoriesDisabled)
        );
    }
}

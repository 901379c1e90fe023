//! Tuning configuration - every threshold and rate the engines use
//!
//! Values are injected at startup. Changing one only affects future
//! computations; derived state is always replayable from the session log.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One year; longer hour spans are rejected
const MAX_HOURS: f32 = 24.0 * 366.0;
const MAX_SLACK_DAYS: f32 = 366.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TuningConfig {
    pub fatigue: FatigueConfig,
    pub effort: EffortConfig,
    pub stimulus: StimulusConfig,
    pub readiness: ReadinessConfig,
    pub time_of_day: TimeOfDayConfig,
    pub body_readiness: BodyReadinessConfig,
    pub coach: CoachConfig,
    pub consistency: ConsistencyConfig,
    pub plan: PlanConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    pub base_gain_per_set: f32,
    pub recovery_per_hour: f32,
    pub max_fatigue: f32,
    pub min_fatigue: f32,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            base_gain_per_set: 6.0,
            recovery_per_hour: 1.5,
            max_fatigue: 100.0,
            min_fatigue: 0.0,
        }
    }
}

/// RPE to effort factor steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortConfig {
    pub rpe10: f32,
    pub rpe9: f32,
    pub rpe8: f32,
    pub rpe7: f32,
    pub rpe6: f32,
    /// Anything below RPE 6
    pub rpe5: f32,
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            rpe10: 1.5,
            rpe9: 1.3,
            rpe8: 1.1,
            rpe7: 1.0,
            rpe6: 0.85,
            rpe5: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Minimum RPE for a set to count as a hard set
    pub hard_set_rpe: f32,
    /// Below this weekly credit a section is undertrained
    pub min_sets_per_week: f32,
    pub optimal_sets_min: f32,
    pub optimal_sets_max: f32,
    /// Above this weekly credit a section is overtrained
    pub max_sets_per_week: f32,
    /// 0 = Sunday, 1 = Monday, ...
    pub week_reset_day: u8,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            hard_set_rpe: 7.0,
            min_sets_per_week: 6.0,
            optimal_sets_min: 10.0,
            optimal_sets_max: 20.0,
            max_sets_per_week: 25.0,
            week_reset_day: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub recovering_fatigue_threshold: f32,
    pub caution_fatigue_threshold: f32,
    pub primed_max_fatigue: f32,
    pub primed_max_stimulus: f32,
    pub primed_min_hours_since_trained: f32,
    pub primed_max_soreness: u8,
    /// Fatigue penalty for soreness levels 0-4
    pub soreness_penalty: [f32; 5],
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            recovering_fatigue_threshold: 70.0,
            caution_fatigue_threshold: 50.0,
            primed_max_fatigue: 20.0,
            primed_max_stimulus: 4.0,
            primed_min_hours_since_trained: 48.0,
            primed_max_soreness: 1,
            soreness_penalty: [0.0, 5.0, 15.0, 30.0, 50.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDayConfig {
    pub morning_multiplier: f32,
    pub afternoon_multiplier: f32,
    pub evening_multiplier: f32,
    /// Applied when training again shortly after the previous session
    pub unusual_time_reduction: f32,
    pub unusual_gap_hours: f32,
}

impl Default for TimeOfDayConfig {
    fn default() -> Self {
        Self {
            morning_multiplier: 0.95,
            afternoon_multiplier: 1.0,
            evening_multiplier: 0.98,
            unusual_time_reduction: 0.9,
            unusual_gap_hours: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyReadinessConfig {
    pub avg_fatigue_weight: f32,
    /// No sleep data yet; the factor is assumed perfect
    pub sleep_factor_weight: f32,
    pub time_factor_weight: f32,
}

impl Default for BodyReadinessConfig {
    fn default() -> Self {
        Self {
            avg_fatigue_weight: 0.6,
            sleep_factor_weight: 0.2,
            time_factor_weight: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub rest_hours: f32,
    /// Cadence assumed until two sessions exist
    pub default_interval_hours: f32,
    /// Number of most recent intervals averaged for the cadence
    pub interval_window: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            rest_hours: 24.0,
            default_interval_hours: 48.0,
            interval_window: 5,
        }
    }
}

/// Days beyond the usual cadence tolerated by each consistency state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub on_track_slack_days: i64,
    pub missed_slack_days: i64,
    pub drifting_slack_days: i64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            on_track_slack_days: 1,
            missed_slack_days: 2,
            drifting_slack_days: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub recommend_min_contribution: f32,
    pub alternative_min_contribution: f32,
    pub alternative_max_other_fatigue: f32,
    pub alternative_other_contribution: f32,
    pub max_alternatives: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            recommend_min_contribution: 0.3,
            alternative_min_contribution: 0.2,
            alternative_max_other_fatigue: 50.0,
            alternative_other_contribution: 0.2,
            max_alternatives: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub max_focus_muscles: usize,
    pub min_focus_muscles: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_focus_muscles: 3,
            min_focus_muscles: 1,
        }
    }
}

impl TuningConfig {
    /// Load a (possibly partial) JSON override; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TuningConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are ordered, rates finite and positive, and
    /// hour/day spans small enough for date arithmetic
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fatigue.base_gain_per_set", self.fatigue.base_gain_per_set)?;
        positive("fatigue.recovery_per_hour", self.fatigue.recovery_per_hour)?;
        finite("fatigue.min_fatigue", self.fatigue.min_fatigue)?;
        finite("fatigue.max_fatigue", self.fatigue.max_fatigue)?;
        ordered(
            "fatigue.min_fatigue",
            self.fatigue.min_fatigue,
            "fatigue.max_fatigue",
            self.fatigue.max_fatigue,
        )?;

        let e = &self.effort;
        let steps = [e.rpe5, e.rpe6, e.rpe7, e.rpe8, e.rpe9, e.rpe10];
        for (field, value) in [
            ("effort.rpe5", e.rpe5),
            ("effort.rpe6", e.rpe6),
            ("effort.rpe7", e.rpe7),
            ("effort.rpe8", e.rpe8),
            ("effort.rpe9", e.rpe9),
            ("effort.rpe10", e.rpe10),
        ] {
            finite(field, value)?;
        }
        if steps.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::EffortNotMonotonic);
        }

        let s = &self.stimulus;
        finite("stimulus.hard_set_rpe", s.hard_set_rpe)?;
        ordered(
            "stimulus.min_sets_per_week",
            s.min_sets_per_week,
            "stimulus.max_sets_per_week",
            s.max_sets_per_week,
        )?;
        ordered(
            "stimulus.optimal_sets_min",
            s.optimal_sets_min,
            "stimulus.optimal_sets_max",
            s.optimal_sets_max,
        )?;
        if s.week_reset_day > 6 {
            return Err(ConfigError::Weekday(s.week_reset_day));
        }

        let r = &self.readiness;
        finite("readiness.primed_max_fatigue", r.primed_max_fatigue)?;
        finite("readiness.primed_max_stimulus", r.primed_max_stimulus)?;
        bounded(
            "readiness.primed_min_hours_since_trained",
            r.primed_min_hours_since_trained,
            MAX_HOURS,
        )?;
        for value in r.soreness_penalty {
            finite("readiness.soreness_penalty", value)?;
        }
        ordered(
            "readiness.caution_fatigue_threshold",
            r.caution_fatigue_threshold,
            "readiness.recovering_fatigue_threshold",
            r.recovering_fatigue_threshold,
        )?;

        let t = &self.time_of_day;
        for (field, value) in [
            ("time_of_day.morning_multiplier", t.morning_multiplier),
            ("time_of_day.afternoon_multiplier", t.afternoon_multiplier),
            ("time_of_day.evening_multiplier", t.evening_multiplier),
            ("time_of_day.unusual_time_reduction", t.unusual_time_reduction),
        ] {
            finite(field, value)?;
        }
        bounded("time_of_day.unusual_gap_hours", t.unusual_gap_hours, MAX_HOURS)?;

        let w = &self.body_readiness;
        finite("body_readiness.avg_fatigue_weight", w.avg_fatigue_weight)?;
        finite("body_readiness.sleep_factor_weight", w.sleep_factor_weight)?;
        finite("body_readiness.time_factor_weight", w.time_factor_weight)?;

        positive("coach.rest_hours", self.coach.rest_hours)?;
        bounded("coach.rest_hours", self.coach.rest_hours, MAX_HOURS)?;
        positive("coach.default_interval_hours", self.coach.default_interval_hours)?;
        bounded(
            "coach.default_interval_hours",
            self.coach.default_interval_hours,
            MAX_HOURS,
        )?;

        let c = &self.consistency;
        for (field, value) in [
            ("consistency.on_track_slack_days", c.on_track_slack_days),
            ("consistency.missed_slack_days", c.missed_slack_days),
            ("consistency.drifting_slack_days", c.drifting_slack_days),
        ] {
            bounded(field, value as f32, MAX_SLACK_DAYS)?;
        }
        ordered(
            "consistency.on_track_slack_days",
            c.on_track_slack_days as f32,
            "consistency.missed_slack_days",
            c.missed_slack_days as f32,
        )?;
        ordered(
            "consistency.missed_slack_days",
            c.missed_slack_days as f32,
            "consistency.drifting_slack_days",
            c.drifting_slack_days as f32,
        )?;
        Ok(())
    }

    /// Fatigue penalty for a soreness level; levels above 4 use the top penalty
    pub fn soreness_penalty(&self, level: u8) -> f32 {
        let table = &self.readiness.soreness_penalty;
        table[usize::from(level).min(table.len() - 1)]
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Finite and within `[0, max]`
fn bounded(field: &'static str, value: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, max })
    }
}

fn ordered(
    lower: &'static str,
    lower_value: f32,
    upper: &'static str,
    upper_value: f32,
) -> Result<(), ConfigError> {
    if lower_value <= upper_value {
        Ok(())
    } else {
        Err(ConfigError::Ordering {
            lower,
            lower_value,
            upper,
            upper_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(TuningConfig::default().validate().is_ok());
    }

    #[test]
    fn test_soreness_penalty_table() {
        let config = TuningConfig::default();
        let penalties: Vec<f32> = (0..=4).map(|l| config.soreness_penalty(l)).collect();
        assert_eq!(penalties, vec![0.0, 5.0, 15.0, 30.0, 50.0]);
        assert_eq!(config.soreness_penalty(9), 50.0);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let mut config = TuningConfig::default();
        config.readiness.caution_fatigue_threshold = 80.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Ordering { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_weekday() {
        let mut config = TuningConfig::default();
        config.stimulus.week_reset_day = 7;
        assert!(matches!(config.validate(), Err(ConfigError::Weekday(7))));
    }

    #[test]
    fn test_rejects_decreasing_effort() {
        let mut config = TuningConfig::default();
        config.effort.rpe9 = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EffortNotMonotonic)
        ));
    }

    #[test]
    fn test_rejects_unbounded_hours() {
        let mut config = TuningConfig::default();
        config.coach.rest_hours = 1e30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "coach.rest_hours", .. })
        ));

        let mut config = TuningConfig::default();
        config.coach.default_interval_hours = 1e30;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));

        let mut config = TuningConfig::default();
        config.consistency.drifting_slack_days = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));

        let mut config = TuningConfig::default();
        config.time_of_day.unusual_gap_hours = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_non_finite_rates() {
        let mut config = TuningConfig::default();
        config.fatigue.recovery_per_hour = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { .. })));

        let mut config = TuningConfig::default();
        config.time_of_day.morning_multiplier = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "time_of_day.morning_multiplier", .. })
        ));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fatigue": {{"recovery_per_hour": 2.0}}, "coach": {{"rest_hours": 36}}}}"#)
            .unwrap();

        let config = TuningConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.fatigue.recovery_per_hour, 2.0);
        assert_eq!(config.fatigue.base_gain_per_set, 6.0);
        assert_eq!(config.coach.rest_hours, 36.0);
        assert_eq!(config.stimulus, StimulusConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = TuningConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

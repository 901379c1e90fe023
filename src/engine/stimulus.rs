//! Stimulus engine - weekly hard-set credit per section

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TuningConfig;
use crate::exercises::find_exercise;
use crate::session::LoggedSet;
use crate::taxonomy::SectionMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StimulusZone {
    Undertrained,
    Optimal,
    Overtrained,
}

impl fmt::Display for StimulusZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StimulusZone::Undertrained => write!(f, "undertrained"),
            StimulusZone::Optimal => write!(f, "optimal"),
            StimulusZone::Overtrained => write!(f, "overtrained"),
        }
    }
}

pub fn is_hard_set(rpe: f32, config: &TuningConfig) -> bool {
    rpe >= config.stimulus.hard_set_rpe
}

/// Credit for one hard set, tiered by how much the section is worked
pub fn stimulus_points(contribution: f32) -> f32 {
    match contribution {
        w if w >= 0.5 => 1.0,
        w if w >= 0.2 => 0.5,
        _ => 0.25,
    }
}

/// Stimulus credit per section; empty unless the set is a hard set
pub fn stimulus_from_set(set: &LoggedSet, config: &TuningConfig) -> SectionMap<f32> {
    let mut stimulus: SectionMap<f32> = SectionMap::default();
    if !is_hard_set(set.rpe, config) {
        return stimulus;
    }
    let Some(exercise) = find_exercise(&set.exercise_id) else {
        return stimulus;
    };
    for &(section, weight) in exercise.contributions {
        if weight > 0.0 {
            stimulus[section] = stimulus_points(weight);
        }
    }
    stimulus
}

pub fn stimulus_zone(weekly_stimulus: f32, config: &TuningConfig) -> StimulusZone {
    let s = &config.stimulus;
    if weekly_stimulus < s.min_sets_per_week {
        StimulusZone::Undertrained
    } else if weekly_stimulus > s.max_sets_per_week {
        StimulusZone::Overtrained
    } else {
        StimulusZone::Optimal
    }
}

/// Hard sets still needed to reach the optimal range
pub fn sets_to_optimal(weekly_stimulus: f32, config: &TuningConfig) -> f32 {
    (config.stimulus.optimal_sets_min - weekly_stimulus).max(0.0)
}

/// Progress through the optimal range as a percentage, capped at 100
pub fn stimulus_progress(weekly_stimulus: f32, config: &TuningConfig) -> f32 {
    (weekly_stimulus.max(0.0) / config.stimulus.optimal_sets_max * 100.0).min(100.0)
}

/// Start (local midnight) of the training week containing `now`
pub fn week_start(now: DateTime<Utc>, tz: FixedOffset, config: &TuningConfig) -> DateTime<Utc> {
    let local = now.with_timezone(&tz).date_naive();
    let today = local.weekday().num_days_from_sunday() as i64;
    let days_since_reset = (today - i64::from(config.stimulus.week_reset_day) + 7) % 7;
    let start = (local - Duration::days(days_since_reset)).and_time(NaiveTime::MIN);
    (start - Duration::seconds(i64::from(tz.local_minus_utc()))).and_utc()
}

/// Whether weekly stimulus is stale; never true twice for the same week
pub fn needs_weekly_reset(
    last_reset: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: FixedOffset,
    config: &TuningConfig,
) -> bool {
    last_reset < week_start(now, tz, config)
}

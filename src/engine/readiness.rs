//! Readiness engine - discrete training availability per section
//!
//! Precedence is fixed: PRIMED is checked first, then RECOVERING, then
//! CAUTION, and READY is the fallback.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hours_between;
use super::tracker::{SectionState, SectionStates};
use crate::config::TuningConfig;
use crate::profile::UserProfile;
use crate::session::SorenessMap;
use crate::taxonomy::{MuscleGroup, MuscleSection};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Readiness {
    Recovering,
    Caution,
    Ready,
    Primed,
}

impl Readiness {
    /// Higher means more reason to hold back
    pub fn concern(&self) -> u8 {
        match self {
            Readiness::Recovering => 3,
            Readiness::Caution => 2,
            Readiness::Primed => 1,
            Readiness::Ready => 0,
        }
    }

    /// Display order, best first
    pub fn rank(&self) -> u8 {
        match self {
            Readiness::Primed => 0,
            Readiness::Ready => 1,
            Readiness::Caution => 2,
            Readiness::Recovering => 3,
        }
    }

    pub fn is_trainable(&self) -> bool {
        matches!(self, Readiness::Ready | Readiness::Primed)
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Readiness::Recovering => "RECOVERING",
            Readiness::Caution => "CAUTION",
            Readiness::Ready => "READY",
            Readiness::Primed => "PRIMED",
        };
        f.write_str(label)
    }
}

pub fn effective_fatigue(fatigue: f32, soreness: u8, config: &TuningConfig) -> f32 {
    fatigue + config.soreness_penalty(soreness)
}

pub fn section_readiness(
    state: &SectionState,
    soreness: u8,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Readiness {
    let r = &config.readiness;
    let hours_since_trained = state
        .last_trained_at
        .map_or(f32::INFINITY, |at| hours_between(at, now));
    let fatigue = effective_fatigue(state.fatigue, soreness, config);

    if fatigue <= r.primed_max_fatigue
        && state.weekly_stimulus <= r.primed_max_stimulus
        && hours_since_trained >= r.primed_min_hours_since_trained
        && soreness <= r.primed_max_soreness
    {
        Readiness::Primed
    } else if fatigue >= r.recovering_fatigue_threshold {
        Readiness::Recovering
    } else if fatigue >= r.caution_fatigue_threshold {
        Readiness::Caution
    } else {
        Readiness::Ready
    }
}

/// Highest-concern readiness of a set of sections, READY when empty
pub fn worst_readiness(readiness: impl IntoIterator<Item = Readiness>) -> Readiness {
    readiness
        .into_iter()
        .max_by_key(Readiness::concern)
        .unwrap_or(Readiness::Ready)
}

pub fn group_readiness(
    group: MuscleGroup,
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Readiness {
    worst_readiness(
        group
            .sections()
            .iter()
            .map(|&s| section_readiness(&states[s], soreness[s], now, config)),
    )
}

pub fn whole_body_readiness(
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Readiness {
    worst_readiness(
        states
            .iter()
            .map(|(s, state)| section_readiness(state, soreness[s], now, config)),
    )
}

/// Time-of-day multiplier, reduced when the previous session ended recently
pub fn time_multiplier(
    now: DateTime<Utc>,
    last_session_end: Option<DateTime<Utc>>,
    profile: &UserProfile,
    config: &TuningConfig,
) -> f32 {
    let t = &config.time_of_day;
    let mut multiplier = match profile.local_hour(now) {
        5..=11 => t.morning_multiplier,
        12..=17 => t.afternoon_multiplier,
        _ => t.evening_multiplier,
    };
    if let Some(end) = last_session_end
        && hours_between(end, now) < t.unusual_gap_hours
    {
        multiplier *= t.unusual_time_reduction;
    }
    multiplier
}

/// Whole-body readiness percentage, 0-100
pub fn body_readiness(
    states: &SectionStates,
    now: DateTime<Utc>,
    last_session_end: Option<DateTime<Utc>>,
    profile: &UserProfile,
    config: &TuningConfig,
) -> f32 {
    let w = &config.body_readiness;
    let count = states.values().count() as f32;
    let avg_fatigue = states.values().map(|s| s.fatigue).sum::<f32>() / count;
    let fatigue_score = (100.0 - avg_fatigue).max(0.0);
    // sleep is not tracked yet, assume a full score
    let sleep_score = 100.0;
    let time_score = 100.0 * time_multiplier(now, last_session_end, profile, config);

    let readiness = fatigue_score * w.avg_fatigue_weight
        + sleep_score * w.sleep_factor_weight
        + time_score * w.time_factor_weight;
    readiness.clamp(0.0, 100.0).round()
}

/// Sections ordered PRIMED, READY, CAUTION, RECOVERING; stable within a state
pub fn sort_by_readiness(
    sections: &[MuscleSection],
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Vec<MuscleSection> {
    let mut sorted = sections.to_vec();
    sorted.sort_by_key(|&s| section_readiness(&states[s], soreness[s], now, config).rank());
    sorted
}

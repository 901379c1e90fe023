//! Engine module - pure computations over the session log
//!
//! Features:
//! - Section fatigue gain, decay and history replay
//! - Weekly hard-set stimulus and training-week boundaries
//! - Readiness per section, group and whole body
//! - Coach banner from recovery window and training cadence
//! - Exercise recommendations, warnings and focus suggestions
//! - Stats and badges

pub mod coach;
pub mod fatigue;
pub mod plan;
pub mod readiness;
pub mod stats;
pub mod stimulus;
pub mod tracker;

pub use coach::{Banner, CoachState, ConsistencyState, RecoveryState, compute_coach_state};
pub use plan::{PlanWarning, Recommendation, recommend_exercises, suggested_focus, warnings};
pub use readiness::{Readiness, body_readiness, group_readiness, section_readiness};
pub use stats::{Badge, TrainingStats, compute_stats};
pub use stimulus::StimulusZone;
pub use tracker::{MuscleTracker, SectionState, SectionStates};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::TuningConfig;
use crate::profile::UserProfile;
use crate::session::{SorenessMap, WorkoutSession, ended_newest_first};
use crate::taxonomy::{MuscleGroup, SectionMap};

/// Hours from `from` to `to`, zero if `to` is earlier
pub(crate) fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f32 {
    ((to - from).num_milliseconds() as f32 / 3_600_000.0).max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReadiness {
    pub group: MuscleGroup,
    pub readiness: Readiness,
}

/// Everything a host needs to render, recomputed from raw inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedState {
    pub computed_at: DateTime<Utc>,
    pub tracker: MuscleTracker,
    pub readiness: SectionMap<Readiness>,
    pub zones: SectionMap<StimulusZone>,
    pub groups: Vec<GroupReadiness>,
    /// 0-100
    pub body_readiness: f32,
    pub coach: CoachState,
    pub suggested_focus: Vec<MuscleGroup>,
    pub stats: TrainingStats,
}

/// Rebuild every derived value from the session log
///
/// Pure and idempotent: the host decides when to call it.
pub fn recompute(
    history: &[WorkoutSession],
    profile: &UserProfile,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> DerivedState {
    let tracker = MuscleTracker::rebuild(history, profile, now, config);
    let states = &tracker.sections;

    let readiness = states.map(|s, state| section_readiness(state, soreness[s], now, config));
    let zones = states.map(|_, state| stimulus::stimulus_zone(state.weekly_stimulus, config));
    let groups = MuscleGroup::ALL
        .iter()
        .map(|&group| GroupReadiness {
            group,
            readiness: group_readiness(group, states, soreness, now, config),
        })
        .collect();

    let last_end = ended_newest_first(history)
        .first()
        .and_then(|s| s.ended_at);
    let body = body_readiness(states, now, last_end, profile, config);
    let coach = compute_coach_state(history, now, config);
    let focus = suggested_focus(states, soreness, now, config);
    let stats = compute_stats(history, profile, now, config);

    debug!(
        sessions = history.len(),
        body_readiness = body,
        consistency = %coach.consistency,
        "derived state recomputed"
    );

    DerivedState {
        computed_at: now,
        tracker,
        readiness,
        zones,
        groups,
        body_readiness: body,
        coach,
        suggested_focus: focus,
        stats,
    }
}

//! Coach engine - recovery window, training cadence and the banner shown for them

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::hours_between;
use crate::config::TuningConfig;
use crate::session::{WorkoutSession, ended_newest_first};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryState {
    Rest,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyState {
    OnTrack,
    Missed,
    Drifting,
    Reset,
}

impl fmt::Display for ConsistencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyState::OnTrack => write!(f, "ON_TRACK"),
            ConsistencyState::Missed => write!(f, "MISSED"),
            ConsistencyState::Drifting => write!(f, "DRIFTING"),
            ConsistencyState::Reset => write!(f, "RESET"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Default,
    Success,
    Warning,
}

/// Fixed banner template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub severity: Severity,
    pub primary_cta: &'static str,
    pub secondary_cta: &'static str,
}

const RECOVERY_WINDOW: Banner = Banner {
    title: "Recovery Window",
    subtitle: "Next recommended session in",
    severity: Severity::Warning,
    primary_cta: "Recover (recommended)",
    secondary_cta: "Start anyway",
};

const ON_TRACK: Banner = Banner {
    title: "You're Ready",
    subtitle: "Keep your rhythm going",
    severity: Severity::Success,
    primary_cta: "Start Session",
    secondary_cta: "View Plan",
};

const MISSED: Banner = Banner {
    title: "Back on Track Today",
    subtitle: "Missed yesterday? No stress, a short session keeps momentum",
    severity: Severity::Default,
    primary_cta: "Start Session",
    secondary_cta: "View Focus",
};

const DRIFTING: Banner = Banner {
    title: "Let's Rebuild Your Rhythm",
    subtitle: "Start light today, just show up",
    severity: Severity::Warning,
    primary_cta: "Start Light Session",
    secondary_cta: "View Focus",
};

const RESET: Banner = Banner {
    title: "Reset Day",
    subtitle: "We'll start small and build again",
    severity: Severity::Default,
    primary_cta: "Start Fresh",
    secondary_cta: "View Focus",
};

/// Derived coaching snapshot, safe to throw away and recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachState {
    pub last_session_id: Option<Uuid>,
    pub last_session_ended_at: Option<DateTime<Utc>>,
    pub next_recommended_start_at: Option<DateTime<Utc>>,
    pub rest_hours: f32,
    pub average_interval_hours: f32,
    pub days_since_last_session: Option<i64>,
    pub recovery: RecoveryState,
    pub consistency: ConsistencyState,
    pub banner: Banner,
    pub computed_at: DateTime<Utc>,
}

/// Mean gap between the most recent ended sessions, or the default cadence
///
/// `ended` must be ordered newest first.
pub fn average_interval_hours(ended: &[&WorkoutSession], config: &TuningConfig) -> f32 {
    let ends: Vec<DateTime<Utc>> = ended
        .iter()
        .filter_map(|s| s.ended_at)
        .take(config.coach.interval_window + 1)
        .collect();
    if ends.len() < 2 {
        return config.coach.default_interval_hours;
    }
    let total: f32 = ends.windows(2).map(|w| hours_between(w[1], w[0])).sum();
    total / (ends.len() - 1) as f32
}

/// Expected cadence in whole days, never below one
pub fn cadence_days(average_interval_hours: f32) -> i64 {
    ((average_interval_hours / 24.0).ceil() as i64).max(1)
}

pub fn classify_consistency(
    days_since_last: Option<i64>,
    average_interval_hours: f32,
    config: &TuningConfig,
) -> ConsistencyState {
    let Some(days) = days_since_last else {
        return ConsistencyState::Reset;
    };
    let c = &config.consistency;
    let avg_days = cadence_days(average_interval_hours);
    if days <= avg_days.saturating_add(c.on_track_slack_days) {
        ConsistencyState::OnTrack
    } else if days <= avg_days.saturating_add(c.missed_slack_days) {
        ConsistencyState::Missed
    } else if days <= avg_days.saturating_add(c.drifting_slack_days) {
        ConsistencyState::Drifting
    } else {
        ConsistencyState::Reset
    }
}

/// Banner priority: an open rest window wins, otherwise cadence decides
pub fn banner_for(recovery: RecoveryState, consistency: ConsistencyState) -> Banner {
    match (recovery, consistency) {
        (RecoveryState::Rest, _) => RECOVERY_WINDOW,
        (_, ConsistencyState::OnTrack) => ON_TRACK,
        (_, ConsistencyState::Missed) => MISSED,
        (_, ConsistencyState::Drifting) => DRIFTING,
        (_, ConsistencyState::Reset) => RESET,
    }
}

pub fn compute_coach_state(
    history: &[WorkoutSession],
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> CoachState {
    let ended = ended_newest_first(history);
    let last = ended.first();
    let last_ended_at = last.and_then(|s| s.ended_at);
    let rest_hours = config.coach.rest_hours;

    // out-of-range windows leave no next start rather than overflowing
    let rest = Duration::try_milliseconds((f64::from(rest_hours) * 3_600_000.0) as i64);
    let next_start = last_ended_at
        .zip(rest)
        .and_then(|(end, rest)| end.checked_add_signed(rest));
    let recovery = match next_start {
        Some(next) if now < next => RecoveryState::Rest,
        _ => RecoveryState::Ready,
    };

    let average = average_interval_hours(&ended, config);
    let days_since = last_ended_at.map(|end| (now - end).num_hours().max(0) / 24);
    let consistency = classify_consistency(days_since, average, config);

    debug!(
        sessions = ended.len(),
        average_interval_hours = average,
        ?recovery,
        %consistency,
        "coach state recomputed"
    );

    CoachState {
        last_session_id: last.map(|s| s.id),
        last_session_ended_at: last_ended_at,
        next_recommended_start_at: next_start,
        rest_hours,
        average_interval_hours: average,
        days_since_last_session: days_since,
        recovery,
        consistency,
        banner: banner_for(recovery, consistency),
        computed_at: now,
    }
}

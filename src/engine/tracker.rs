//! Per-section load tracking: fatigue, weekly stimulus and last-trained time

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fatigue::{apply_gain, decay, fatigue_gain, replay_all};
use super::hours_between;
use super::stimulus::{needs_weekly_reset, stimulus_from_set, week_start};
use crate::config::TuningConfig;
use crate::profile::UserProfile;
use crate::session::{LoggedSet, WorkoutSession, chronological};
use crate::taxonomy::{MuscleSection, SectionMap};

/// Load state of a single section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionState {
    /// 0-100
    pub fatigue: f32,
    /// Hard-set credit since the last weekly reset
    pub weekly_stimulus: f32,
    pub last_trained_at: Option<DateTime<Utc>>,
}

pub type SectionStates = SectionMap<SectionState>;

/// Snapshot of every section plus the clocks the lazy updates compare against
///
/// Every operation returns a new snapshot; the receiver is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleTracker {
    pub sections: SectionStates,
    /// Time the fatigue values were last decayed to
    pub updated_at: DateTime<Utc>,
    pub last_weekly_reset: DateTime<Utc>,
}

impl MuscleTracker {
    /// Fresh tracker, all sections at zero
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            sections: SectionStates::default(),
            updated_at: now,
            last_weekly_reset: now,
        }
    }

    /// Full reset, equivalent to a new user
    pub fn reset(&self, now: DateTime<Utc>) -> Self {
        info!("tracker reset");
        Self::new(now)
    }

    /// Decay fatigue up to `now` and clear stale weekly stimulus
    ///
    /// Calling this twice with the same `now` is a no-op the second time.
    pub fn refresh(&self, now: DateTime<Utc>, tz: FixedOffset, config: &TuningConfig) -> Self {
        let mut next = self.clone();
        let hours = hours_between(self.updated_at, now);
        if hours > 0.0 {
            next.sections = next.sections.map(|_, s| SectionState {
                fatigue: decay(s.fatigue, hours, config),
                ..*s
            });
            next.updated_at = now;
        }
        if needs_weekly_reset(self.last_weekly_reset, now, tz, config) {
            info!(week_start = %week_start(now, tz, config), "weekly stimulus reset");
            next.sections = next.sections.map(|_, s| SectionState {
                weekly_stimulus: 0.0,
                ..*s
            });
            next.last_weekly_reset = now;
        }
        next
    }

    /// Apply one logged set on top of the state at the set's timestamp
    pub fn log_set(&self, set: &LoggedSet, profile: &UserProfile, config: &TuningConfig) -> Self {
        let mut next = self.refresh(set.timestamp, profile.local_tz(), config);
        let sensitivity = profile.sensitivity();
        let stimulus = stimulus_from_set(set, config);

        for section in MuscleSection::ALL {
            if fatigue_gain(set, section, sensitivity, config) <= 0.0 {
                continue;
            }
            let state = &mut next.sections[section];
            state.fatigue = apply_gain(state, set, section, sensitivity, config);
            state.weekly_stimulus += stimulus[section];
            state.last_trained_at = Some(
                state
                    .last_trained_at
                    .map_or(set.timestamp, |at| at.max(set.timestamp)),
            );
        }
        debug!(exercise = %set.exercise_id, rpe = set.rpe, "applied set to tracker");
        next
    }

    /// Rebuild the whole snapshot from the session log
    ///
    /// Fatigue comes from the replay walk; weekly stimulus counts hard sets
    /// logged since the start of the current training week.
    pub fn rebuild(
        history: &[WorkoutSession],
        profile: &UserProfile,
        now: DateTime<Utc>,
        config: &TuningConfig,
    ) -> Self {
        let fatigue = replay_all(history, profile.sensitivity(), now, config);
        let since = week_start(now, profile.local_tz(), config);

        let mut sections = fatigue.map(|_, f| SectionState {
            fatigue: *f,
            ..Default::default()
        });

        for session in chronological(history) {
            for set in session.sets() {
                if set.timestamp > now {
                    continue;
                }
                let stimulus = (set.timestamp >= since).then(|| stimulus_from_set(set, config));
                for section in MuscleSection::ALL {
                    if fatigue_gain(set, section, 1.0, config) <= 0.0 {
                        continue;
                    }
                    let state = &mut sections[section];
                    if let Some(stimulus) = &stimulus {
                        state.weekly_stimulus += stimulus[section];
                    }
                    state.last_trained_at = Some(
                        state
                            .last_trained_at
                            .map_or(set.timestamp, |at| at.max(set.timestamp)),
                    );
                }
            }
        }

        Self {
            sections,
            updated_at: now,
            last_weekly_reset: now,
        }
    }

    pub fn section(&self, section: MuscleSection) -> &SectionState {
        &self.sections[section]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::readiness::{Readiness, section_readiness};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 3, 6, 18, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn create_session(exercise: &str, sets: usize, rpe: f32, start: DateTime<Utc>) -> WorkoutSession {
        let mut session = WorkoutSession::start(vec![], None, start);
        let entry = session.add_exercise(exercise).unwrap();
        for _ in 0..sets {
            session.log_set(entry, 70.0, 8, rpe, start + Duration::minutes(10));
        }
        session.end(start + Duration::hours(1));
        session
    }

    #[test]
    fn test_log_bench_press_set() {
        let config = TuningConfig::default();
        let profile = UserProfile::default();
        let tracker = MuscleTracker::new(t0());
        let set = LoggedSet::new("bench-press", 70.0, 8, 9.0, t0());

        let next = tracker.log_set(&set, &profile, &config);
        let chest = next.section(MuscleSection::MidChest);
        assert!((chest.fatigue - 6.0 * 0.6 * 1.3).abs() < 1e-5);
        assert_eq!(chest.weekly_stimulus, 1.0);
        assert_eq!(chest.last_trained_at, Some(t0()));
        assert_eq!(next.section(MuscleSection::Triceps).weekly_stimulus, 0.5);
        assert_eq!(next.section(MuscleSection::FrontDelt).weekly_stimulus, 0.25);
        assert_eq!(*next.section(MuscleSection::Quads), SectionState::default());

        // original snapshot untouched
        assert_eq!(tracker.section(MuscleSection::MidChest).fatigue, 0.0);
    }

    #[test]
    fn test_sensitivity_scales_gain() {
        let config = TuningConfig::default();
        let profile = UserProfile {
            fatigue_sensitivity: 1.2,
            ..Default::default()
        };
        let set = LoggedSet::new("bench-press", 70.0, 8, 9.0, t0());
        let next = MuscleTracker::new(t0()).log_set(&set, &profile, &config);
        let expected = 6.0 * 0.6 * 1.2 * 1.3;
        assert!((next.section(MuscleSection::MidChest).fatigue - expected).abs() < 1e-4);
    }

    #[test]
    fn test_refresh_decays_to_caution() {
        let config = TuningConfig::default();
        let mut tracker = MuscleTracker::new(t0());
        tracker.sections[MuscleSection::Quads] = SectionState {
            fatigue: 80.0,
            weekly_stimulus: 8.0,
            last_trained_at: Some(t0()),
        };

        let now = t0() + Duration::hours(10);
        let refreshed = tracker.refresh(now, utc(), &config);
        let quads = refreshed.section(MuscleSection::Quads);
        assert_eq!(quads.fatigue, 65.0);
        assert_eq!(section_readiness(quads, 0, now, &config), Readiness::Caution);

        // idempotent for the same instant
        assert_eq!(refreshed.refresh(now, utc(), &config), refreshed);
    }

    #[test]
    fn test_refresh_clears_stimulus_on_new_week() {
        let config = TuningConfig::default();
        let mut tracker = MuscleTracker::new(t0());
        tracker.sections[MuscleSection::Lats].weekly_stimulus = 12.0;

        let same_week = tracker.refresh(t0() + Duration::days(2), utc(), &config);
        assert_eq!(same_week.section(MuscleSection::Lats).weekly_stimulus, 12.0);

        // following Monday
        let next_week = tracker.refresh(t0() + Duration::days(5), utc(), &config);
        assert_eq!(next_week.section(MuscleSection::Lats).weekly_stimulus, 0.0);
        let again = next_week.refresh(t0() + Duration::days(5), utc(), &config);
        assert_eq!(again, next_week);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let config = TuningConfig::default();
        let set = LoggedSet::new("squat", 100.0, 5, 9.0, t0());
        let tracker = MuscleTracker::new(t0()).log_set(&set, &UserProfile::default(), &config);
        let reset = tracker.reset(t0());
        assert!(reset.sections.values().all(|s| *s == SectionState::default()));
    }

    #[test]
    fn test_rebuild_from_history() {
        let config = TuningConfig::default();
        let profile = UserProfile::default();
        // Monday and Wednesday of the same week
        let monday = t0() - Duration::days(2);
        let history = vec![
            create_session("calf-raise", 4, 8.0, monday),
            create_session("calf-raise", 3, 6.0, t0()),
        ];
        let now = t0() + Duration::hours(3);
        let tracker = MuscleTracker::rebuild(&history, &profile, now, &config);
        let calves = tracker.section(MuscleSection::Calves);

        // only the rpe 8 sets are hard
        assert_eq!(calves.weekly_stimulus, 4.0);
        assert_eq!(calves.last_trained_at, Some(t0() + Duration::minutes(10)));
        assert!(calves.fatigue > 0.0);
        assert_eq!(tracker.section(MuscleSection::Lats).last_trained_at, None);
    }

    #[test]
    fn test_rebuild_skips_sets_after_now() {
        let config = TuningConfig::default();
        let history = vec![create_session("calf-raise", 4, 8.0, t0())];

        // sets are stamped at +10 min
        let before = MuscleTracker::rebuild(&history, &UserProfile::default(), t0() + Duration::minutes(5), &config);
        assert_eq!(*before.section(MuscleSection::Calves), SectionState::default());

        let after = MuscleTracker::rebuild(&history, &UserProfile::default(), t0() + Duration::minutes(20), &config);
        let calves = after.section(MuscleSection::Calves);
        assert!(calves.fatigue > 0.0);
        assert_eq!(calves.weekly_stimulus, 4.0);
        assert!(calves.last_trained_at.is_some());
    }

    #[test]
    fn test_rebuild_ignores_previous_week_stimulus() {
        let config = TuningConfig::default();
        let history = vec![create_session("lat-pulldown", 5, 9.0, t0() - Duration::days(7))];
        let tracker = MuscleTracker::rebuild(&history, &UserProfile::default(), t0(), &config);
        assert_eq!(tracker.section(MuscleSection::Lats).weekly_stimulus, 0.0);
        assert!(tracker.section(MuscleSection::Lats).last_trained_at.is_some());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let config = TuningConfig::default();
        let history = vec![
            create_session("squat", 5, 9.0, t0() - Duration::days(1)),
            create_session("bench-press", 4, 8.0, t0()),
        ];
        let now = t0() + Duration::hours(6);
        let first = MuscleTracker::rebuild(&history, &UserProfile::default(), now, &config);
        let second = MuscleTracker::rebuild(&history, &UserProfile::default(), now, &config);
        assert_eq!(first, second);
    }
}

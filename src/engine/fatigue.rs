//! Fatigue engine - set load in, linear recovery out

use chrono::{DateTime, Utc};
use tracing::debug;

use super::hours_between;
use super::tracker::SectionState;
use crate::config::TuningConfig;
use crate::exercises::contribution_weight;
use crate::session::{LoggedSet, WorkoutSession, chronological};
use crate::taxonomy::{MuscleSection, SectionMap};

/// Effort multiplier for an RPE; steps up sharply near failure
pub fn effort_factor(rpe: f32, config: &TuningConfig) -> f32 {
    let e = &config.effort;
    match rpe {
        r if r >= 10.0 => e.rpe10,
        r if r >= 9.0 => e.rpe9,
        r if r >= 8.0 => e.rpe8,
        r if r >= 7.0 => e.rpe7,
        r if r >= 6.0 => e.rpe6,
        _ => e.rpe5,
    }
}

/// Fatigue added to one section by one set, 0 if the exercise misses the section
pub fn fatigue_gain(
    set: &LoggedSet,
    section: MuscleSection,
    sensitivity: f32,
    config: &TuningConfig,
) -> f32 {
    let weight = contribution_weight(&set.exercise_id, section);
    if weight <= 0.0 {
        return 0.0;
    }
    config.fatigue.base_gain_per_set * weight * sensitivity * effort_factor(set.rpe, config)
}

/// Linear recovery, floored at the minimum fatigue
pub fn decay(current: f32, hours_elapsed: f32, config: &TuningConfig) -> f32 {
    let hours = hours_elapsed.max(0.0);
    (current - hours * config.fatigue.recovery_per_hour).max(config.fatigue.min_fatigue)
}

/// Section fatigue after a set, capped at the maximum
pub fn apply_gain(
    state: &SectionState,
    set: &LoggedSet,
    section: MuscleSection,
    sensitivity: f32,
    config: &TuningConfig,
) -> f32 {
    add_capped(state.fatigue, fatigue_gain(set, section, sensitivity, config), config)
}

fn add_capped(fatigue: f32, gain: f32, config: &TuningConfig) -> f32 {
    (fatigue + gain).min(config.fatigue.max_fatigue)
}

/// Per-section fatigue a set adds, rounded to one decimal for display
pub fn set_fatigue_contributions(
    set: &LoggedSet,
    sensitivity: f32,
    config: &TuningConfig,
) -> SectionMap<f32> {
    SectionMap::from_fn(|section| {
        let gain = fatigue_gain(set, section, sensitivity, config);
        (gain * 10.0).round() / 10.0
    })
}

/// Rebuild one section's fatigue from the session log alone
///
/// Sessions are walked oldest first: decay across the gap before each
/// session, add every set's gain, then decay from the last session to `now`.
pub fn replay_fatigue(
    history: &[WorkoutSession],
    section: MuscleSection,
    sensitivity: f32,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> f32 {
    replay_all(history, sensitivity, now, config)[section]
}

/// Same walk as [`replay_fatigue`] for every section at once
pub fn replay_all(
    history: &[WorkoutSession],
    sensitivity: f32,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> SectionMap<f32> {
    let sessions = chronological(history);
    let mut fatigue: SectionMap<f32> = SectionMap::default();
    let mut last_end: Option<DateTime<Utc>> = None;

    for session in &sessions {
        if let Some(end) = last_end {
            let gap = hours_between(end, session.started_at);
            fatigue = fatigue.map(|_, f| decay(*f, gap, config));
        }
        // sets logged after `now` have not happened yet
        for set in session.sets().filter(|set| set.timestamp <= now) {
            for section in MuscleSection::ALL {
                let gain = fatigue_gain(set, section, sensitivity, config);
                if gain > 0.0 {
                    fatigue[section] = add_capped(fatigue[section], gain, config);
                }
            }
        }
        let end = session.effective_end();
        last_end = Some(last_end.map_or(end, |prev| prev.max(end)));
    }

    if let Some(end) = last_end {
        let hours = hours_between(end, now);
        fatigue = fatigue.map(|_, f| decay(*f, hours, config));
    }

    debug!(sessions = sessions.len(), "replayed fatigue");
    fatigue
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap()
    }

    fn create_set(exercise: &str, rpe: f32) -> LoggedSet {
        LoggedSet::new(exercise, 70.0, 8, rpe, t0())
    }

    fn create_session(exercise: &str, sets: usize, rpe: f32, start: DateTime<Utc>) -> WorkoutSession {
        let mut session = WorkoutSession::start(vec![], None, start);
        let entry = session.add_exercise(exercise).unwrap();
        for i in 0..sets {
            session.log_set(entry, 60.0, 8, rpe, start + Duration::minutes(i as i64 * 3));
        }
        session.end(start + Duration::hours(1));
        session
    }

    #[test]
    fn test_effort_steps() {
        let config = TuningConfig::default();
        assert_eq!(effort_factor(10.0, &config), 1.5);
        assert_eq!(effort_factor(9.0, &config), 1.3);
        assert_eq!(effort_factor(9.5, &config), 1.3);
        assert_eq!(effort_factor(8.0, &config), 1.1);
        assert_eq!(effort_factor(7.0, &config), 1.0);
        assert_eq!(effort_factor(6.0, &config), 0.85);
        assert_eq!(effort_factor(3.0, &config), 0.7);
    }

    #[test]
    fn test_bench_press_gain_on_mid_chest() {
        let config = TuningConfig::default();
        let set = create_set("bench-press", 9.0);
        let gain = fatigue_gain(&set, MuscleSection::MidChest, 1.0, &config);
        assert!((gain - 6.0 * 0.6 * 1.3).abs() < 1e-5);

        let sensitive = fatigue_gain(&set, MuscleSection::MidChest, 1.2, &config);
        assert!((sensitive - 6.0 * 0.6 * 1.2 * 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_gain_zero_for_untargeted_or_unknown() {
        let config = TuningConfig::default();
        let set = create_set("bench-press", 9.0);
        assert_eq!(fatigue_gain(&set, MuscleSection::Quads, 1.0, &config), 0.0);

        let unknown = create_set("moon-press", 10.0);
        for section in MuscleSection::ALL {
            assert_eq!(fatigue_gain(&unknown, section, 1.0, &config), 0.0);
        }
    }

    #[test]
    fn test_decay_linear_and_floored() {
        let config = TuningConfig::default();
        assert_eq!(decay(80.0, 10.0, &config), 65.0);
        assert_eq!(decay(10.0, 100.0, &config), 0.0);
        assert_eq!(decay(40.0, -5.0, &config), 40.0);
    }

    #[test]
    fn test_apply_gain_caps_at_max() {
        let config = TuningConfig::default();
        let state = SectionState {
            fatigue: 98.0,
            ..Default::default()
        };
        let set = create_set("calf-raise", 10.0);
        assert_eq!(apply_gain(&state, &set, MuscleSection::Calves, 1.0, &config), 100.0);
    }

    #[test]
    fn test_set_contributions_rounded() {
        let config = TuningConfig::default();
        let set = create_set("bench-press", 9.0);
        let contributions = set_fatigue_contributions(&set, 1.0, &config);
        assert_eq!(contributions[MuscleSection::MidChest], 4.7);
        assert!(contributions[MuscleSection::Triceps] > 1.8);
        assert!(contributions[MuscleSection::Triceps] < contributions[MuscleSection::MidChest]);
        assert_eq!(contributions[MuscleSection::FrontDelt], 1.2);
        assert_eq!(contributions[MuscleSection::Lats], 0.0);
    }

    #[test]
    fn test_replay_empty_history() {
        let config = TuningConfig::default();
        assert_eq!(replay_fatigue(&[], MuscleSection::MidChest, 1.0, t0(), &config), 0.0);
    }

    #[test]
    fn test_replay_decays_between_sessions_and_to_now() {
        let config = TuningConfig::default();
        let first = create_session("calf-raise", 5, 7.0, t0());
        let second = create_session("calf-raise", 5, 7.0, t0() + Duration::hours(11));
        // out of order on purpose
        let history = vec![second, first];

        // 5 sets x 6.0 = 30, 10h gap -> 15, +30 = 45, 2h after second end -> 42
        let now = t0() + Duration::hours(14);
        let fatigue = replay_fatigue(&history, MuscleSection::Calves, 1.0, now, &config);
        assert!((fatigue - 42.0).abs() < 1e-3, "got {}", fatigue);
    }

    #[test]
    fn test_replay_caps_inside_session() {
        let config = TuningConfig::default();
        let session = create_session("calf-raise", 30, 10.0, t0());
        let fatigue = replay_fatigue(&[session], MuscleSection::Calves, 1.0, t0() + Duration::hours(1), &config);
        assert_eq!(fatigue, 100.0);
    }

    #[test]
    fn test_replay_skips_malformed_sessions() {
        let config = TuningConfig::default();
        let mut broken = create_session("calf-raise", 5, 7.0, t0());
        broken.ended_at = None;
        let fatigue = replay_fatigue(&[broken], MuscleSection::Calves, 1.0, t0(), &config);
        assert_eq!(fatigue, 0.0);
    }

    #[test]
    fn test_replay_ignores_sets_after_now() {
        let config = TuningConfig::default();
        let session = create_session("calf-raise", 5, 7.0, t0());
        // sets at +0, +3, +6 min count; +9 and +12 are still ahead
        let now = t0() + Duration::minutes(7);
        let fatigue = replay_fatigue(&[session], MuscleSection::Calves, 1.0, now, &config);
        assert!((fatigue - 18.0).abs() < 1e-3, "got {}", fatigue);
    }

    proptest! {
        #[test]
        fn prop_decay_bounded(f in 0.0f32..=100.0, h in 0.0f32..500.0) {
            let config = TuningConfig::default();
            let decayed = decay(f, h, &config);
            prop_assert!(decayed <= f);
            prop_assert!(decayed >= 0.0);
        }

        #[test]
        fn prop_gain_bounded(rpe in 1.0f32..=10.0, idx in 0usize..MuscleSection::COUNT, ex in 0usize..crate::exercises::EXERCISES.len()) {
            let config = TuningConfig::default();
            let exercise = &crate::exercises::EXERCISES[ex];
            let set = create_set(exercise.id, rpe);
            let gain = fatigue_gain(&set, MuscleSection::ALL[idx], 1.0, &config);
            let ceiling = config.fatigue.base_gain_per_set * effort_factor(10.0, &config);
            prop_assert!(gain >= 0.0);
            prop_assert!(gain <= ceiling);
        }

        #[test]
        fn prop_effort_non_decreasing(a in 5.0f32..=10.0, b in 5.0f32..=10.0) {
            let config = TuningConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(effort_factor(lo, &config) <= effort_factor(hi, &config));
        }

        #[test]
        fn prop_replay_deterministic(gap_hours in 1i64..96, sets in 1usize..8, rpe in 5.0f32..=10.0) {
            let config = TuningConfig::default();
            let history = vec![
                create_session("squat", sets, rpe, t0()),
                create_session("leg-press", sets, rpe, t0() + Duration::hours(gap_hours)),
            ];
            let now = t0() + Duration::hours(gap_hours + 5);
            let first = replay_all(&history, 1.0, now, &config);
            let second = replay_all(&history, 1.0, now, &config);
            prop_assert_eq!(first, second);
        }
    }
}

//! Training statistics and badges, replayed from the session log

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::stimulus::week_start;
use crate::config::TuningConfig;
use crate::exercises::find_exercise;
use crate::profile::UserProfile;
use crate::session::{WorkoutSession, chronological};
use crate::taxonomy::MuscleGroup;

const STREAK_BADGE_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaviestLift {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight_kg: f32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Badge {
    fn locked(id: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
            unlocked_at: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingStats {
    pub total_sessions: usize,
    /// Consecutive local training days ending today or yesterday
    pub current_streak: u32,
    pub longest_streak: u32,
    pub heaviest_lift: Option<HeaviestLift>,
    /// Sets that beat the previous best weight for their exercise
    pub pr_count: u32,
    pub favorite_group: Option<MuscleGroup>,
    pub badges: Vec<Badge>,
}

pub fn compute_stats(
    history: &[WorkoutSession],
    profile: &UserProfile,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> TrainingStats {
    let sessions = chronological(history);
    let tz = profile.local_tz();

    let mut first_workout = Badge::locked("first-workout", "First Steps", "Complete your first workout");
    let mut week_warrior = Badge::locked("consistency-7", "Week Warrior", "Train for 7 days straight");
    let mut full_body = Badge::locked("full-body", "Full Body Focus", "Hit all muscle groups in one week");
    let mut pr_crusher = Badge::locked("pr-crusher", "PR Crusher", "Beat a previous best");

    // local training day -> first session end on that day
    let mut days: BTreeMap<NaiveDate, DateTime<Utc>> = BTreeMap::new();
    let mut total_sessions = 0;
    for session in sessions.iter().filter(|s| s.is_ended()) {
        let end = session.effective_end();
        total_sessions += 1;
        first_workout.unlocked_at.get_or_insert(end);
        days.entry(profile.local_date(session.started_at)).or_insert(end);
    }

    let mut longest_streak = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for (&day, &end) in &days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        if run == STREAK_BADGE_DAYS {
            week_warrior.unlocked_at.get_or_insert(end);
        }
        longest_streak = longest_streak.max(run);
        previous = Some(day);
    }
    let today = profile.local_date(now);
    let current_streak = match previous {
        Some(last) if today - last <= Duration::days(1) => run,
        _ => 0,
    };

    let mut heaviest_lift: Option<HeaviestLift> = None;
    let mut bests: HashMap<&str, f32> = HashMap::new();
    let mut pr_count = 0;
    let mut group_sets: HashMap<MuscleGroup, u32> = HashMap::new();
    let mut weekly_groups: HashMap<DateTime<Utc>, HashSet<MuscleGroup>> = HashMap::new();

    for session in &sessions {
        for set in session.sets() {
            let Some(exercise) = find_exercise(&set.exercise_id) else {
                continue;
            };

            match bests.get(exercise.id).copied() {
                Some(best) if set.weight_kg > best => {
                    pr_count += 1;
                    pr_crusher.unlocked_at.get_or_insert(set.timestamp);
                    bests.insert(exercise.id, set.weight_kg);
                }
                Some(_) => {}
                None => {
                    bests.insert(exercise.id, set.weight_kg);
                }
            }

            if heaviest_lift.as_ref().is_none_or(|h| set.weight_kg > h.weight_kg) {
                heaviest_lift = Some(HeaviestLift {
                    exercise_id: exercise.id.to_string(),
                    exercise_name: exercise.name.to_string(),
                    weight_kg: set.weight_kg,
                    at: set.timestamp,
                });
            }

            *group_sets.entry(exercise.muscle_group).or_default() += 1;

            let week = weekly_groups
                .entry(week_start(set.timestamp, tz, config))
                .or_default();
            week.insert(exercise.muscle_group);
            if week.len() == MuscleGroup::ALL.len() {
                full_body.unlocked_at.get_or_insert(set.timestamp);
            }
        }
    }

    // ties resolved by taxonomy order
    let favorite_group = MuscleGroup::ALL
        .iter()
        .filter_map(|g| group_sets.get(g).map(|&n| (*g, n)))
        .fold(None, |best: Option<(MuscleGroup, u32)>, (g, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((g, n)),
        })
        .map(|(g, _)| g);

    TrainingStats {
        total_sessions,
        current_streak,
        longest_streak,
        heaviest_lift,
        pr_count,
        favorite_group,
        badges: vec![first_workout, week_warrior, full_body, pr_crusher],
    }
}

//! Workout session log - the single source of truth for all derived state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::exercises::find_exercise;
use crate::taxonomy::{MuscleGroup, SectionMap};

/// Pre-workout soreness, 0 (none) to 4 (very sore) per section
pub type SorenessMap = SectionMap<u8>;

pub const MAX_SORENESS: u8 = 4;

/// One performed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    pub id: Uuid,
    pub exercise_id: String,
    pub weight_kg: f32,
    pub reps: u32,
    /// Rate of perceived exertion, 1-10
    pub rpe: f32,
    pub timestamp: DateTime<Utc>,
}

impl LoggedSet {
    pub fn new(exercise_id: &str, weight_kg: f32, reps: u32, rpe: f32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.to_string(),
            weight_kg: weight_kg.max(0.0),
            reps,
            rpe: clamp_rpe(rpe),
            timestamp,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.rpe.is_finite() && self.weight_kg.is_finite()
    }
}

fn clamp_rpe(rpe: f32) -> f32 {
    if rpe.is_finite() { rpe.clamp(1.0, 10.0) } else { 1.0 }
}

/// An exercise within a session and the sets performed for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: Uuid,
    pub exercise_id: String,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    #[serde(default)]
    pub duration_secs: Option<i64>,
    #[serde(default)]
    pub focus_muscles: Vec<MuscleGroup>,
    #[serde(default)]
    pub entries: Vec<ExerciseEntry>,
    #[serde(default)]
    pub soreness_snapshot: Option<SorenessMap>,
}

/// Partial update of a logged set
#[derive(Debug, Clone, Copy, Default)]
pub struct SetUpdate {
    pub weight_kg: Option<f32>,
    pub reps: Option<u32>,
    pub rpe: Option<f32>,
}

impl WorkoutSession {
    pub fn start(focus_muscles: Vec<MuscleGroup>, soreness: Option<SorenessMap>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            ended_at: None,
            status: SessionStatus::InProgress,
            duration_secs: None,
            focus_muscles,
            entries: Vec::new(),
            soreness_snapshot: soreness,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn is_ended(&self) -> bool {
        self.status == SessionStatus::Ended && self.ended_at.is_some()
    }

    /// Add an exercise, or return the existing entry for it
    ///
    /// Returns `None` for unknown exercises or sessions that already ended.
    pub fn add_exercise(&mut self, exercise_id: &str) -> Option<Uuid> {
        if !self.is_in_progress() {
            return None;
        }
        if let Some(existing) = self.entries.iter().find(|e| e.exercise_id == exercise_id) {
            return Some(existing.id);
        }
        let exercise = find_exercise(exercise_id)?;
        let entry = ExerciseEntry {
            id: Uuid::new_v4(),
            exercise_id: exercise.id.to_string(),
            name: exercise.name.to_string(),
            sets: Vec::new(),
        };
        let id = entry.id;
        self.entries.push(entry);
        Some(id)
    }

    /// Record a set against an entry, returning the stored set
    pub fn log_set(
        &mut self,
        entry_id: Uuid,
        weight_kg: f32,
        reps: u32,
        rpe: f32,
        now: DateTime<Utc>,
    ) -> Option<LoggedSet> {
        if !self.is_in_progress() {
            return None;
        }
        let entry = self.entries.iter_mut().find(|e| e.id == entry_id)?;
        let set = LoggedSet::new(&entry.exercise_id, weight_kg, reps, rpe, now);
        entry.sets.push(set.clone());
        Some(set)
    }

    pub fn update_set(&mut self, entry_id: Uuid, set_id: Uuid, update: SetUpdate) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        let Some(set) = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .and_then(|e| e.sets.iter_mut().find(|s| s.id == set_id))
        else {
            return false;
        };
        if let Some(weight) = update.weight_kg {
            set.weight_kg = weight.max(0.0);
        }
        if let Some(reps) = update.reps {
            set.reps = reps;
        }
        if let Some(rpe) = update.rpe {
            set.rpe = clamp_rpe(rpe);
        }
        true
    }

    pub fn delete_set(&mut self, entry_id: Uuid, set_id: Uuid) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.id == entry_id) {
            Some(entry) => {
                let before = entry.sets.len();
                entry.sets.retain(|s| s.id != set_id);
                entry.sets.len() != before
            }
            None => false,
        }
    }

    pub fn remove_exercise(&mut self, entry_id: Uuid) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.id != entry_id);
        self.entries.len() != before
    }

    /// Freeze the session
    pub fn end(&mut self, now: DateTime<Utc>) {
        if !self.is_in_progress() {
            return;
        }
        let ended_at = now.max(self.started_at);
        self.ended_at = Some(ended_at);
        self.duration_secs = Some((ended_at - self.started_at).num_seconds());
        self.status = SessionStatus::Ended;
    }

    /// All sets in entry order
    pub fn sets(&self) -> impl Iterator<Item = &LoggedSet> {
        self.entries.iter().flat_map(|e| e.sets.iter())
    }

    /// When the session stopped adding load: end time, else the last set, else the start
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.ended_at
            .or_else(|| self.sets().map(|s| s.timestamp).max())
            .unwrap_or(self.started_at)
            .max(self.started_at)
    }

    /// Malformed sessions are skipped by every computation
    pub fn is_well_formed(&self) -> bool {
        let end_ok = match (self.status, self.ended_at) {
            (SessionStatus::Ended, Some(end)) => end >= self.started_at,
            (SessionStatus::Ended, None) => false,
            (SessionStatus::InProgress, _) => true,
        };
        end_ok && self.sets().all(LoggedSet::is_well_formed)
    }
}

/// Well-formed sessions ordered oldest first; the input is left untouched
pub fn chronological(history: &[WorkoutSession]) -> Vec<&WorkoutSession> {
    let mut sessions: Vec<&WorkoutSession> = history
        .iter()
        .filter(|s| {
            let ok = s.is_well_formed();
            if !ok {
                warn!(session = %s.id, "skipping malformed session");
            }
            ok
        })
        .collect();
    sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
    sessions
}

/// Ended sessions ordered most recently ended first
pub fn ended_newest_first(history: &[WorkoutSession]) -> Vec<&WorkoutSession> {
    let mut ended: Vec<&WorkoutSession> = history
        .iter()
        .filter(|s| s.is_ended() && s.is_well_formed())
        .collect();
    ended.sort_by(|a, b| b.ended_at.cmp(&a.ended_at).then(b.id.cmp(&a.id)));
    ended
}

/// Most recent set of an exercise, looking at the current session first
pub fn last_set_for_exercise<'a>(
    current: Option<&'a WorkoutSession>,
    history: &'a [WorkoutSession],
    exercise_id: &str,
) -> Option<&'a LoggedSet> {
    let from_session = |session: &'a WorkoutSession| {
        session
            .entries
            .iter()
            .find(|e| e.exercise_id == exercise_id)
            .and_then(|e| e.sets.last())
    };

    current.and_then(from_session).or_else(|| {
        chronological(history)
            .into_iter()
            .rev()
            .find_map(from_session)
    })
}

//! Plan engine - exercise recommendations, fatigue warnings and focus suggestions

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::readiness::{Readiness, section_readiness};
use super::stimulus::{StimulusZone, stimulus_zone};
use super::tracker::SectionStates;
use crate::config::TuningConfig;
use crate::exercises::{Exercise, exercises_by_section, get_all_exercises};
use crate::session::SorenessMap;
use crate::taxonomy::{MuscleGroup, MuscleSection, SectionMap};

/// A recommended exercise with explanation
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(serialize_with = "serialize_exercise_id")]
    pub exercise: &'static Exercise,
    pub reason: String,
    pub target_sections: Vec<MuscleSection>,
    pub priority: f32,
}

/// Flagged section inside a chosen focus, with gentler options
#[derive(Debug, Clone, Serialize)]
pub struct PlanWarning {
    pub section: MuscleSection,
    pub readiness: Readiness,
    pub message: String,
    #[serde(serialize_with = "serialize_exercise_ids")]
    pub alternatives: Vec<&'static Exercise>,
}

fn serialize_exercise_id<S: Serializer>(exercise: &&'static Exercise, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(exercise.id)
}

fn serialize_exercise_ids<S: Serializer>(
    exercises: &[&'static Exercise],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(exercises.iter().map(|e| e.id))
}

/// Readiness and stimulus zone of every section at `now`
struct SectionView {
    readiness: SectionMap<Readiness>,
    zones: SectionMap<StimulusZone>,
}

impl SectionView {
    fn new(states: &SectionStates, soreness: &SorenessMap, now: DateTime<Utc>, config: &TuningConfig) -> Self {
        Self {
            readiness: states.map(|s, state| section_readiness(state, soreness[s], now, config)),
            zones: states.map(|_, state| stimulus_zone(state.weekly_stimulus, config)),
        }
    }
}

fn exercise_priority(exercise: &Exercise, view: &SectionView) -> f32 {
    exercise
        .contributions
        .iter()
        .map(|&(section, weight)| {
            let readiness = match view.readiness[section] {
                Readiness::Primed => 3.0,
                Readiness::Ready => 2.0,
                _ => 0.0,
            };
            let volume = if view.zones[section] == StimulusZone::Undertrained {
                2.0
            } else {
                0.0
            };
            weight * (readiness + volume)
        })
        .sum()
}

fn recommendation_reason(section: MuscleSection, readiness: Readiness, zone: StimulusZone) -> String {
    let name = section.name();
    match (readiness, zone) {
        (Readiness::Primed, StimulusZone::Undertrained) => {
            format!("Perfect timing! {} is primed and needs more volume.", name)
        }
        (Readiness::Primed, _) => format!("{} is fully recovered and ready for growth.", name),
        (_, StimulusZone::Undertrained) => format!("Helps fill your weekly {} volume gap.", name),
        _ => format!("Good compound movement for {}.", name),
    }
}

/// Ranked exercises for the chosen focus groups
///
/// Sections that are CAUTION or RECOVERING and not undertrained are skipped.
/// Each exercise appears once, at the first section that admits it.
pub fn recommend_exercises(
    focus: &[MuscleGroup],
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Vec<Recommendation> {
    let view = SectionView::new(states, soreness, now, config);
    let mut recommendations: Vec<Recommendation> = Vec::new();

    for group in focus {
        for &section in group.sections() {
            let readiness = view.readiness[section];
            let zone = view.zones[section];
            if zone != StimulusZone::Undertrained && !readiness.is_trainable() {
                continue;
            }

            for exercise in exercises_by_section(section) {
                if exercise.contribution(section) < config.plan.recommend_min_contribution {
                    continue;
                }
                if recommendations.iter().any(|r| r.exercise.id == exercise.id) {
                    continue;
                }
                recommendations.push(Recommendation {
                    exercise,
                    reason: recommendation_reason(section, readiness, zone),
                    target_sections: exercise.target_sections(),
                    priority: exercise_priority(exercise, &view),
                });
            }
        }
    }

    recommendations.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    recommendations
}

/// Exercises that still hit `section` without loading other tired sections
pub fn find_alternatives(
    section: MuscleSection,
    states: &SectionStates,
    config: &TuningConfig,
) -> Vec<&'static Exercise> {
    let p = &config.plan;
    get_all_exercises()
        .iter()
        .filter(|exercise| exercise.contribution(section) >= p.alternative_min_contribution)
        .filter(|exercise| {
            !exercise.contributions.iter().any(|&(other, weight)| {
                other != section
                    && weight > p.alternative_other_contribution
                    && states[other].fatigue > p.alternative_max_other_fatigue
            })
        })
        .take(p.max_alternatives)
        .collect()
}

/// One warning per CAUTION or RECOVERING section inside the focus groups
pub fn warnings(
    focus: &[MuscleGroup],
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Vec<PlanWarning> {
    focus
        .iter()
        .flat_map(|group| group.sections().iter().copied())
        .filter_map(|section| {
            let readiness = section_readiness(&states[section], soreness[section], now, config);
            let message = match readiness {
                Readiness::Recovering => format!(
                    "{} is still recovering. Consider resting or lighter work.",
                    section.name()
                ),
                Readiness::Caution => {
                    format!("{} is approaching fatigue. Monitor intensity.", section.name())
                }
                _ => return None,
            };
            Some(PlanWarning {
                section,
                readiness,
                message,
                alternatives: find_alternatives(section, states, config),
            })
        })
        .collect()
}

/// Per-group focus score: readiness of each section plus weekly volume need
pub fn focus_scores(
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Vec<(MuscleGroup, i32)> {
    let view = SectionView::new(states, soreness, now, config);
    MuscleGroup::ALL
        .iter()
        .map(|&group| {
            let score = group
                .sections()
                .iter()
                .map(|&s| {
                    let readiness = match view.readiness[s] {
                        Readiness::Primed => 3,
                        Readiness::Ready => 1,
                        Readiness::Caution => -1,
                        Readiness::Recovering => -3,
                    };
                    let zone = match view.zones[s] {
                        StimulusZone::Undertrained => 2,
                        StimulusZone::Optimal => 0,
                        StimulusZone::Overtrained => -2,
                    };
                    readiness + zone
                })
                .sum();
            (group, score)
        })
        .collect()
}

/// Highest scoring groups, ties kept in taxonomy order
pub fn suggested_focus(
    states: &SectionStates,
    soreness: &SorenessMap,
    now: DateTime<Utc>,
    config: &TuningConfig,
) -> Vec<MuscleGroup> {
    let mut scores = focus_scores(states, soreness, now, config);
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores
        .into_iter()
        .take(config.ui.max_focus_muscles)
        .map(|(group, _)| group)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tracker::SectionState;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap()
    }

    fn create_state(fatigue: f32, weekly_stimulus: f32) -> SectionState {
        SectionState {
            fatigue,
            weekly_stimulus,
            last_trained_at: Some(now() - Duration::hours(6)),
        }
    }

    /// Every section trained recently, optimal volume, low fatigue: READY
    fn create_ready_states() -> SectionStates {
        SectionStates::from_fn(|_| create_state(10.0, 12.0))
    }

    fn ids(recommendations: &[Recommendation]) -> Vec<&'static str> {
        recommendations.iter().map(|r| r.exercise.id).collect()
    }

    #[test]
    fn test_recommendations_for_chest() {
        let config = TuningConfig::default();
        let recs = recommend_exercises(
            &[MuscleGroup::Chest],
            &create_ready_states(),
            &SorenessMap::default(),
            now(),
            &config,
        );
        let found = ids(&recs);
        for id in ["bench-press", "incline-press", "dumbbell-fly", "cable-crossover"] {
            assert!(found.contains(&id), "missing {}", id);
        }
        // triceps dip only hits chest at 0.15
        assert!(!found.contains(&"tricep-dip"));
        for pair in recs.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let config = TuningConfig::default();
        let recs = recommend_exercises(
            &[MuscleGroup::Chest, MuscleGroup::Chest, MuscleGroup::Shoulders],
            &create_ready_states(),
            &SorenessMap::default(),
            now(),
            &config,
        );
        let found = ids(&recs);
        let mut unique = found.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(found.len(), unique.len());
    }

    #[test]
    fn test_tired_sections_excluded() {
        let config = TuningConfig::default();
        let mut states = create_ready_states();
        for &s in MuscleGroup::Biceps.sections() {
            states[s] = create_state(75.0, 12.0);
        }
        let recs = recommend_exercises(&[MuscleGroup::Biceps], &states, &SorenessMap::default(), now(), &config);
        assert!(recs.is_empty());

        // undertrained sections are still recommended while tired
        states[MuscleSection::Biceps].weekly_stimulus = 2.0;
        let recs = recommend_exercises(&[MuscleGroup::Biceps], &states, &SorenessMap::default(), now(), &config);
        assert!(!recs.is_empty());
    }

    #[test]
    fn test_priority_prefers_primed_and_undertrained() {
        let config = TuningConfig::default();
        let mut states = create_ready_states();
        // never trained, no volume: PRIMED + undertrained
        states[MuscleSection::LateralDelt] = SectionState::default();
        states[MuscleSection::RearDelt] = SectionState::default();
        let recs = recommend_exercises(&[MuscleGroup::Shoulders], &states, &SorenessMap::default(), now(), &config);
        assert_eq!(recs[0].exercise.id, "lateral-raise");
        // 0.85 * (3 + 2) + 0.15 * (3 + 2)
        assert!((recs[0].priority - 5.0).abs() < 1e-4);
        assert!(recs[0].reason.starts_with("Perfect timing!"));
    }

    #[test]
    fn test_warnings_with_alternatives() {
        let config = TuningConfig::default();
        let mut states = create_ready_states();
        states[MuscleSection::MidChest] = create_state(72.0, 12.0);
        states[MuscleSection::Triceps] = create_state(60.0, 12.0);

        let found = warnings(&[MuscleGroup::Chest], &states, &SorenessMap::default(), now(), &config);
        assert_eq!(found.len(), 1);
        let warning = &found[0];
        assert_eq!(warning.section, MuscleSection::MidChest);
        assert_eq!(warning.readiness, Readiness::Recovering);
        assert!(warning.message.contains("still recovering"));

        let alt: Vec<_> = warning.alternatives.iter().map(|e| e.id).collect();
        // bench press loads tired triceps at 0.25
        assert!(!alt.contains(&"bench-press"));
        assert!(alt.contains(&"dumbbell-fly"));
        assert!(alt.len() <= 3);
    }

    #[test]
    fn test_no_warnings_when_fresh() {
        let config = TuningConfig::default();
        let found = warnings(&MuscleGroup::ALL, &create_ready_states(), &SorenessMap::default(), now(), &config);
        assert!(found.is_empty());
    }

    #[test]
    fn test_suggested_focus_prefers_fresh_groups() {
        let config = TuningConfig::default();
        let mut states = SectionStates::from_fn(|_| create_state(80.0, 30.0));
        for &s in MuscleGroup::Legs.sections() {
            states[s] = SectionState::default();
        }
        for &s in MuscleGroup::Triceps.sections() {
            states[s] = create_state(10.0, 2.0);
        }
        let focus = suggested_focus(&states, &SorenessMap::default(), now(), &config);
        assert_eq!(focus.len(), 3);
        assert_eq!(focus[0], MuscleGroup::Legs);
        assert_eq!(focus[1], MuscleGroup::Triceps);
    }

    #[test]
    fn test_focus_scores_per_section() {
        let config = TuningConfig::default();
        let states = SectionStates::default();
        let scores = focus_scores(&states, &SorenessMap::default(), now(), &config);
        // fresh: PRIMED (+3) and undertrained (+2) for every section
        let legs = scores.iter().find(|(g, _)| *g == MuscleGroup::Legs).unwrap();
        assert_eq!(legs.1, 20);
    }
}

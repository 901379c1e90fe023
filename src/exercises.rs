//! Exercise catalog - static table of lifts and the sections they load

use serde::{Deserialize, Serialize};

use crate::taxonomy::{MuscleGroup, MuscleSection};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle_group: MuscleGroup,
    /// Contribution weight (0-1) per targeted section; need not sum to 1
    pub contributions: &'static [(MuscleSection, f32)],
    pub equipment: &'static [&'static str],
    pub difficulty: Difficulty,
    pub form_tip: &'static str,
}

impl Exercise {
    /// Contribution weight for a section, 0 when the exercise does not target it
    pub fn contribution(&self, section: MuscleSection) -> f32 {
        self.contributions
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn targets(&self, section: MuscleSection) -> bool {
        self.contribution(section) > 0.0
    }

    pub fn target_sections(&self) -> Vec<MuscleSection> {
        self.contributions
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(s, _)| *s)
            .collect()
    }
}

use MuscleSection as S;

pub const EXERCISES: &[Exercise] = &[
    // Chest
    Exercise {
        id: "bench-press",
        name: "Bench Press",
        muscle_group: MuscleGroup::Chest,
        contributions: &[(S::MidChest, 0.6), (S::Triceps, 0.25), (S::FrontDelt, 0.15)],
        equipment: &["barbell", "bench"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Keep shoulder blades pinched and feet flat on the floor.",
    },
    Exercise {
        id: "incline-press",
        name: "Incline Press",
        muscle_group: MuscleGroup::Chest,
        contributions: &[(S::UpperChest, 0.55), (S::FrontDelt, 0.25), (S::Triceps, 0.2)],
        equipment: &["barbell", "incline bench"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Set the bench to 30-45 degrees for the upper chest.",
    },
    Exercise {
        id: "dumbbell-fly",
        name: "Dumbbell Fly",
        muscle_group: MuscleGroup::Chest,
        contributions: &[(S::MidChest, 0.7), (S::UpperChest, 0.2), (S::LowerChest, 0.1)],
        equipment: &["dumbbells", "bench"],
        difficulty: Difficulty::Beginner,
        form_tip: "Keep a slight bend in the elbows throughout the movement.",
    },
    Exercise {
        id: "cable-crossover",
        name: "Cable Crossover",
        muscle_group: MuscleGroup::Chest,
        contributions: &[(S::LowerChest, 0.5), (S::MidChest, 0.35), (S::FrontDelt, 0.15)],
        equipment: &["cable machine"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Squeeze at the bottom and control the negative.",
    },
    // Back
    Exercise {
        id: "lat-pulldown",
        name: "Lat Pulldown",
        muscle_group: MuscleGroup::Back,
        contributions: &[(S::Lats, 0.7), (S::Biceps, 0.2), (S::Forearms, 0.1)],
        equipment: &["cable machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Lead with the elbows and squeeze the lats at the bottom.",
    },
    Exercise {
        id: "barbell-row",
        name: "Barbell Row",
        muscle_group: MuscleGroup::Back,
        contributions: &[(S::UpperBack, 0.55), (S::Lats, 0.25), (S::Biceps, 0.2)],
        equipment: &["barbell"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Keep the back flat and pull to the lower chest.",
    },
    Exercise {
        id: "face-pull",
        name: "Face Pull",
        muscle_group: MuscleGroup::Back,
        contributions: &[(S::RearDelt, 0.5), (S::LowerTraps, 0.3), (S::UpperBack, 0.2)],
        equipment: &["cable machine", "rope attachment"],
        difficulty: Difficulty::Beginner,
        form_tip: "Pull to face level and finish with external rotation.",
    },
    Exercise {
        id: "seated-row",
        name: "Seated Cable Row",
        muscle_group: MuscleGroup::Back,
        contributions: &[
            (S::UpperBack, 0.45),
            (S::Lats, 0.35),
            (S::Biceps, 0.15),
            (S::Forearms, 0.05),
        ],
        equipment: &["cable machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Keep the chest up and squeeze the shoulder blades together.",
    },
    Exercise {
        id: "deadlift",
        name: "Deadlift",
        muscle_group: MuscleGroup::Back,
        contributions: &[
            (S::Erectors, 0.35),
            (S::Glutes, 0.25),
            (S::Hamstrings, 0.25),
            (S::Lats, 0.15),
        ],
        equipment: &["barbell"],
        difficulty: Difficulty::Advanced,
        form_tip: "Brace the core and keep the bar close to the body.",
    },
    // Shoulders
    Exercise {
        id: "overhead-press",
        name: "Overhead Press",
        muscle_group: MuscleGroup::Shoulders,
        contributions: &[(S::FrontDelt, 0.55), (S::LateralDelt, 0.25), (S::Triceps, 0.2)],
        equipment: &["barbell"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Squeeze the glutes and brace the core for stability.",
    },
    Exercise {
        id: "lateral-raise",
        name: "Lateral Raise",
        muscle_group: MuscleGroup::Shoulders,
        contributions: &[(S::LateralDelt, 0.85), (S::RearDelt, 0.15)],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        form_tip: "Lead with the elbows, not the wrists.",
    },
    Exercise {
        id: "rear-delt-fly",
        name: "Rear Delt Fly",
        muscle_group: MuscleGroup::Shoulders,
        contributions: &[(S::RearDelt, 0.8), (S::UpperBack, 0.2)],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        form_tip: "Squeeze the rear delts at the top.",
    },
    // Legs
    Exercise {
        id: "squat",
        name: "Squat",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Quads, 0.5), (S::Glutes, 0.35), (S::Hamstrings, 0.15)],
        equipment: &["barbell", "squat rack"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Keep the chest up and push the knees out over the toes.",
    },
    Exercise {
        id: "rdl",
        name: "Romanian Deadlift",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Hamstrings, 0.55), (S::Glutes, 0.25), (S::Erectors, 0.2)],
        equipment: &["barbell"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Hinge at the hips and feel the stretch in the hamstrings.",
    },
    Exercise {
        id: "leg-press",
        name: "Leg Press",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Quads, 0.6), (S::Glutes, 0.25), (S::Hamstrings, 0.15)],
        equipment: &["leg press machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Don't lock out the knees at the top.",
    },
    Exercise {
        id: "leg-curl",
        name: "Leg Curl",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Hamstrings, 0.9), (S::Calves, 0.1)],
        equipment: &["leg curl machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Control the weight on the way down.",
    },
    Exercise {
        id: "calf-raise",
        name: "Calf Raise",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Calves, 1.0)],
        equipment: &["calf raise machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Pause at the top for a full contraction.",
    },
    Exercise {
        id: "hip-thrust",
        name: "Hip Thrust",
        muscle_group: MuscleGroup::Legs,
        contributions: &[(S::Glutes, 0.75), (S::Hamstrings, 0.25)],
        equipment: &["barbell", "bench"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Squeeze the glutes hard at the top and control the descent.",
    },
    // Biceps
    Exercise {
        id: "bicep-curl",
        name: "Bicep Curl",
        muscle_group: MuscleGroup::Biceps,
        contributions: &[(S::Biceps, 0.85), (S::Forearms, 0.15)],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        form_tip: "Keep the elbows pinned to the sides.",
    },
    Exercise {
        id: "hammer-curl",
        name: "Hammer Curl",
        muscle_group: MuscleGroup::Biceps,
        contributions: &[(S::Biceps, 0.6), (S::Forearms, 0.4)],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        form_tip: "A neutral grip brings in the brachialis and forearms.",
    },
    Exercise {
        id: "preacher-curl",
        name: "Preacher Curl",
        muscle_group: MuscleGroup::Biceps,
        contributions: &[(S::Biceps, 0.9), (S::Forearms, 0.1)],
        equipment: &["ez-bar", "preacher bench"],
        difficulty: Difficulty::Beginner,
        form_tip: "Control the negative for a full biceps stretch.",
    },
    // Triceps
    Exercise {
        id: "tricep-pushdown",
        name: "Tricep Pushdown",
        muscle_group: MuscleGroup::Triceps,
        contributions: &[(S::Triceps, 0.9), (S::Forearms, 0.1)],
        equipment: &["cable machine"],
        difficulty: Difficulty::Beginner,
        form_tip: "Keep the elbows tight and squeeze at the bottom.",
    },
    Exercise {
        id: "skull-crusher",
        name: "Skull Crusher",
        muscle_group: MuscleGroup::Triceps,
        contributions: &[(S::Triceps, 0.95), (S::Forearms, 0.05)],
        equipment: &["barbell", "bench"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Lower the bar to the forehead under control.",
    },
    Exercise {
        id: "tricep-dip",
        name: "Tricep Dip",
        muscle_group: MuscleGroup::Triceps,
        contributions: &[(S::Triceps, 0.7), (S::FrontDelt, 0.15), (S::MidChest, 0.15)],
        equipment: &["dip bars"],
        difficulty: Difficulty::Intermediate,
        form_tip: "Keep the elbows close to the body.",
    },
    // Forearms
    Exercise {
        id: "wrist-curl",
        name: "Wrist Curl",
        muscle_group: MuscleGroup::Forearms,
        contributions: &[(S::Forearms, 1.0)],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        form_tip: "Rest the forearms on the thighs and curl through full range.",
    },
    Exercise {
        id: "reverse-curl",
        name: "Reverse Curl",
        muscle_group: MuscleGroup::Forearms,
        contributions: &[(S::Forearms, 0.7), (S::Biceps, 0.3)],
        equipment: &["barbell"],
        difficulty: Difficulty::Beginner,
        form_tip: "An overhand grip emphasizes the forearm extensors.",
    },
];

pub fn get_all_exercises() -> &'static [Exercise] {
    EXERCISES
}

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.id == id)
}

/// Find exercise by display name (case-insensitive, for CLI input)
pub fn find_exercise_by_name(name: &str) -> Option<&'static Exercise> {
    EXERCISES
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
}

pub fn exercises_by_group(group: MuscleGroup) -> impl Iterator<Item = &'static Exercise> {
    EXERCISES.iter().filter(move |e| e.muscle_group == group)
}

pub fn exercises_by_section(section: MuscleSection) -> impl Iterator<Item = &'static Exercise> {
    EXERCISES.iter().filter(move |e| e.targets(section))
}

/// Contribution of an exercise id to a section; unknown ids contribute nothing
pub fn contribution_weight(exercise_id: &str, section: MuscleSection) -> f32 {
    find_exercise(exercise_id)
        .map(|e| e.contribution(section))
        .unwrap_or(0.0)
}

//! Muscle taxonomy - groups and the sections they are split into
//!
//! Sections are the unit of all fatigue/stimulus bookkeeping. Groups are
//! only used for focus selection and aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Coarse body regions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Shoulders,
    Back,
    Chest,
    Legs,
    Biceps,
    Triceps,
    Forearms,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 7] = [
        MuscleGroup::Shoulders,
        MuscleGroup::Back,
        MuscleGroup::Chest,
        MuscleGroup::Legs,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Forearms,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Back => "Back",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Forearms => "Forearms",
        }
    }

    /// Sections belonging to this group, in taxonomy order
    pub fn sections(&self) -> &'static [MuscleSection] {
        use MuscleSection::*;
        match self {
            MuscleGroup::Shoulders => &[FrontDelt, LateralDelt, RearDelt],
            MuscleGroup::Back => &[Lats, UpperBack, LowerTraps, Erectors],
            MuscleGroup::Chest => &[UpperChest, MidChest, LowerChest],
            MuscleGroup::Legs => &[Quads, Hamstrings, Glutes, Calves],
            MuscleGroup::Biceps => &[Biceps],
            MuscleGroup::Triceps => &[Triceps],
            MuscleGroup::Forearms => &[Forearms],
        }
    }

    /// Parse the lowercase id used on the command line and in stored data
    pub fn from_id(id: &str) -> Option<MuscleGroup> {
        MuscleGroup::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fine muscle subdivisions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum MuscleSection {
    FrontDelt,
    LateralDelt,
    RearDelt,
    Lats,
    UpperBack,
    LowerTraps,
    Erectors,
    UpperChest,
    MidChest,
    LowerChest,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Biceps,
    Triceps,
    Forearms,
}

impl MuscleSection {
    pub const COUNT: usize = 17;

    /// All sections, ordered so that `ALL[s.index()] == s`
    pub const ALL: [MuscleSection; MuscleSection::COUNT] = [
        MuscleSection::FrontDelt,
        MuscleSection::LateralDelt,
        MuscleSection::RearDelt,
        MuscleSection::Lats,
        MuscleSection::UpperBack,
        MuscleSection::LowerTraps,
        MuscleSection::Erectors,
        MuscleSection::UpperChest,
        MuscleSection::MidChest,
        MuscleSection::LowerChest,
        MuscleSection::Quads,
        MuscleSection::Hamstrings,
        MuscleSection::Glutes,
        MuscleSection::Calves,
        MuscleSection::Biceps,
        MuscleSection::Triceps,
        MuscleSection::Forearms,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn group(&self) -> MuscleGroup {
        use MuscleSection::*;
        match self {
            FrontDelt | LateralDelt | RearDelt => MuscleGroup::Shoulders,
            Lats | UpperBack | LowerTraps | Erectors => MuscleGroup::Back,
            UpperChest | MidChest | LowerChest => MuscleGroup::Chest,
            Quads | Hamstrings | Glutes | Calves => MuscleGroup::Legs,
            Biceps => MuscleGroup::Biceps,
            Triceps => MuscleGroup::Triceps,
            Forearms => MuscleGroup::Forearms,
        }
    }

    pub fn name(&self) -> &'static str {
        use MuscleSection::*;
        match self {
            FrontDelt => "Front Delts",
            LateralDelt => "Lateral Delts",
            RearDelt => "Rear Delts",
            Lats => "Lats",
            UpperBack => "Upper Back",
            LowerTraps => "Lower Traps",
            Erectors => "Erectors",
            UpperChest => "Upper Chest",
            MidChest => "Mid Chest",
            LowerChest => "Lower Chest",
            Quads => "Quads",
            Hamstrings => "Hamstrings",
            Glutes => "Glutes",
            Calves => "Calves",
            Biceps => "Biceps",
            Triceps => "Triceps",
            Forearms => "Forearms",
        }
    }

    /// Stable identifier, same as the serialized form
    pub fn id(&self) -> &'static str {
        use MuscleSection::*;
        match self {
            FrontDelt => "frontDelt",
            LateralDelt => "lateralDelt",
            RearDelt => "rearDelt",
            Lats => "lats",
            UpperBack => "upperBack",
            LowerTraps => "lowerTraps",
            Erectors => "erectors",
            UpperChest => "upperChest",
            MidChest => "midChest",
            LowerChest => "lowerChest",
            Quads => "quads",
            Hamstrings => "hamstrings",
            Glutes => "glutes",
            Calves => "calves",
            Biceps => "biceps",
            Triceps => "triceps",
            Forearms => "forearms",
        }
    }

    /// Parse an identifier (case-insensitive, dashes and spaces ignored)
    pub fn from_id(id: &str) -> Option<MuscleSection> {
        let wanted: String = id
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        MuscleSection::ALL
            .iter()
            .copied()
            .find(|s| s.id().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for MuscleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size map with one slot per [`MuscleSection`]
///
/// Serializes as a section-keyed object; sections missing on input are
/// filled with `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionMap<T> {
    slots: [T; MuscleSection::COUNT],
}

impl<T> SectionMap<T> {
    pub fn from_fn(mut f: impl FnMut(MuscleSection) -> T) -> Self {
        Self {
            slots: std::array::from_fn(|i| f(MuscleSection::ALL[i])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MuscleSection, &T)> {
        MuscleSection::ALL.iter().copied().zip(self.slots.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(MuscleSection, &T) -> U) -> SectionMap<U> {
        SectionMap::from_fn(|s| f(s, &self.slots[s.index()]))
    }
}

impl<T: Default> Default for SectionMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<MuscleSection> for SectionMap<T> {
    type Output = T;

    fn index(&self, section: MuscleSection) -> &T {
        &self.slots[section.index()]
    }
}

impl<T> IndexMut<MuscleSection> for SectionMap<T> {
    fn index_mut(&mut self, section: MuscleSection) -> &mut T {
        &mut self.slots[section.index()]
    }
}

impl<T: Serialize> Serialize for SectionMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MuscleSection::COUNT))?;
        for (section, value) in self.iter() {
            map.serialize_entry(&section, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for SectionMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = BTreeMap::<MuscleSection, T>::deserialize(deserializer)?;
        Ok(SectionMap::from_fn(|s| entries.remove(&s).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sections_indexed_in_order() {
        for (i, section) in MuscleSection::ALL.iter().enumerate() {
            assert_eq!(section.index(), i);
        }
    }

    #[test]
    fn test_every_section_belongs_to_its_group() {
        for group in MuscleGroup::ALL {
            for section in group.sections() {
                assert_eq!(section.group(), group);
            }
        }
        let total: usize = MuscleGroup::ALL.iter().map(|g| g.sections().len()).sum();
        assert_eq!(total, MuscleSection::COUNT);
    }

    #[test]
    fn test_group_from_id() {
        assert_eq!(MuscleGroup::from_id("chest"), Some(MuscleGroup::Chest));
        assert_eq!(MuscleGroup::from_id(" Legs "), Some(MuscleGroup::Legs));
        assert_eq!(MuscleGroup::from_id("neck"), None);
    }

    #[test]
    fn test_section_serde_names() {
        let json = serde_json::to_string(&MuscleSection::UpperChest).unwrap();
        assert_eq!(json, "\"upperChest\"");
        let group: MuscleGroup = serde_json::from_str("\"forearms\"").unwrap();
        assert_eq!(group, MuscleGroup::Forearms);
    }

    #[test]
    fn test_section_ids_match_serde() {
        for section in MuscleSection::ALL {
            let json = serde_json::to_string(&section).unwrap();
            assert_eq!(json, format!("\"{}\"", section.id()));
        }
        assert_eq!(MuscleSection::from_id("mid-chest"), Some(MuscleSection::MidChest));
        assert_eq!(MuscleSection::from_id("UPPERBACK"), Some(MuscleSection::UpperBack));
        assert_eq!(MuscleSection::from_id("neck"), None);
    }

    #[test]
    fn test_section_map_index_and_iter() {
        let mut map: SectionMap<f32> = SectionMap::default();
        map[MuscleSection::MidChest] = 4.5;
        assert_eq!(map[MuscleSection::MidChest], 4.5);
        assert_eq!(map.iter().filter(|(_, v)| **v > 0.0).count(), 1);
    }

    #[test]
    fn test_section_map_fills_missing_on_deserialize() {
        let map: SectionMap<f32> = serde_json::from_str(r#"{"lats": 12.0}"#).unwrap();
        assert_eq!(map[MuscleSection::Lats], 12.0);
        assert_eq!(map[MuscleSection::Quads], 0.0);

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"lats\":12.0"));
        assert!(json.contains("\"forearms\":0.0"));
    }
}

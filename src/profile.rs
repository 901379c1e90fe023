//! User profile and settings consumed by the engines

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

const KG_TO_LB: f32 = 2.20462;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn from_kg(&self, kg: f32) -> f32 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => kg * KG_TO_LB,
        }
    }

    pub fn to_kg(&self, value: f32) -> f32 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value / KG_TO_LB,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Multiplier on every fatigue gain, 1.0 = average responder
    pub fatigue_sensitivity: f32,
    pub days_per_week: u8,
    pub session_length_min: u32,
    pub time_preference: TimePreference,
    pub weight_unit: WeightUnit,
    /// Offset of the user's local clock from UTC, for day and hour rules
    pub utc_offset_minutes: i32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            fatigue_sensitivity: 1.0,
            days_per_week: 4,
            session_length_min: 60,
            time_preference: TimePreference::Afternoon,
            weight_unit: WeightUnit::Kg,
            utc_offset_minutes: 0,
        }
    }
}

impl UserProfile {
    pub fn local_tz(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.local_tz()).date_naive()
    }

    pub fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.local_tz()).hour()
    }

    /// Sensitivity clamped to something usable; bad values fall back to 1.0
    pub fn sensitivity(&self) -> f32 {
        if self.fatigue_sensitivity.is_finite() && self.fatigue_sensitivity > 0.0 {
            self.fatigue_sensitivity
        } else {
            1.0
        }
    }
}

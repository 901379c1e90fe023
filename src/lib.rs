//! fatiguefit - per-muscle fatigue, stimulus and readiness tracking
//!
//! The session log is the only source of truth. Every other value
//! (section fatigue, weekly stimulus, readiness, coach banner, plan) is
//! derived from it by the pure functions in [`engine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod exercises;
pub mod profile;
pub mod session;
pub mod store;
pub mod taxonomy;

pub use config::TuningConfig;
pub use engine::{DerivedState, MuscleTracker, Readiness, SectionState, recompute};
pub use error::{FatigueFitError, Result};
pub use profile::UserProfile;
pub use session::{LoggedSet, SorenessMap, WorkoutSession};
pub use store::{JsonStore, MemoryStore, Persistence};
pub use taxonomy::{MuscleGroup, MuscleSection, SectionMap};

//! Storage collaborators - the engines never touch I/O themselves
//!
//! `JsonStore` keeps everything in one JSON document, which is what the CLI
//! host uses. `MemoryStore` is the same contract without a file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::MuscleTracker;
use crate::error::StoreError;
use crate::profile::UserProfile;
use crate::session::{SorenessMap, WorkoutSession};

/// Load/save contract the host wires the core to
pub trait Persistence {
    fn load_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError>;
    fn load_current_session(&self) -> Result<Option<WorkoutSession>, StoreError>;
    /// Cached section snapshot; `None` means rebuild from the session log
    fn load_section_states(&self) -> Result<Option<MuscleTracker>, StoreError>;
    fn load_profile(&self) -> Result<UserProfile, StoreError>;
    fn load_soreness(&self) -> Result<SorenessMap, StoreError>;

    fn save_sessions(&mut self, sessions: &[WorkoutSession]) -> Result<(), StoreError>;
    fn save_current_session(&mut self, session: Option<&WorkoutSession>) -> Result<(), StoreError>;
    fn save_section_states(&mut self, tracker: &MuscleTracker) -> Result<(), StoreError>;
    fn save_profile(&mut self, profile: &UserProfile) -> Result<(), StoreError>;
    fn save_soreness(&mut self, soreness: &SorenessMap) -> Result<(), StoreError>;
}

/// Everything the app persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub sessions: Vec<WorkoutSession>,
    pub current_session: Option<WorkoutSession>,
    pub section_states: Option<MuscleTracker>,
    pub profile: UserProfile,
    pub soreness: SorenessMap,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

impl Persistence for MemoryStore {
    fn load_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError> {
        Ok(self.data.sessions.clone())
    }

    fn load_current_session(&self) -> Result<Option<WorkoutSession>, StoreError> {
        Ok(self.data.current_session.clone())
    }

    fn load_section_states(&self) -> Result<Option<MuscleTracker>, StoreError> {
        Ok(self.data.section_states.clone())
    }

    fn load_profile(&self) -> Result<UserProfile, StoreError> {
        Ok(self.data.profile.clone())
    }

    fn load_soreness(&self) -> Result<SorenessMap, StoreError> {
        Ok(self.data.soreness)
    }

    fn save_sessions(&mut self, sessions: &[WorkoutSession]) -> Result<(), StoreError> {
        self.data.sessions = sessions.to_vec();
        Ok(())
    }

    fn save_current_session(&mut self, session: Option<&WorkoutSession>) -> Result<(), StoreError> {
        self.data.current_session = session.cloned();
        Ok(())
    }

    fn save_section_states(&mut self, tracker: &MuscleTracker) -> Result<(), StoreError> {
        self.data.section_states = Some(tracker.clone());
        Ok(())
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<(), StoreError> {
        self.data.profile = profile.clone();
        Ok(())
    }

    fn save_soreness(&mut self, soreness: &SorenessMap) -> Result<(), StoreError> {
        self.data.soreness = *soreness;
        Ok(())
    }
}

/// Single JSON file store; every save rewrites the file
pub struct JsonStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonStore {
    /// Open or create store; a missing file is an empty history
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            info!(path = %path.display(), "no store file yet, starting empty");
            StoreData::default()
        };
        debug!(sessions = data.sessions.len(), "store loaded");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.data).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Persistence for JsonStore {
    fn load_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError> {
        Ok(self.data.sessions.clone())
    }

    fn load_current_session(&self) -> Result<Option<WorkoutSession>, StoreError> {
        Ok(self.data.current_session.clone())
    }

    fn load_section_states(&self) -> Result<Option<MuscleTracker>, StoreError> {
        Ok(self.data.section_states.clone())
    }

    fn load_profile(&self) -> Result<UserProfile, StoreError> {
        Ok(self.data.profile.clone())
    }

    fn load_soreness(&self) -> Result<SorenessMap, StoreError> {
        Ok(self.data.soreness)
    }

    fn save_sessions(&mut self, sessions: &[WorkoutSession]) -> Result<(), StoreError> {
        self.data.sessions = sessions.to_vec();
        self.flush()
    }

    fn save_current_session(&mut self, session: Option<&WorkoutSession>) -> Result<(), StoreError> {
        self.data.current_session = session.cloned();
        self.flush()
    }

    fn save_section_states(&mut self, tracker: &MuscleTracker) -> Result<(), StoreError> {
        self.data.section_states = Some(tracker.clone());
        self.flush()
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<(), StoreError> {
        self.data.profile = profile.clone();
        self.flush()
    }

    fn save_soreness(&mut self, soreness: &SorenessMap) -> Result<(), StoreError> {
        self.data.soreness = *soreness;
        self.flush()
    }
}

/// Signed-in user, only consulted to decide on remote sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: Option<String>,
}

/// Remote sync runs only for a signed-in user; local-only mode otherwise
pub fn sync_enabled(identity: Option<&Identity>) -> bool {
    identity.is_some_and(|i| !i.user_id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::MuscleSection;
    use chrono::{Duration, TimeZone, Utc};

    fn create_session() -> WorkoutSession {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();
        let mut session = WorkoutSession::start(vec![], None, start);
        let entry = session.add_exercise("squat").unwrap();
        session.log_set(entry, 100.0, 5, 8.0, start + Duration::minutes(5));
        session.end(start + Duration::hours(1));
        session
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load_sessions().unwrap().is_empty());
        assert!(store.load_section_states().unwrap().is_none());

        let session = create_session();
        store.save_sessions(std::slice::from_ref(&session)).unwrap();
        store.save_current_session(None).unwrap();
        assert_eq!(store.load_sessions().unwrap(), vec![session]);
        assert!(store.load_current_session().unwrap().is_none());
    }

    #[test]
    fn test_json_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fatiguefit.json");

        let session = create_session();
        let mut soreness = SorenessMap::default();
        soreness[MuscleSection::Glutes] = 2;
        let tracker = MuscleTracker::new(session.started_at);
        {
            let mut store = JsonStore::open(&path).unwrap();
            store.save_sessions(std::slice::from_ref(&session)).unwrap();
            store.save_soreness(&soreness).unwrap();
            store.save_section_states(&tracker).unwrap();
        }

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.load_sessions().unwrap(), vec![session]);
        assert_eq!(store.load_soreness().unwrap()[MuscleSection::Glutes], 2);
        assert_eq!(store.load_section_states().unwrap(), Some(tracker));
        assert_eq!(store.load_profile().unwrap(), UserProfile::default());
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStore::open(&path), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_sync_requires_identity() {
        assert!(!sync_enabled(None));
        let blank = Identity {
            user_id: "  ".to_string(),
            display_name: None,
        };
        assert!(!sync_enabled(Some(&blank)));
        let user = Identity {
            user_id: "u-42".to_string(),
            display_name: Some("Alex".to_string()),
        };
        assert!(sync_enabled(Some(&user)));
    }
}

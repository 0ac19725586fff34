use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::constants::{
    secs_to_ms, DEFAULT_FAKE_COUNT, DEFAULT_FEEDBACK_DISPLAY_SECS, DEFAULT_MAX_CHANCES,
    DEFAULT_MIN_DISTANCE, DEFAULT_POOL_SIZE_PER_ARCHETYPE, DEFAULT_SPAWN_WEIGHT,
    DEFAULT_TOTAL_TIME_SECS, DEFAULT_TOTAL_TO_SPAWN, DEFAULT_WIN_GRACE_DELAY_SECS,
    MAX_SPAWN_WEIGHT,
};
use crate::types::{ArchetypeId, ContainerId, RoomId, SetupWarning, SlotId, Vec3};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArchetypeSelection {
    #[default]
    Weighted,
    Uniform,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RealPickPolicy {
    #[default]
    WrongGuess,
    Collect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub total_to_spawn: usize,
    pub fake_count: usize,
    pub min_distance: f32,
    pub prevent_overlap: bool,
    pub chance_to_use_container: f32,
    pub pool_size_per_archetype: usize,
    /// Seconds.
    pub total_time: f32,
    pub max_chances: u32,
    /// Seconds.
    pub win_grace_delay: f32,
    /// Seconds.
    pub feedback_display_duration: f32,
    pub archetype_selection: ArchetypeSelection,
    pub real_pick_policy: RealPickPolicy,
    pub starting_keys: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_to_spawn: DEFAULT_TOTAL_TO_SPAWN,
            fake_count: DEFAULT_FAKE_COUNT,
            min_distance: DEFAULT_MIN_DISTANCE,
            prevent_overlap: true,
            chance_to_use_container: 0.0,
            pool_size_per_archetype: DEFAULT_POOL_SIZE_PER_ARCHETYPE,
            total_time: DEFAULT_TOTAL_TIME_SECS,
            max_chances: DEFAULT_MAX_CHANCES,
            win_grace_delay: DEFAULT_WIN_GRACE_DELAY_SECS,
            feedback_display_duration: DEFAULT_FEEDBACK_DISPLAY_SECS,
            archetype_selection: ArchetypeSelection::Weighted,
            real_pick_policy: RealPickPolicy::WrongGuess,
            starting_keys: 0,
        }
    }
}

impl SessionConfig {
    pub fn total_time_ms(&self) -> u64 {
        secs_to_ms(self.total_time)
    }

    pub fn win_grace_delay_ms(&self) -> u64 {
        secs_to_ms(self.win_grace_delay)
    }

    pub fn feedback_display_ms(&self) -> u64 {
        secs_to_ms(self.feedback_display_duration)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConfig {
    pub position: Vec3,
    #[serde(default)]
    pub orientation: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeConfig {
    pub name: String,
    #[serde(default)]
    pub max_instances: Option<usize>,
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: u32,
    #[serde(default)]
    pub eligible_slots: Option<Vec<SlotId>>,
}

fn default_spawn_weight() -> u32 {
    DEFAULT_SPAWN_WEIGHT
}

impl ArchetypeConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_instances: None,
            spawn_weight: DEFAULT_SPAWN_WEIGHT,
            eligible_slots: None,
        }
    }

    pub fn accepts(&self, slot: SlotId) -> bool {
        match &self.eligible_slots {
            None => true,
            Some(slots) => slots.contains(&slot),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    pub position: Vec3,
    #[serde(default)]
    pub orientation: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InteractableConfig {
    #[serde(rename_all = "camelCase")]
    Door {
        #[serde(default)]
        room: Option<RoomId>,
        #[serde(default)]
        starts_timer: bool,
        #[serde(default)]
        locked: bool,
        #[serde(default)]
        watched_slots: Vec<SlotId>,
        #[serde(default)]
        disable_if_all_filled: bool,
    },
    #[serde(rename_all = "camelCase")]
    Drawer {
        #[serde(default)]
        watched_slots: Vec<SlotId>,
        #[serde(default)]
        disable_if_all_filled: bool,
    },
    #[serde(rename_all = "camelCase")]
    Container { container: ContainerId },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelConfig {
    pub session: SessionConfig,
    pub slots: Vec<SlotConfig>,
    pub archetypes: Vec<ArchetypeConfig>,
    pub containers: Vec<ContainerConfig>,
    pub interactables: Vec<InteractableConfig>,
}

impl LevelConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Clamps inconsistent values in place and reports what was changed.
    pub fn validate(&mut self) -> Vec<SetupWarning> {
        let mut warnings = Vec::new();

        if self.slots.is_empty() {
            warnings.push(SetupWarning::NoSlots);
        }
        if self.archetypes.is_empty() {
            warnings.push(SetupWarning::NoArchetypes);
        }

        let session = &mut self.session;
        if session.fake_count > session.total_to_spawn {
            warnings.push(SetupWarning::FakeCountClamped {
                requested: session.fake_count,
                limit: session.total_to_spawn,
            });
            session.fake_count = session.total_to_spawn;
        }
        let chance = session.chance_to_use_container;
        let clamped = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
        if clamped != chance || chance.is_nan() {
            warnings.push(SetupWarning::ContainerChanceClamped {
                requested: chance,
                clamped,
            });
            session.chance_to_use_container = clamped;
        }
        if !session.min_distance.is_finite() || session.min_distance < 0.0 {
            session.min_distance = 0.0;
        }

        let slot_count = self.slots.len();
        for (idx, archetype) in self.archetypes.iter_mut().enumerate() {
            archetype.spawn_weight = archetype.spawn_weight.min(MAX_SPAWN_WEIGHT);
            if let Some(eligible) = archetype.eligible_slots.as_mut() {
                eligible.retain(|slot| {
                    let known = slot.0 < slot_count;
                    if !known {
                        warnings.push(SetupWarning::UnknownSlotReference {
                            archetype: ArchetypeId(idx),
                            slot: *slot,
                        });
                    }
                    known
                });
            }
        }
        if !self.archetypes.is_empty() && self.archetypes.iter().all(|a| a.spawn_weight == 0) {
            warnings.push(SetupWarning::ZeroWeightArchetypes);
        }

        for warning in &warnings {
            warn!(%warning, "level configuration adjusted");
        }
        warnings
    }

    pub fn pool_size_for(&self, archetype: ArchetypeId) -> usize {
        self.archetypes
            .get(archetype.0)
            .and_then(|a| a.max_instances)
            .unwrap_or(self.session.pool_size_per_archetype)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn level_json() -> &'static str {
        r#"{
            "session": { "totalToSpawn": 4, "fakeCount": 2, "totalTime": 90, "realPickPolicy": "collect" },
            "slots": [
                { "position": { "x": 0, "y": 0, "z": 0 } },
                { "position": { "x": 5, "y": 0, "z": 0 } }
            ],
            "archetypes": [
                { "name": "vase", "spawnWeight": 80, "eligibleSlots": [0, 7] },
                { "name": "lamp" }
            ],
            "interactables": [
                { "kind": "door", "room": "kitchen", "startsTimer": true }
            ]
        }"#
    }

    #[test]
    fn loads_level_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(level_json().as_bytes()).expect("write level");

        let level = LevelConfig::from_path(file.path()).expect("level should parse");
        assert_eq!(level.session.total_to_spawn, 4);
        assert_eq!(level.session.max_chances, DEFAULT_MAX_CHANCES);
        assert_eq!(level.session.total_time_ms(), 90_000);
        assert_eq!(level.session.real_pick_policy, RealPickPolicy::Collect);
        assert_eq!(level.archetypes[1].spawn_weight, DEFAULT_SPAWN_WEIGHT);
        assert!(matches!(
            &level.interactables[0],
            InteractableConfig::Door { starts_timer: true, room: Some(room), .. } if room.0 == "kitchen"
        ));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = LevelConfig::from_path(&dir.path().join("missing.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ \"slots\": [ 1, 2").expect("write level");
        let err = LevelConfig::from_path(file.path()).expect_err("bad json must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_clamps_and_reports() {
        let mut level: LevelConfig = serde_json::from_str(level_json()).expect("parse");
        level.session.fake_count = 9;
        level.session.chance_to_use_container = 1.5;

        let warnings = level.validate();
        assert_eq!(level.session.fake_count, 4);
        assert_eq!(level.session.chance_to_use_container, 1.0);
        assert_eq!(level.archetypes[0].eligible_slots, Some(vec![SlotId(0)]));
        assert!(warnings.contains(&SetupWarning::FakeCountClamped {
            requested: 9,
            limit: 4
        }));
        assert!(warnings.contains(&SetupWarning::UnknownSlotReference {
            archetype: ArchetypeId(0),
            slot: SlotId(7)
        }));
    }

    #[test]
    fn empty_level_warns_without_failing() {
        let mut level = LevelConfig::default();
        let warnings = level.validate();
        assert!(warnings.contains(&SetupWarning::NoSlots));
        assert!(warnings.contains(&SetupWarning::NoArchetypes));
    }

    #[test]
    fn pool_size_prefers_archetype_override() {
        let mut level = LevelConfig::default();
        level.archetypes.push(ArchetypeConfig::named("a"));
        level.archetypes.push(ArchetypeConfig {
            max_instances: Some(7),
            ..ArchetypeConfig::named("b")
        });
        assert_eq!(
            level.pool_size_for(ArchetypeId(0)),
            DEFAULT_POOL_SIZE_PER_ARCHETYPE
        );
        assert_eq!(level.pool_size_for(ArchetypeId(1)), 7);
    }
}

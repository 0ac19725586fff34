use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractableId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Idle,
    Playing,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    AllCollected,
    AllFakesFound,
    OutOfChances,
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemLocation {
    Slot(SlotId),
    Container(ContainerId),
}

#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SetupWarning {
    #[error("level has no placement slots")]
    NoSlots,
    #[error("level has no item archetypes")]
    NoArchetypes,
    #[error("every archetype has zero spawn weight")]
    ZeroWeightArchetypes,
    #[error("fake count {requested} exceeds {limit}, clamped")]
    FakeCountClamped { requested: usize, limit: usize },
    #[error("container chance {requested} outside 0..=1, clamped to {clamped}")]
    ContainerChanceClamped { requested: f32, clamped: f32 },
    #[error("archetype {archetype:?} references unknown slot {slot:?}")]
    UnknownSlotReference { archetype: ArchetypeId, slot: SlotId },
    #[error("instance pool for archetype {archetype:?} is exhausted")]
    PoolExhausted { archetype: ArchetypeId },
    #[error("placed {placed} of {requested} requested items")]
    PlacementShortfall { requested: usize, placed: usize },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    ItemPlaced {
        #[serde(rename = "itemId")]
        item_id: ItemId,
        location: ItemLocation,
    },
    ContainerFilled {
        #[serde(rename = "containerId")]
        container_id: ContainerId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
    ContainerUnlocked {
        #[serde(rename = "containerId")]
        container_id: ContainerId,
        #[serde(rename = "itemId")]
        item_id: Option<ItemId>,
    },
    InteractionDisabled {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
    },
    CollectedReal {
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
    CollectedFake {
        #[serde(rename = "itemId")]
        item_id: ItemId,
        remaining: usize,
    },
    WrongGuess {
        #[serde(rename = "itemId")]
        item_id: ItemId,
        #[serde(rename = "chancesRemaining")]
        chances_remaining: u32,
    },
    InputFrozen,
    Won {
        reason: GameOverReason,
    },
    Lost {
        reason: GameOverReason,
    },
    TimerStarted,
    TimerWarning,
    TimerTicking,
    TimerExpired,
    DoorOpened {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
    },
    DoorClosed {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
    },
    DoorBlocked {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
    },
    DoorLocked {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
    },
    DoorUnlocked {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
        #[serde(rename = "keysLeft")]
        keys_left: u32,
    },
    DrawerToggled {
        #[serde(rename = "interactableId")]
        interactable_id: InteractableId,
        open: bool,
    },
    RoomActivated {
        room: RoomId,
    },
    RoomCompleted {
        room: RoomId,
    },
    FeedbackShown {
        message: String,
    },
    FeedbackHidden,
    SetupWarning {
        warning: SetupWarning,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub archetype: ArchetypeId,
    pub position: Vec3,
    pub location: ItemLocation,
    pub collected: bool,
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub phase: GamePhase,
    #[serde(rename = "timeLeftMs")]
    pub time_left_ms: u64,
    #[serde(rename = "timerDisplay")]
    pub timer_display: String,
    #[serde(rename = "timerRunning")]
    pub timer_running: bool,
    pub collected: usize,
    #[serde(rename = "totalToCollect")]
    pub total_to_collect: usize,
    #[serde(rename = "fakeCollected")]
    pub fake_collected: usize,
    #[serde(rename = "totalFake")]
    pub total_fake: usize,
    #[serde(rename = "chancesRemaining")]
    pub chances_remaining: u32,
    #[serde(rename = "inputFrozen")]
    pub input_frozen: bool,
    #[serde(rename = "activeRoom")]
    pub active_room: Option<RoomId>,
    pub feedback: Option<String>,
    pub items: Vec<ItemView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub phase: GamePhase,
    pub reason: Option<GameOverReason>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub requested: usize,
    pub placed: usize,
    #[serde(rename = "inContainers")]
    pub in_containers: usize,
    #[serde(rename = "totalFake")]
    pub total_fake: usize,
    pub collected: usize,
    #[serde(rename = "fakeCollected")]
    pub fake_collected: usize,
    #[serde(rename = "wrongGuesses")]
    pub wrong_guesses: u32,
    #[serde(rename = "chancesRemaining")]
    pub chances_remaining: u32,
    pub warnings: Vec<SetupWarning>,
}

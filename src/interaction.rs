use crate::config::InteractableConfig;
use crate::slots::SlotRegistry;
use crate::types::{ContainerId, GameOverReason, InteractableId, ItemId, RoomId, SlotId};

/// Slots an interactable keeps an eye on. When items land there the
/// interactable shuts itself off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotWatch {
    pub slots: Vec<SlotId>,
    pub require_all: bool,
}

impl SlotWatch {
    pub fn fires_on(&self, filled: SlotId, registry: &SlotRegistry) -> bool {
        if !self.slots.contains(&filled) {
            return false;
        }
        if self.require_all {
            self.slots.iter().all(|slot| registry.is_occupied(*slot))
        } else {
            true
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorState {
    pub room: Option<RoomId>,
    pub starts_timer: bool,
    pub locked: bool,
    pub open: bool,
    pub watch: SlotWatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawerState {
    pub open: bool,
    pub watch: SlotWatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractableKind {
    Door(DoorState),
    Drawer(DrawerState),
    Collectible { item: ItemId },
    Container { container: ContainerId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interactable {
    pub id: InteractableId,
    pub enabled: bool,
    pub kind: InteractableKind,
}

impl Interactable {
    pub fn watch(&self) -> Option<&SlotWatch> {
        match &self.kind {
            InteractableKind::Door(door) => Some(&door.watch),
            InteractableKind::Drawer(drawer) => Some(&drawer.watch),
            _ => None,
        }
    }
}

pub fn build_interactables(configs: &[InteractableConfig], items: &[ItemId]) -> Vec<Interactable> {
    let mut out: Vec<Interactable> = configs
        .iter()
        .enumerate()
        .map(|(idx, cfg)| {
            let kind = match cfg {
                InteractableConfig::Door {
                    room,
                    starts_timer,
                    locked,
                    watched_slots,
                    disable_if_all_filled,
                } => InteractableKind::Door(DoorState {
                    room: room.clone(),
                    starts_timer: *starts_timer,
                    locked: *locked,
                    open: false,
                    watch: SlotWatch {
                        slots: watched_slots.clone(),
                        require_all: *disable_if_all_filled,
                    },
                }),
                InteractableConfig::Drawer {
                    watched_slots,
                    disable_if_all_filled,
                } => InteractableKind::Drawer(DrawerState {
                    open: false,
                    watch: SlotWatch {
                        slots: watched_slots.clone(),
                        require_all: *disable_if_all_filled,
                    },
                }),
                InteractableConfig::Container { container } => InteractableKind::Container {
                    container: *container,
                },
            };
            Interactable {
                id: InteractableId(idx),
                enabled: true,
                kind,
            }
        })
        .collect();

    for item in items {
        out.push(Interactable {
            id: InteractableId(out.len()),
            enabled: true,
            kind: InteractableKind::Collectible { item: *item },
        });
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Already collected, hidden, unknown, or the game is not taking input.
    Ignored,
    CollectedFake,
    CollectedReal,
    WrongGuess { chances_remaining: u32 },
    WinPending(GameOverReason),
    Lost(GameOverReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    Ignored,
    Disabled,
    DoorOpened { timer_started: bool },
    DoorClosed,
    DoorBlocked,
    DoorLocked,
    DrawerToggled { open: bool },
    Picked(PickOutcome),
    TaskRequired { container: ContainerId },
}

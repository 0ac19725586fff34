use tracing::debug;

use super::*;
use crate::config::RealPickPolicy;
use crate::interaction::{DoorState, InteractableKind, InteractionOutcome, PickOutcome};
use crate::types::{ContainerId, RoomId};

const ROOM_BLOCKED_MESSAGE: &str = "Cannot open this door until current room is completed";

fn chances_message(chances: u32) -> String {
    if chances == 1 {
        "1 chance left".to_string()
    } else {
        format!("{chances} chances left")
    }
}

impl<V: VisualProvider> GameSession<V> {
    pub fn interact(&mut self, id: InteractableId) -> InteractionOutcome {
        let Some(interactable) = self.interactables.get(id.0) else {
            return InteractionOutcome::Ignored;
        };
        if !interactable.enabled {
            return InteractionOutcome::Disabled;
        }
        match interactable.kind.clone() {
            InteractableKind::Door(door) => self.use_door(id, door),
            InteractableKind::Drawer(_) => self.toggle_drawer(id),
            InteractableKind::Collectible { item } => {
                InteractionOutcome::Picked(self.pick_item(item))
            }
            InteractableKind::Container { container } => {
                match self.containers.get(container) {
                    Some(c) if c.locked && !self.progress.is_ended() => {
                        InteractionOutcome::TaskRequired { container }
                    }
                    _ => InteractionOutcome::Ignored,
                }
            }
        }
    }

    /// Collectible interaction. Fakes count toward the win; real items cost
    /// a chance unless the level collects them.
    pub fn pick_item(&mut self, item_id: ItemId) -> PickOutcome {
        if !self.progress.accepts_input() {
            return PickOutcome::Ignored;
        }
        let Some(item) = self.items.get(item_id.0) else {
            return PickOutcome::Ignored;
        };
        if !item.is_pickable() {
            return PickOutcome::Ignored;
        }

        if item.is_fake {
            return self.collect(item_id, true);
        }
        match self.level.session.real_pick_policy {
            RealPickPolicy::Collect => self.collect(item_id, false),
            RealPickPolicy::WrongGuess => self.wrong_guess(item_id),
        }
    }

    fn collect(&mut self, item_id: ItemId, is_fake: bool) -> PickOutcome {
        let transition = self.progress.on_collect(is_fake);
        if transition == Transition::Ignored {
            return PickOutcome::Ignored;
        }
        self.remove_item(item_id);
        if is_fake {
            self.events.push(RuntimeEvent::CollectedFake {
                item_id,
                remaining: self.progress.fakes_left(),
            });
        } else {
            self.events.push(RuntimeEvent::CollectedReal { item_id });
        }
        self.apply_transition(transition);

        match transition {
            Transition::WinPending(reason) => PickOutcome::WinPending(reason),
            _ if is_fake => PickOutcome::CollectedFake,
            _ => PickOutcome::CollectedReal,
        }
    }

    fn wrong_guess(&mut self, item_id: ItemId) -> PickOutcome {
        let transition = self.progress.on_wrong_guess();
        let chances_remaining = self.progress.chances_remaining();
        match transition {
            Transition::Updated => {
                self.events.push(RuntimeEvent::WrongGuess {
                    item_id,
                    chances_remaining,
                });
                self.show_feedback(format!("Wrong! {}", chances_message(chances_remaining)));
                PickOutcome::WrongGuess { chances_remaining }
            }
            Transition::Lost(reason) => {
                self.events.push(RuntimeEvent::WrongGuess {
                    item_id,
                    chances_remaining,
                });
                self.remove_item(item_id);
                self.apply_transition(transition);
                PickOutcome::Lost(reason)
            }
            _ => PickOutcome::Ignored,
        }
    }

    fn remove_item(&mut self, item_id: ItemId) {
        let Some(item) = self.items.get_mut(item_id.0) else {
            return;
        };
        item.collected = true;
        let instance = item.instance;
        self.pool.hide(instance, &mut self.visuals);
        for interactable in &mut self.interactables {
            if interactable.kind == (InteractableKind::Collectible { item: item_id }) {
                interactable.enabled = false;
            }
        }
    }

    fn use_door(&mut self, id: InteractableId, door: DoorState) -> InteractionOutcome {
        if door.locked {
            self.events.push(RuntimeEvent::DoorLocked {
                interactable_id: id,
            });
            return InteractionOutcome::DoorLocked;
        }
        if let Some(room) = &door.room {
            if !self.gate.can_activate(room) {
                self.events.push(RuntimeEvent::DoorBlocked {
                    interactable_id: id,
                });
                self.show_feedback(ROOM_BLOCKED_MESSAGE.to_string());
                return InteractionOutcome::DoorBlocked;
            }
        }

        let open = !door.open;
        if let Some(InteractableKind::Door(state)) =
            self.interactables.get_mut(id.0).map(|i| &mut i.kind)
        {
            state.open = open;
        }
        if !open {
            self.events.push(RuntimeEvent::DoorClosed {
                interactable_id: id,
            });
            return InteractionOutcome::DoorClosed;
        }
        self.events.push(RuntimeEvent::DoorOpened {
            interactable_id: id,
        });

        if !door.starts_timer || self.progress.is_ended() {
            return InteractionOutcome::DoorOpened {
                timer_started: false,
            };
        }
        // Every timer door claims its room; only the first one arms the clock.
        if let Some(room) = door.room {
            if !self.gate.is_active() {
                self.activate_room(room);
            }
        }
        let timer_started = !self.timer.is_armed() && self.start_timer();
        if timer_started {
            let chances = self.progress.chances_remaining();
            self.show_feedback(format!("You have {}", chances_message(chances)));
        }
        InteractionOutcome::DoorOpened { timer_started }
    }

    fn toggle_drawer(&mut self, id: InteractableId) -> InteractionOutcome {
        let Some(InteractableKind::Drawer(drawer)) =
            self.interactables.get_mut(id.0).map(|i| &mut i.kind)
        else {
            return InteractionOutcome::Ignored;
        };
        drawer.open = !drawer.open;
        let open = drawer.open;
        self.events.push(RuntimeEvent::DrawerToggled {
            interactable_id: id,
            open,
        });
        InteractionOutcome::DrawerToggled { open }
    }

    pub fn start_timer(&mut self) -> bool {
        if !self.timer.start() {
            return false;
        }
        self.events.push(RuntimeEvent::TimerStarted);
        true
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause();
    }

    pub fn resume_timer(&mut self) -> bool {
        self.timer.resume()
    }

    pub fn activate_room(&mut self, room: RoomId) -> bool {
        if !self.gate.activate(&room) {
            return false;
        }
        self.events.push(RuntimeEvent::RoomActivated { room });
        true
    }

    pub fn complete_room(&mut self) -> Option<RoomId> {
        let room = self.gate.complete()?;
        self.events.push(RuntimeEvent::RoomCompleted { room: room.clone() });
        Some(room)
    }

    /// Called once the player finishes the task guarding a container.
    /// Returns the revealed item, if there was one.
    pub fn unlock_container(&mut self, id: ContainerId) -> Option<ItemId> {
        if self.progress.is_ended() {
            return None;
        }
        let contents = self.containers.unlock(id)?;
        self.events.push(RuntimeEvent::ContainerUnlocked {
            container_id: id,
            item_id: contents,
        });
        let item_id = contents?;
        if let Some(item) = self.items.get_mut(item_id.0) {
            item.hidden = false;
            let instance = item.instance;
            self.pool.reveal(instance, &mut self.visuals);
        }
        debug!(?id, ?item_id, "container unlocked");
        Some(item_id)
    }

    pub fn unlock_door(&mut self, id: InteractableId) -> bool {
        if self.keys == 0 {
            return false;
        }
        let Some(InteractableKind::Door(door)) =
            self.interactables.get_mut(id.0).map(|i| &mut i.kind)
        else {
            return false;
        };
        if !door.locked {
            return false;
        }
        door.locked = false;
        self.keys -= 1;
        self.events.push(RuntimeEvent::DoorUnlocked {
            interactable_id: id,
            keys_left: self.keys,
        });
        true
    }

    pub fn add_keys(&mut self, count: u32) {
        self.keys = self.keys.saturating_add(count);
    }

    /// Shows `message` for the configured duration. A newer message replaces
    /// the current one and restarts the countdown.
    pub fn show_feedback(&mut self, message: String) {
        let wake_ms = self.now_ms + self.level.session.feedback_display_ms();
        self.scheduler
            .schedule(Deferred::HideFeedback, wake_ms, Deferred::HideFeedback);
        self.events.push(RuntimeEvent::FeedbackShown {
            message: message.clone(),
        });
        self.feedback = Some(message);
    }

    pub fn interactable_for_item(&self, item: ItemId) -> Option<InteractableId> {
        self.interactables
            .iter()
            .find(|i| i.kind == InteractableKind::Collectible { item })
            .map(|i| i.id)
    }
}

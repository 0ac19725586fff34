use tracing::info;

use crate::types::RoomId;

#[derive(Clone, Debug, Default)]
pub struct RoomGate {
    active: Option<RoomId>,
}

impl RoomGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_activate(&self, room: &RoomId) -> bool {
        match &self.active {
            None => true,
            Some(active) => active == room,
        }
    }

    pub fn activate(&mut self, room: &RoomId) -> bool {
        if self.active.is_some() {
            return false;
        }
        info!(%room, "room activated");
        self.active = Some(room.clone());
        true
    }

    pub fn complete(&mut self) -> Option<RoomId> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&RoomId> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

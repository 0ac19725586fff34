use crate::config::SlotConfig;
use crate::types::{InstanceId, SlotId, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub id: SlotId,
    pub position: Vec3,
    pub orientation: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
    occupants: Vec<Option<InstanceId>>,
}

impl SlotRegistry {
    pub fn from_config(configs: &[SlotConfig]) -> Self {
        let slots: Vec<Slot> = configs
            .iter()
            .enumerate()
            .map(|(idx, cfg)| Slot {
                id: SlotId(idx),
                position: cfg.position,
                orientation: cfg.orientation,
            })
            .collect();
        let occupants = vec![None; slots.len()];
        Self { slots, occupants }
    }

    pub fn all_slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.0)
    }

    pub fn is_occupied(&self, slot: SlotId) -> bool {
        matches!(self.occupants.get(slot.0), Some(Some(_)))
    }

    pub fn occupant(&self, slot: SlotId) -> Option<InstanceId> {
        self.occupants.get(slot.0).copied().flatten()
    }

    pub fn free_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|slot| !self.is_occupied(slot.id))
            .map(|slot| slot.id)
            .collect()
    }

    pub fn attach(&mut self, slot: SlotId, instance: InstanceId) -> bool {
        match self.occupants.get_mut(slot.0) {
            Some(entry @ None) => {
                *entry = Some(instance);
                true
            }
            _ => false,
        }
    }

    pub fn detach(&mut self, slot: SlotId) -> Option<InstanceId> {
        self.occupants.get_mut(slot.0).and_then(Option::take)
    }

    pub fn clear(&mut self) {
        for entry in &mut self.occupants {
            *entry = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: usize) -> SlotRegistry {
        let configs: Vec<SlotConfig> = (0..count)
            .map(|idx| SlotConfig {
                position: Vec3::new(idx as f32, 0.0, 0.0),
                orientation: Vec3::ZERO,
            })
            .collect();
        SlotRegistry::from_config(&configs)
    }

    #[test]
    fn attach_marks_slot_occupied_once() {
        let mut slots = registry(3);
        assert!(!slots.is_occupied(SlotId(1)));
        assert!(slots.attach(SlotId(1), InstanceId(0)));
        assert!(slots.is_occupied(SlotId(1)));
        assert!(!slots.attach(SlotId(1), InstanceId(1)));
        assert_eq!(slots.occupant(SlotId(1)), Some(InstanceId(0)));
        assert_eq!(slots.free_slots(), vec![SlotId(0), SlotId(2)]);
    }

    #[test]
    fn unknown_slot_is_never_occupied_or_attachable() {
        let mut slots = registry(1);
        assert!(!slots.is_occupied(SlotId(9)));
        assert!(!slots.attach(SlotId(9), InstanceId(0)));
    }

    #[test]
    fn detach_frees_the_slot() {
        let mut slots = registry(2);
        slots.attach(SlotId(0), InstanceId(3));
        assert_eq!(slots.detach(SlotId(0)), Some(InstanceId(3)));
        assert!(!slots.is_occupied(SlotId(0)));
        assert_eq!(slots.detach(SlotId(0)), None);
    }

    #[test]
    fn slots_keep_configured_order() {
        let slots = registry(4);
        let ids: Vec<SlotId> = slots.all_slots().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SlotId(0), SlotId(1), SlotId(2), SlotId(3)]);
    }
}

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::types::{ArchetypeId, InstanceId, SlotId, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Engine-side object that backs each pooled instance. The pool only ever
/// toggles activity and moves it.
pub trait VisualProvider {
    fn create(&mut self, archetype: ArchetypeId) -> VisualHandle;
    fn set_active(&mut self, handle: VisualHandle, active: bool);
    fn set_transform(&mut self, handle: VisualHandle, position: Vec3, orientation: Vec3);
}

#[derive(Clone, Debug, Default)]
pub struct HeadlessVisuals {
    next_handle: u64,
    pub created: usize,
    pub active: BTreeMap<u64, bool>,
}

impl VisualProvider for HeadlessVisuals {
    fn create(&mut self, _archetype: ArchetypeId) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;
        self.active.insert(handle.0, false);
        handle
    }

    fn set_active(&mut self, handle: VisualHandle, active: bool) {
        self.active.insert(handle.0, active);
    }

    fn set_transform(&mut self, _handle: VisualHandle, _position: Vec3, _orientation: Vec3) {}
}

#[derive(Clone, Debug)]
pub struct PooledInstance {
    pub id: InstanceId,
    pub archetype: ArchetypeId,
    pub active: bool,
    pub slot: Option<SlotId>,
    pub position: Vec3,
    pub orientation: Vec3,
    pub visual: VisualHandle,
}

#[derive(Clone, Debug, Default)]
pub struct InstancePool {
    instances: Vec<PooledInstance>,
    by_archetype: BTreeMap<ArchetypeId, Vec<InstanceId>>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `count` inactive instances. Refused if the archetype was
    /// already preallocated.
    pub fn preallocate(
        &mut self,
        archetype: ArchetypeId,
        count: usize,
        visuals: &mut dyn VisualProvider,
    ) -> bool {
        if self.by_archetype.contains_key(&archetype) {
            warn!(?archetype, "pool already preallocated, ignoring");
            return false;
        }
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = InstanceId(self.instances.len());
            let visual = visuals.create(archetype);
            visuals.set_active(visual, false);
            self.instances.push(PooledInstance {
                id,
                archetype,
                active: false,
                slot: None,
                position: Vec3::ZERO,
                orientation: Vec3::ZERO,
                visual,
            });
            ids.push(id);
        }
        debug!(?archetype, count, "pool preallocated");
        self.by_archetype.insert(archetype, ids);
        true
    }

    pub fn acquire(
        &mut self,
        archetype: ArchetypeId,
        visuals: &mut dyn VisualProvider,
    ) -> Option<InstanceId> {
        let ids = self.by_archetype.get(&archetype)?;
        let id = ids
            .iter()
            .copied()
            .find(|id| !self.instances[id.0].active)?;
        let instance = &mut self.instances[id.0];
        instance.active = true;
        visuals.set_active(instance.visual, true);
        Some(id)
    }

    pub fn release(&mut self, id: InstanceId, visuals: &mut dyn VisualProvider) -> bool {
        let Some(instance) = self.instances.get_mut(id.0) else {
            return false;
        };
        if !instance.active {
            return false;
        }
        instance.active = false;
        instance.slot = None;
        visuals.set_active(instance.visual, false);
        true
    }

    pub fn place(
        &mut self,
        id: InstanceId,
        slot: Option<SlotId>,
        position: Vec3,
        orientation: Vec3,
        visuals: &mut dyn VisualProvider,
    ) {
        if let Some(instance) = self.instances.get_mut(id.0) {
            instance.slot = slot;
            instance.position = position;
            instance.orientation = orientation;
            visuals.set_transform(instance.visual, position, orientation);
        }
    }

    pub fn hide(&mut self, id: InstanceId, visuals: &mut dyn VisualProvider) {
        if let Some(instance) = self.instances.get(id.0) {
            visuals.set_active(instance.visual, false);
        }
    }

    pub fn reveal(&mut self, id: InstanceId, visuals: &mut dyn VisualProvider) {
        if let Some(instance) = self.instances.get(id.0) {
            if instance.active {
                visuals.set_active(instance.visual, true);
            }
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<&PooledInstance> {
        self.instances.get(id.0)
    }

    pub fn capacity(&self, archetype: ArchetypeId) -> usize {
        self.by_archetype.get(&archetype).map_or(0, Vec::len)
    }

    pub fn available(&self, archetype: ArchetypeId) -> usize {
        self.by_archetype.get(&archetype).map_or(0, |ids| {
            ids.iter().filter(|id| !self.instances[id.0].active).count()
        })
    }

    pub fn active_count(&self) -> usize {
        self.instances.iter().filter(|i| i.active).count()
    }

    pub fn total_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn active_ids(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|i| i.active)
            .map(|i| i.id)
            .collect()
    }
}

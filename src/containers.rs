use crate::config::ContainerConfig;
use crate::types::{ContainerId, ItemId, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    pub position: Vec3,
    pub orientation: Vec3,
    pub locked: bool,
    pub contents: Option<ItemId>,
}

impl Container {
    pub fn is_filled(&self) -> bool {
        self.contents.is_some()
    }
}

/// Receptacles that each hide at most one item. A filled container locks
/// itself until something unlocks it.
#[derive(Clone, Debug, Default)]
pub struct ContainerRegistry {
    containers: Vec<Container>,
}

impl ContainerRegistry {
    pub fn from_config(configs: &[ContainerConfig]) -> Self {
        let containers = configs
            .iter()
            .enumerate()
            .map(|(idx, cfg)| Container {
                id: ContainerId(idx),
                position: cfg.position,
                orientation: cfg.orientation,
                locked: false,
                contents: None,
            })
            .collect();
        Self { containers }
    }

    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    pub fn all(&self) -> &[Container] {
        &self.containers
    }

    pub fn empty_ids(&self) -> Vec<ContainerId> {
        self.containers
            .iter()
            .filter(|c| !c.is_filled())
            .map(|c| c.id)
            .collect()
    }

    pub fn has_empty(&self) -> bool {
        self.containers.iter().any(|c| !c.is_filled())
    }

    pub fn insert(&mut self, id: ContainerId, item: ItemId) -> bool {
        let Some(container) = self.containers.get_mut(id.0) else {
            return false;
        };
        if container.is_filled() {
            return false;
        }
        container.contents = Some(item);
        container.locked = true;
        true
    }

    /// Unlocks a locked container and hands back what it was hiding.
    /// Already-unlocked containers yield nothing.
    pub fn unlock(&mut self, id: ContainerId) -> Option<Option<ItemId>> {
        let container = self.containers.get_mut(id.0)?;
        if !container.locked {
            return None;
        }
        container.locked = false;
        Some(container.contents)
    }

    pub fn clear(&mut self) {
        for container in &mut self.containers {
            container.locked = false;
            container.contents = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: usize) -> ContainerRegistry {
        let configs: Vec<ContainerConfig> = (0..count)
            .map(|idx| ContainerConfig {
                position: Vec3::new(0.0, idx as f32, 0.0),
                orientation: Vec3::ZERO,
            })
            .collect();
        ContainerRegistry::from_config(&configs)
    }

    #[test]
    fn insert_fills_and_locks_once() {
        let mut containers = registry(2);
        assert!(containers.insert(ContainerId(0), ItemId(5)));
        assert!(!containers.insert(ContainerId(0), ItemId(6)));
        let first = containers.get(ContainerId(0)).expect("container");
        assert!(first.locked);
        assert_eq!(first.contents, Some(ItemId(5)));
        assert_eq!(containers.empty_ids(), vec![ContainerId(1)]);
    }

    #[test]
    fn unlock_reveals_contents_only_once() {
        let mut containers = registry(1);
        containers.insert(ContainerId(0), ItemId(2));
        assert_eq!(containers.unlock(ContainerId(0)), Some(Some(ItemId(2))));
        assert_eq!(containers.unlock(ContainerId(0)), None);
        assert_eq!(containers.unlock(ContainerId(4)), None);
    }

    #[test]
    fn clear_empties_everything() {
        let mut containers = registry(2);
        containers.insert(ContainerId(1), ItemId(0));
        containers.clear();
        assert!(containers.all().iter().all(|c| !c.is_filled() && !c.locked));
    }
}

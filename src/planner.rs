use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::{ArchetypeConfig, ArchetypeSelection, SessionConfig};
use crate::containers::ContainerRegistry;
use crate::pool::{InstancePool, VisualProvider};
use crate::rng::Rng;
use crate::slots::SlotRegistry;
use crate::types::{
    ArchetypeId, ContainerId, InstanceId, ItemId, ItemLocation, SetupWarning, SlotId, Vec3,
};

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedItem {
    pub id: ItemId,
    pub instance: InstanceId,
    pub archetype: ArchetypeId,
    pub location: ItemLocation,
    pub position: Vec3,
    pub is_fake: bool,
    pub collected: bool,
    pub hidden: bool,
}

impl PlacedItem {
    pub fn is_pickable(&self) -> bool {
        !self.collected && !self.hidden
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSettings {
    pub total_to_spawn: usize,
    pub min_distance: f32,
    pub prevent_overlap: bool,
    pub chance_to_use_container: f32,
    pub selection: ArchetypeSelection,
}

impl From<&SessionConfig> for PlacementSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            total_to_spawn: config.total_to_spawn,
            min_distance: config.min_distance,
            prevent_overlap: config.prevent_overlap,
            chance_to_use_container: config.chance_to_use_container,
            selection: config.archetype_selection,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlacementReport {
    pub requested: usize,
    pub items: Vec<PlacedItem>,
    pub warnings: Vec<SetupWarning>,
}

impl PlacementReport {
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.items.len())
    }
}

pub struct PlacementPlanner<'a> {
    pub slots: &'a mut SlotRegistry,
    pub pool: &'a mut InstancePool,
    pub containers: &'a mut ContainerRegistry,
    pub visuals: &'a mut dyn VisualProvider,
    pub rng: &'a mut Rng,
}

impl PlacementPlanner<'_> {
    pub fn plan(
        &mut self,
        archetypes: &[ArchetypeConfig],
        settings: &PlacementSettings,
    ) -> PlacementReport {
        let mut report = PlacementReport {
            requested: settings.total_to_spawn,
            ..PlacementReport::default()
        };
        let mut exhausted: BTreeSet<ArchetypeId> = BTreeSet::new();
        let mut world_positions: Vec<Vec3> = Vec::new();

        let mut candidates = self.slots.free_slots();
        self.rng.shuffle(&mut candidates);

        for slot_id in candidates {
            if report.items.len() >= settings.total_to_spawn {
                break;
            }

            if settings.chance_to_use_container > 0.0
                && self.containers.has_empty()
                && self.rng.bool(settings.chance_to_use_container)
            {
                let item_id = ItemId(report.items.len());
                if let Some(item) = self.place_in_container(
                    item_id,
                    archetypes,
                    settings.selection,
                    &mut exhausted,
                    &mut report.warnings,
                ) {
                    report.items.push(item);
                    continue;
                }
            }

            let Some(slot) = self.slots.get(slot_id).cloned() else {
                continue;
            };
            if settings.prevent_overlap
                && world_positions
                    .iter()
                    .any(|placed| placed.distance(slot.position) < settings.min_distance)
            {
                continue;
            }
            let Some(archetype) =
                pick_archetype(archetypes, Some(slot_id), settings.selection, self.rng)
            else {
                continue;
            };
            let Some(instance) = self.acquire(archetype, &mut exhausted, &mut report.warnings)
            else {
                continue;
            };

            self.slots.attach(slot_id, instance);
            self.pool.place(
                instance,
                Some(slot_id),
                slot.position,
                slot.orientation,
                self.visuals,
            );
            world_positions.push(slot.position);
            report.items.push(PlacedItem {
                id: ItemId(report.items.len()),
                instance,
                archetype,
                location: ItemLocation::Slot(slot_id),
                position: slot.position,
                is_fake: false,
                collected: false,
                hidden: false,
            });
        }

        if report.items.len() < settings.total_to_spawn {
            let warning = SetupWarning::PlacementShortfall {
                requested: settings.total_to_spawn,
                placed: report.items.len(),
            };
            warn!(%warning, "placement finished short");
            report.warnings.push(warning);
        }
        debug!(
            placed = report.items.len(),
            requested = settings.total_to_spawn,
            "placement pass done"
        );
        report
    }

    fn place_in_container(
        &mut self,
        item_id: ItemId,
        archetypes: &[ArchetypeConfig],
        selection: ArchetypeSelection,
        exhausted: &mut BTreeSet<ArchetypeId>,
        warnings: &mut Vec<SetupWarning>,
    ) -> Option<PlacedItem> {
        let empty: Vec<ContainerId> = self.containers.empty_ids();
        if empty.is_empty() {
            return None;
        }
        let container_id = empty[self.rng.pick_index(empty.len())];
        let container = self.containers.get(container_id)?.clone();
        let archetype = pick_archetype(archetypes, None, selection, self.rng)?;
        let instance = self.acquire(archetype, exhausted, warnings)?;

        self.containers.insert(container_id, item_id);
        self.pool.place(
            instance,
            None,
            container.position,
            container.orientation,
            self.visuals,
        );
        self.pool.hide(instance, self.visuals);
        Some(PlacedItem {
            id: item_id,
            instance,
            archetype,
            location: ItemLocation::Container(container_id),
            position: container.position,
            is_fake: false,
            collected: false,
            hidden: true,
        })
    }

    fn acquire(
        &mut self,
        archetype: ArchetypeId,
        exhausted: &mut BTreeSet<ArchetypeId>,
        warnings: &mut Vec<SetupWarning>,
    ) -> Option<InstanceId> {
        let instance = self.pool.acquire(archetype, self.visuals);
        if instance.is_none() && exhausted.insert(archetype) {
            let warning = SetupWarning::PoolExhausted { archetype };
            warn!(%warning, "skipping placement");
            warnings.push(warning);
        }
        instance
    }
}

/// `slot = None` asks for archetypes that may go anywhere (container
/// placement); archetypes pinned to fixed slots are skipped then.
pub fn pick_archetype(
    archetypes: &[ArchetypeConfig],
    slot: Option<SlotId>,
    selection: ArchetypeSelection,
    rng: &mut Rng,
) -> Option<ArchetypeId> {
    let eligible: Vec<usize> = archetypes
        .iter()
        .enumerate()
        .filter(|(_, archetype)| match slot {
            Some(slot) => archetype.accepts(slot),
            None => archetype.eligible_slots.is_none(),
        })
        .map(|(idx, _)| idx)
        .collect();
    if eligible.is_empty() {
        return None;
    }

    let picked = match selection {
        ArchetypeSelection::Weighted => {
            let weights: Vec<u32> = eligible
                .iter()
                .map(|idx| archetypes[*idx].spawn_weight)
                .collect();
            rng.weighted_index(&weights)
                .unwrap_or_else(|| rng.pick_index(eligible.len()))
        }
        ArchetypeSelection::Uniform => rng.pick_index(eligible.len()),
    };
    Some(ArchetypeId(eligible[picked]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContainerConfig, SlotConfig};
    use crate::pool::HeadlessVisuals;

    struct Fixture {
        slots: SlotRegistry,
        pool: InstancePool,
        containers: ContainerRegistry,
        visuals: HeadlessVisuals,
        rng: Rng,
        archetypes: Vec<ArchetypeConfig>,
    }

    impl Fixture {
        fn new(positions: Vec<Vec3>, archetypes: Vec<ArchetypeConfig>, pool_size: usize) -> Self {
            let configs: Vec<SlotConfig> = positions
                .into_iter()
                .map(|position| SlotConfig {
                    position,
                    orientation: Vec3::ZERO,
                })
                .collect();
            let mut visuals = HeadlessVisuals::default();
            let mut pool = InstancePool::new();
            for idx in 0..archetypes.len() {
                pool.preallocate(ArchetypeId(idx), pool_size, &mut visuals);
            }
            Self {
                slots: SlotRegistry::from_config(&configs),
                pool,
                containers: ContainerRegistry::default(),
                visuals,
                rng: Rng::new(1),
                archetypes,
            }
        }

        fn with_containers(mut self, count: usize) -> Self {
            let configs: Vec<ContainerConfig> = (0..count)
                .map(|idx| ContainerConfig {
                    position: Vec3::new(-10.0, idx as f32, 0.0),
                    orientation: Vec3::ZERO,
                })
                .collect();
            self.containers = ContainerRegistry::from_config(&configs);
            self
        }

        fn seeded(mut self, seed: u32) -> Self {
            self.rng = Rng::new(seed);
            self
        }

        fn plan(&mut self, settings: PlacementSettings) -> PlacementReport {
            let mut planner = PlacementPlanner {
                slots: &mut self.slots,
                pool: &mut self.pool,
                containers: &mut self.containers,
                visuals: &mut self.visuals,
                rng: &mut self.rng,
            };
            planner.plan(&self.archetypes, &settings)
        }
    }

    fn line(count: usize, spacing: f32) -> Vec<Vec3> {
        (0..count)
            .map(|idx| Vec3::new(idx as f32 * spacing, 0.0, 0.0))
            .collect()
    }

    fn settings(total: usize, min_distance: f32) -> PlacementSettings {
        PlacementSettings {
            total_to_spawn: total,
            min_distance,
            prevent_overlap: true,
            chance_to_use_container: 0.0,
            selection: ArchetypeSelection::Weighted,
        }
    }

    fn archetypes(count: usize) -> Vec<ArchetypeConfig> {
        (0..count)
            .map(|idx| ArchetypeConfig::named(format!("prop_{idx}")))
            .collect()
    }

    #[test]
    fn placed_items_respect_min_distance_for_any_seed() {
        for seed in 0..200u32 {
            let mut scatter = Rng::new(seed.wrapping_mul(31).wrapping_add(5));
            let positions: Vec<Vec3> = (0..40)
                .map(|_| {
                    Vec3::new(
                        scatter.int(0, 20) as f32,
                        0.0,
                        scatter.int(0, 20) as f32,
                    )
                })
                .collect();
            let mut fixture = Fixture::new(positions, archetypes(3), 20).seeded(seed);
            let report = fixture.plan(settings(12, 3.0));

            assert!(report.items.len() <= 12);
            for (i, a) in report.items.iter().enumerate() {
                for b in &report.items[i + 1..] {
                    assert!(
                        a.position.distance(b.position) >= 3.0,
                        "seed={seed} items {:?} and {:?} too close",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn twenty_spaced_slots_fit_fifteen_items() {
        let mut fixture = Fixture::new(line(20, 4.0), archetypes(5), 15);
        let report = fixture.plan(settings(15, 3.0));
        assert_eq!(report.items.len(), 15);
        assert_eq!(report.shortfall(), 0);
        assert!(report.warnings.is_empty());
        for item in &report.items {
            let ItemLocation::Slot(slot) = item.location else {
                panic!("expected world slot placement");
            };
            assert_eq!(fixture.slots.occupant(slot), Some(item.instance));
        }
    }

    #[test]
    fn tight_spacing_finishes_short_with_a_report() {
        let mut fixture = Fixture::new(line(10, 1.0), archetypes(2), 10);
        let report = fixture.plan(settings(8, 3.0));
        assert!(report.items.len() < 8);
        assert!(report.items.len() >= 2);
        assert!(report.warnings.contains(&SetupWarning::PlacementShortfall {
            requested: 8,
            placed: report.items.len(),
        }));
    }

    #[test]
    fn overlap_check_can_be_disabled() {
        let mut fixture = Fixture::new(vec![Vec3::ZERO; 6], archetypes(1), 6);
        let mut loose = settings(6, 3.0);
        loose.prevent_overlap = false;
        let report = fixture.plan(loose);
        assert_eq!(report.items.len(), 6);
    }

    #[test]
    fn pool_exhaustion_skips_slots_and_reports_once() {
        let mut fixture = Fixture::new(line(10, 5.0), archetypes(1), 2);
        let report = fixture.plan(settings(5, 3.0));
        assert_eq!(report.items.len(), 2);
        let exhausted = report
            .warnings
            .iter()
            .filter(|w| matches!(w, SetupWarning::PoolExhausted { .. }))
            .count();
        assert_eq!(exhausted, 1);
        assert_eq!(fixture.pool.total_instances(), 2);
    }

    #[test]
    fn pinned_archetypes_only_land_on_their_slots() {
        let mut pinned = archetypes(2);
        pinned[0].eligible_slots = Some(vec![SlotId(0), SlotId(1)]);
        pinned[1].eligible_slots = Some(vec![SlotId(5)]);
        let mut fixture = Fixture::new(line(8, 5.0), pinned, 4);
        let report = fixture.plan(settings(8, 3.0));

        assert_eq!(report.items.len(), 3);
        for item in &report.items {
            let ItemLocation::Slot(slot) = item.location else {
                panic!("expected world slot");
            };
            match item.archetype {
                ArchetypeId(0) => assert!(slot == SlotId(0) || slot == SlotId(1)),
                ArchetypeId(1) => assert_eq!(slot, SlotId(5)),
                other => panic!("unexpected archetype {other:?}"),
            }
        }
    }

    #[test]
    fn occupied_slots_are_not_candidates() {
        let mut fixture = Fixture::new(line(4, 5.0), archetypes(1), 4);
        fixture.slots.attach(SlotId(2), InstanceId(99));
        let report = fixture.plan(settings(4, 1.0));
        assert_eq!(report.items.len(), 3);
        assert!(report
            .items
            .iter()
            .all(|item| item.location != ItemLocation::Slot(SlotId(2))));
    }

    #[test]
    fn containers_take_items_first_when_chance_is_certain() {
        let mut fixture = Fixture::new(line(10, 5.0), archetypes(2), 10).with_containers(3);
        let mut with_containers = settings(5, 3.0);
        with_containers.chance_to_use_container = 1.0;
        let report = fixture.plan(with_containers);

        assert_eq!(report.items.len(), 5);
        let hidden: Vec<&PlacedItem> = report.items.iter().filter(|i| i.hidden).collect();
        assert_eq!(hidden.len(), 3);
        for item in hidden {
            let ItemLocation::Container(container) = item.location else {
                panic!("hidden item should sit in a container");
            };
            let container = fixture.containers.get(container).expect("container");
            assert!(container.locked);
            assert_eq!(container.contents, Some(item.id));
        }
        assert!(!fixture.containers.has_empty());
    }

    #[test]
    fn partial_container_chance_mixes_world_and_container_placements() {
        let mut world = 0;
        let mut per_container = [0usize; 4];
        for seed in 1..=40 {
            let mut fixture = Fixture::new(line(30, 5.0), archetypes(2), 10)
                .with_containers(4)
                .seeded(seed);
            let mut mixed = settings(10, 3.0);
            mixed.chance_to_use_container = 0.3;
            let report = fixture.plan(mixed);

            assert_eq!(report.items.len(), 10);
            for item in &report.items {
                match item.location {
                    ItemLocation::Slot(_) => {
                        assert!(!item.hidden);
                        world += 1;
                    }
                    ItemLocation::Container(container) => {
                        assert!(item.hidden);
                        per_container[container.0] += 1;
                    }
                }
            }
        }

        let in_containers: usize = per_container.iter().sum();
        assert!(world > in_containers);
        assert!(in_containers > 0);
        assert!(per_container.iter().all(|count| *count > 0), "{per_container:?}");
    }

    #[test]
    fn same_seed_places_identically() {
        let run = |seed: u32| {
            let mut fixture = Fixture::new(line(30, 2.0), archetypes(4), 5).seeded(seed);
            fixture
                .plan(settings(10, 3.0))
                .items
                .iter()
                .map(|item| (item.location, item.archetype))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn no_archetypes_places_nothing() {
        let mut fixture = Fixture::new(line(5, 5.0), Vec::new(), 0);
        let report = fixture.plan(settings(3, 1.0));
        assert!(report.items.is_empty());
        assert_eq!(report.shortfall(), 3);
    }

    #[test]
    fn uniform_selection_ignores_weights() {
        let mut weighted = archetypes(2);
        weighted[0].spawn_weight = 0;
        let mut rng = Rng::new(3);
        let mut saw_zero_weight = false;
        for _ in 0..200 {
            if pick_archetype(&weighted, Some(SlotId(0)), ArchetypeSelection::Uniform, &mut rng)
                == Some(ArchetypeId(0))
            {
                saw_zero_weight = true;
            }
        }
        assert!(saw_zero_weight);
        for _ in 0..200 {
            assert_eq!(
                pick_archetype(&weighted, Some(SlotId(0)), ArchetypeSelection::Weighted, &mut rng),
                Some(ArchetypeId(1))
            );
        }
    }
}

use tracing::{info, warn};

use super::*;
use crate::identity::assign_fakes;
use crate::interaction::build_interactables;
use crate::planner::{PlacementPlanner, PlacementSettings};
use crate::types::{ArchetypeId, SlotId};

impl<V: VisualProvider> GameSession<V> {
    pub(super) fn preallocate_pools(&mut self) {
        for idx in 0..self.level.archetypes.len() {
            let archetype = ArchetypeId(idx);
            let count = self.level.pool_size_for(archetype);
            self.pool.preallocate(archetype, count, &mut self.visuals);
        }
    }

    pub(super) fn run_setup(&mut self) {
        let settings = PlacementSettings::from(&self.level.session);
        let report = PlacementPlanner {
            slots: &mut self.slots,
            pool: &mut self.pool,
            containers: &mut self.containers,
            visuals: &mut self.visuals,
            rng: &mut self.rng,
        }
        .plan(&self.level.archetypes, &settings);

        self.requested = report.requested;
        self.items = report.items;
        self.warnings = self.config_warnings.clone();
        self.warnings.extend(report.warnings);

        let assignment = assign_fakes(
            &mut self.items,
            self.level.session.fake_count,
            &mut self.rng,
            &mut self.progress,
        );
        if assignment.requested > assignment.fakes.len() {
            let warning = SetupWarning::FakeCountClamped {
                requested: assignment.requested,
                limit: assignment.fakes.len(),
            };
            if !self.warnings.contains(&warning) {
                warn!(%warning, "fewer items than requested fakes");
                self.warnings.push(warning);
            }
        }

        let item_ids: Vec<ItemId> = self.items.iter().map(|item| item.id).collect();
        self.interactables = build_interactables(&self.level.interactables, &item_ids);

        self.emit_placement_events();
        for warning in self.warnings.clone() {
            self.events.push(RuntimeEvent::SetupWarning { warning });
        }

        info!(
            seed = self.seed,
            requested = self.requested,
            placed = self.items.len(),
            fake = self.progress.total_fake(),
            warnings = self.warnings.len(),
            "session ready"
        );
    }

    /// Announces each placement in order, letting watching interactables
    /// shut off as their slots fill.
    fn emit_placement_events(&mut self) {
        let placements: Vec<(ItemId, ItemLocation)> = self
            .items
            .iter()
            .map(|item| (item.id, item.location))
            .collect();
        for (item_id, location) in placements {
            self.events.push(RuntimeEvent::ItemPlaced { item_id, location });
            match location {
                ItemLocation::Slot(slot) => self.apply_slot_watches(slot),
                ItemLocation::Container(container_id) => {
                    self.events.push(RuntimeEvent::ContainerFilled {
                        container_id,
                        item_id,
                    });
                }
            }
        }
    }

    fn apply_slot_watches(&mut self, filled: SlotId) {
        for interactable in &mut self.interactables {
            if !interactable.enabled {
                continue;
            }
            let fires = interactable
                .watch()
                .is_some_and(|watch| watch.fires_on(filled, &self.slots));
            if fires {
                interactable.enabled = false;
                self.events.push(RuntimeEvent::InteractionDisabled {
                    interactable_id: interactable.id,
                });
            }
        }
    }

    /// Throws away the current round and sets up a fresh one with `seed`.
    /// Pools keep their instances; everything else starts over.
    pub fn reset(&mut self, seed: u32) {
        for item in &self.items {
            self.pool.release(item.instance, &mut self.visuals);
        }
        self.slots.clear();
        self.containers.clear();
        self.items.clear();
        self.interactables.clear();
        self.events.clear();
        self.scheduler.clear();

        self.seed = seed;
        self.rng = Rng::new(seed);
        self.progress = GameProgress::new(self.level.session.max_chances);
        self.timer = CountdownTimer::new(self.level.session.total_time_ms());
        self.gate = RoomGate::new();
        self.feedback = None;
        self.keys = self.level.session.starting_keys;
        self.now_ms = 0;
        self.tick_counter = 0;

        self.run_setup();
    }
}

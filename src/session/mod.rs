use tracing::debug;

use crate::config::LevelConfig;
use crate::containers::ContainerRegistry;
use crate::interaction::Interactable;
use crate::planner::PlacedItem;
use crate::pool::{HeadlessVisuals, InstancePool, VisualProvider};
use crate::progress::{GameProgress, Transition};
use crate::rng::Rng;
use crate::rooms::RoomGate;
use crate::scheduler::Scheduler;
use crate::slots::SlotRegistry;
use crate::timer::CountdownTimer;
use crate::types::{
    GamePhase, GameSummary, InteractableId, ItemId, ItemLocation, ItemView, RuntimeEvent,
    SetupWarning, Snapshot,
};

mod interactions;
mod setup;

/// Categories of deferred work. Each doubles as its own action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    CompleteWin,
    HideFeedback,
}

/// One play session. Owns every component and is the only thing callers
/// talk to; nothing here is global.
pub struct GameSession<V: VisualProvider = HeadlessVisuals> {
    level: LevelConfig,
    seed: u32,
    rng: Rng,
    visuals: V,
    slots: SlotRegistry,
    pool: InstancePool,
    containers: ContainerRegistry,
    items: Vec<PlacedItem>,
    interactables: Vec<Interactable>,
    progress: GameProgress,
    timer: CountdownTimer,
    gate: RoomGate,
    scheduler: Scheduler<Deferred, Deferred>,
    events: Vec<RuntimeEvent>,
    config_warnings: Vec<SetupWarning>,
    warnings: Vec<SetupWarning>,
    requested: usize,
    feedback: Option<String>,
    keys: u32,
    now_ms: u64,
    tick_counter: u64,
}

impl GameSession<HeadlessVisuals> {
    pub fn new(level: LevelConfig, seed: u32) -> Self {
        Self::with_visuals(level, seed, HeadlessVisuals::default())
    }
}

impl<V: VisualProvider> GameSession<V> {
    pub fn with_visuals(mut level: LevelConfig, seed: u32, visuals: V) -> Self {
        let config_warnings = level.validate();
        let slots = SlotRegistry::from_config(&level.slots);
        let containers = ContainerRegistry::from_config(&level.containers);
        let progress = GameProgress::new(level.session.max_chances);
        let timer = CountdownTimer::new(level.session.total_time_ms());
        let keys = level.session.starting_keys;

        let mut session = Self {
            level,
            seed,
            rng: Rng::new(seed),
            visuals,
            slots,
            pool: InstancePool::new(),
            containers,
            items: Vec::new(),
            interactables: Vec::new(),
            progress,
            timer,
            gate: RoomGate::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            config_warnings,
            warnings: Vec::new(),
            requested: 0,
            feedback: None,
            keys,
            now_ms: 0,
            tick_counter: 0,
        };
        session.preallocate_pools();
        session.run_setup();
        session
    }

    /// Advances the clock. Timer effects land before any deferred work that
    /// falls due in the same tick.
    pub fn step(&mut self, dt_ms: u64) {
        self.tick_counter += 1;
        self.now_ms = self.now_ms.saturating_add(dt_ms);

        let signals = self.timer.tick(dt_ms);
        if signals.warning {
            self.events.push(RuntimeEvent::TimerWarning);
        }
        if signals.ticking {
            self.events.push(RuntimeEvent::TimerTicking);
        }
        if signals.expired {
            self.events.push(RuntimeEvent::TimerExpired);
            let transition = self.progress.on_timer_expired();
            self.apply_transition(transition);
        }

        for action in self.scheduler.drain_due(self.now_ms) {
            match action {
                Deferred::CompleteWin => {
                    let transition = self.progress.complete_win();
                    self.apply_transition(transition);
                }
                Deferred::HideFeedback => {
                    if self.feedback.take().is_some() {
                        self.events.push(RuntimeEvent::FeedbackHidden);
                    }
                }
            }
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::WinPending(reason) => {
                self.timer.halt();
                self.events.push(RuntimeEvent::InputFrozen);
                let wake_ms = self.now_ms + self.level.session.win_grace_delay_ms();
                self.scheduler
                    .schedule(Deferred::CompleteWin, wake_ms, Deferred::CompleteWin);
                debug!(?reason, wake_ms, "win scheduled");
            }
            Transition::Won(reason) => {
                self.events.push(RuntimeEvent::Won { reason });
            }
            Transition::Lost(reason) => {
                self.timer.halt();
                self.scheduler.cancel(Deferred::CompleteWin);
                self.events.push(RuntimeEvent::InputFrozen);
                self.events.push(RuntimeEvent::Lost { reason });
            }
            Transition::Ignored | Transition::Updated => {}
        }
    }

    pub fn is_ended(&self) -> bool {
        self.progress.is_ended()
    }

    pub fn phase(&self) -> GamePhase {
        self.progress.phase()
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn gate(&self) -> &RoomGate {
        &self.gate
    }

    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    pub fn pool(&self) -> &InstancePool {
        &self.pool
    }

    pub fn containers(&self) -> &ContainerRegistry {
        &self.containers
    }

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.get(id.0)
    }

    pub fn interactables(&self) -> &[Interactable] {
        &self.interactables
    }

    pub fn interactable(&self, id: InteractableId) -> Option<&Interactable> {
        self.interactables.get(id.0)
    }

    pub fn warnings(&self) -> &[SetupWarning] {
        &self.warnings
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn keys(&self) -> u32 {
        self.keys
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.now_ms,
            phase: self.progress.phase(),
            time_left_ms: self.timer.remaining_ms(),
            timer_display: self.timer.display(),
            timer_running: self.timer.is_running(),
            collected: self.progress.collected(),
            total_to_collect: self.progress.total_to_collect(),
            fake_collected: self.progress.fake_collected(),
            total_fake: self.progress.total_fake(),
            chances_remaining: self.progress.chances_remaining(),
            input_frozen: self.progress.input_frozen(),
            active_room: self.gate.active().cloned(),
            feedback: self.feedback.clone(),
            items: self
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id,
                    archetype: item.archetype,
                    position: item.position,
                    location: item.location,
                    collected: item.collected,
                    hidden: item.hidden,
                })
                .collect(),
            events: if include_events {
                self.drain_events()
            } else {
                Vec::new()
            },
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            phase: self.progress.phase(),
            reason: self.progress.reason(),
            duration_ms: self.now_ms,
            requested: self.requested,
            placed: self.items.len(),
            in_containers: self
                .items
                .iter()
                .filter(|item| matches!(item.location, ItemLocation::Container(_)))
                .count(),
            total_fake: self.progress.total_fake(),
            collected: self.progress.collected(),
            fake_collected: self.progress.fake_collected(),
            wrong_guesses: self.progress.wrong_guesses(),
            chances_remaining: self.progress.chances_remaining(),
            warnings: self.warnings.clone(),
        }
    }
}

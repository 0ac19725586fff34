use tracing::{debug, info};

use crate::types::{GameOverReason, GamePhase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Event arrived after the game stopped accepting it.
    Ignored,
    Updated,
    /// Win detected; input is frozen and the session owes a deferred
    /// `complete_win`.
    WinPending(GameOverReason),
    Won(GameOverReason),
    Lost(GameOverReason),
}

#[derive(Clone, Debug)]
pub struct GameProgress {
    phase: GamePhase,
    reason: Option<GameOverReason>,
    total_to_collect: usize,
    collected: usize,
    total_fake: usize,
    fake_collected: usize,
    chances_remaining: u32,
    wrong_guesses: u32,
    win_pending: Option<GameOverReason>,
    input_frozen: bool,
}

impl GameProgress {
    pub fn new(max_chances: u32) -> Self {
        Self {
            phase: GamePhase::Idle,
            reason: None,
            total_to_collect: 0,
            collected: 0,
            total_fake: 0,
            fake_collected: 0,
            chances_remaining: max_chances,
            wrong_guesses: 0,
            win_pending: None,
            input_frozen: false,
        }
    }

    /// Only the first registration counts.
    pub fn register(&mut self, total_to_collect: usize, total_fake: usize) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.total_to_collect = total_to_collect;
        self.total_fake = total_fake.min(total_to_collect);
        self.phase = GamePhase::Playing;
        info!(
            total = self.total_to_collect,
            fakes = self.total_fake,
            "collectibles registered"
        );
        true
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == GamePhase::Playing && self.win_pending.is_none()
    }

    pub fn on_collect(&mut self, is_fake: bool) -> Transition {
        if !self.accepts_input() || self.collected >= self.total_to_collect {
            return Transition::Ignored;
        }
        if is_fake && self.fake_collected >= self.total_fake {
            return Transition::Ignored;
        }

        self.collected += 1;
        if is_fake {
            self.fake_collected += 1;
        }
        debug!(
            collected = self.collected,
            total = self.total_to_collect,
            fakes = self.fake_collected,
            "item collected"
        );

        let reason = if self.total_fake > 0 && self.fake_collected == self.total_fake {
            Some(GameOverReason::AllFakesFound)
        } else if self.collected == self.total_to_collect {
            Some(GameOverReason::AllCollected)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                self.win_pending = Some(reason);
                self.input_frozen = true;
                info!(?reason, "win detected, input frozen");
                Transition::WinPending(reason)
            }
            None => Transition::Updated,
        }
    }

    pub fn on_wrong_guess(&mut self) -> Transition {
        if !self.accepts_input() {
            return Transition::Ignored;
        }
        self.wrong_guesses += 1;
        self.chances_remaining = self.chances_remaining.saturating_sub(1);
        if self.chances_remaining == 0 {
            return self.lose(GameOverReason::OutOfChances);
        }
        Transition::Updated
    }

    pub fn on_timer_expired(&mut self) -> Transition {
        if !self.accepts_input() {
            return Transition::Ignored;
        }
        self.lose(GameOverReason::Timeout)
    }

    /// Deferred half of a win; fires at most once.
    pub fn complete_win(&mut self) -> Transition {
        if self.phase != GamePhase::Playing {
            return Transition::Ignored;
        }
        let Some(reason) = self.win_pending.take() else {
            return Transition::Ignored;
        };
        self.phase = GamePhase::Won;
        self.reason = Some(reason);
        info!(?reason, "game won");
        Transition::Won(reason)
    }

    fn lose(&mut self, reason: GameOverReason) -> Transition {
        self.phase = GamePhase::Lost;
        self.reason = Some(reason);
        self.input_frozen = true;
        info!(?reason, "game lost");
        Transition::Lost(reason)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    pub fn is_win_pending(&self) -> bool {
        self.win_pending.is_some()
    }

    pub fn input_frozen(&self) -> bool {
        self.input_frozen
    }

    pub fn total_to_collect(&self) -> usize {
        self.total_to_collect
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn total_fake(&self) -> usize {
        self.total_fake
    }

    pub fn fake_collected(&self) -> usize {
        self.fake_collected
    }

    pub fn chances_remaining(&self) -> u32 {
        self.chances_remaining
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    pub fn props_left(&self) -> usize {
        self.total_to_collect - self.collected
    }

    pub fn fakes_left(&self) -> usize {
        self.total_fake - self.fake_collected
    }
}

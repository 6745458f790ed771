/// The game core: round scheduling and scoring.
///
/// Every state transition runs to completion inside one call:
///   - `tick(now)`   : fires the spawn timer if it is due
///   - `click(..)`   : classifies a click against the active round
///   - `reset(now)`  : the only way out of the terminal state
///   - `teardown()`  : disarm and hide before the session is discarded
///
/// Scheduling is a single-shot deadline that re-arms itself after each
/// spawn. A hit re-arms it with zero delay, so the next goblin appears
/// immediately and the cadence restarts from the hit.
///
/// Each transition returns the events it produced, in order.

use std::time::Duration;

use log::{debug, info};

use crate::config::RulesConfig;
use crate::domain::board::Board;
use crate::domain::random::RandomSource;
use crate::domain::rules::{self, ClickKind};
use crate::error::GameError;
use super::event::{GameEvent, Outcome};
use super::timer::SpawnTimer;

pub struct Game<B: Board> {
    board: B,
    rng: Box<dyn RandomSource>,

    // ── Scheduling ──
    interval: Duration,
    timer: SpawnTimer,

    // ── Round ──
    current_index: Option<usize>,
    round_active: bool,

    // ── Score ──
    hits: u32,
    misses: u32,
    win_hits: u32,
    max_misses: u32,
    is_over: bool,
    outcome: Option<Outcome>,
}

// ── Construction ──

impl<B: Board> Game<B> {
    pub fn new(board: B, rules: &RulesConfig, rng: Box<dyn RandomSource>) -> Result<Self, GameError> {
        rules.validate()?;
        if board.cell_count() == 0 {
            return Err(GameError::EmptyBoard);
        }

        Ok(Game {
            board,
            rng,
            interval: Duration::from_millis(rules.interval_ms),
            timer: SpawnTimer::new(),
            current_index: None,
            round_active: false,
            hits: 0,
            misses: 0,
            win_hits: rules.win_hits,
            max_misses: rules.max_misses,
            is_over: false,
            outcome: None,
        })
    }
}

// ── Scheduler / spawn loop ──

impl<B: Board> Game<B> {
    /// Arm the first spawn. No-op while a spawn is already pending or
    /// while the game is over (use `reset` for that).
    pub fn start(&mut self, now: Duration) {
        if self.timer.is_pending() || self.is_over {
            return;
        }
        info!("game started: {} cells, interval {:?}", self.board.cell_count(), self.interval);
        self.schedule_next(now, Duration::ZERO);
    }

    /// Replace any pending spawn with one due at `now + delay`.
    pub fn schedule_next(&mut self, now: Duration, delay: Duration) {
        self.timer.arm(now, delay);
    }

    /// Advance to `now`: fire the spawn timer if due and re-arm it.
    pub fn tick(&mut self, now: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.timer.fire_if_due(now) {
            return events;
        }
        if self.is_over {
            return events;
        }

        self.spawn(&mut events);

        if !self.is_over {
            self.schedule_next(now, self.interval);
        }
        events
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_over {
            return;
        }

        if self.round_active {
            self.misses += 1;
            if let Some(index) = self.current_index {
                debug!("goblin escaped from cell {index}");
                events.push(GameEvent::TargetEscaped { index });
            }
            self.push_score(events);
            if self.check_lose(events) {
                return;
            }
        }

        let index = rules::next_index(self.board.cell_count(), self.current_index, self.rng.as_mut());
        self.board.place_target_at(index);
        self.current_index = Some(index);
        self.round_active = true;
        debug!("goblin spawned at cell {index}");
        events.push(GameEvent::TargetSpawned { index });
    }
}

// ── Click classifier ──

impl<B: Board> Game<B> {
    pub fn click(&mut self, input: &B::Input, now: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let target = self.board.resolve_click(input);

        match rules::classify_click(self.is_over, self.round_active, target) {
            ClickKind::Ignored => {}
            ClickKind::Hit => {
                self.hits += 1;
                self.round_active = false;
                self.board.remove_target();

                let index = target.cell.unwrap_or_default();
                debug!("hit on cell {index} ({} / {})", self.hits, self.win_hits);
                events.push(GameEvent::TargetHit { index });
                self.push_score(&mut events);

                if !self.check_win(&mut events) {
                    self.schedule_next(now, Duration::ZERO);
                }
            }
            ClickKind::Miss => {
                self.misses += 1;
                let cell = target.cell.unwrap_or_default();
                debug!("miss on cell {cell} ({} / {})", self.misses, self.max_misses);
                events.push(GameEvent::ClickMissed { cell });
                self.push_score(&mut events);
                self.check_lose(&mut events);
            }
        }

        events
    }
}

// ── Win / lose / reset ──

impl<B: Board> Game<B> {
    fn check_win(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.hits >= self.win_hits {
            self.end_game(Outcome::Win, events);
            true
        } else {
            false
        }
    }

    fn check_lose(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.misses >= self.max_misses {
            self.end_game(Outcome::Lose, events);
            true
        } else {
            false
        }
    }

    fn end_game(&mut self, outcome: Outcome, events: &mut Vec<GameEvent>) {
        self.is_over = true;
        self.outcome = Some(outcome);
        self.timer.cancel();
        self.round_active = false;
        self.board.remove_target();

        info!("game over: {:?} with {} hits, {} misses", outcome, self.hits, self.misses);
        events.push(GameEvent::GameEnded { outcome, hits: self.hits, misses: self.misses });
    }

    /// Back to a fresh playable state, spawning immediately.
    pub fn reset(&mut self, now: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.hits = 0;
        self.misses = 0;
        self.current_index = None;
        self.round_active = false;
        self.is_over = false;
        self.outcome = None;
        self.board.remove_target();

        info!("game reset");
        self.push_score(&mut events);
        self.schedule_next(now, Duration::ZERO);
        events
    }

    /// Disarm and hide. Scores are left as they are; the instance is not
    /// expected to be used again.
    pub fn teardown(&mut self) {
        self.timer.cancel();
        self.round_active = false;
        self.board.remove_target();
        debug!("game torn down");
    }

    fn push_score(&self, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::ScoreChanged { hits: self.hits, misses: self.misses });
    }
}

// ── Queries ──

#[allow(dead_code)]
impl<B: Board> Game<B> {
    pub fn hits(&self) -> u32 { self.hits }
    pub fn misses(&self) -> u32 { self.misses }
    pub fn win_hits(&self) -> u32 { self.win_hits }
    pub fn max_misses(&self) -> u32 { self.max_misses }
    pub fn is_over(&self) -> bool { self.is_over }
    pub fn outcome(&self) -> Option<Outcome> { self.outcome }
    pub fn round_active(&self) -> bool { self.round_active }
    pub fn current_index(&self) -> Option<usize> { self.current_index }
    pub fn interval(&self) -> Duration { self.interval }

    /// Number of armed spawn timers: always 0 or 1.
    pub fn pending_timers(&self) -> usize {
        self.timer.pending_count()
    }

    /// Delay the pending spawn was armed with, if one is pending.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.timer.pending_delay()
    }

    pub fn next_spawn_at(&self) -> Option<Duration> {
        self.timer.due_at()
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }
}

/// Session: owner of the live game.
///
/// There is no process-wide "current game". Whoever boots a new game hands
/// it to the session, which tears the previous one down first so its timer
/// can never fire into the new board.

use std::time::{Duration, Instant};

use log::info;

use crate::domain::board::Board;
use super::game::Game;

/// Monotonic time since the session began. All game deadlines are
/// expressed against this origin.
#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        SessionClock { origin: Instant::now() }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub struct Session<B: Board> {
    game: Option<Game<B>>,
    generation: u32,
}

impl<B: Board> Session<B> {
    pub fn new() -> Self {
        Session { game: None, generation: 0 }
    }

    /// Install `game` as the live instance and start it. The previous
    /// instance, if any, is torn down and returned.
    pub fn replace(&mut self, mut game: Game<B>, now: Duration) -> Option<Game<B>> {
        let mut old = self.game.take();
        if let Some(prev) = old.as_mut() {
            prev.teardown();
        }
        self.generation += 1;
        info!("session #{} begins", self.generation);
        game.start(now);
        self.game = Some(game);
        old
    }

    /// Tear down and drop the live game.
    pub fn end(&mut self) -> Option<Game<B>> {
        let mut old = self.game.take();
        if let Some(prev) = old.as_mut() {
            prev.teardown();
            info!("session #{} ended: {} hits, {} misses", self.generation, prev.hits(), prev.misses());
        }
        old
    }

    #[allow(dead_code)]
    pub fn game(&self) -> Option<&Game<B>> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut Game<B>> {
        self.game.as_mut()
    }

    /// How many games this session has started.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::board::ClickTarget;
    use crate::domain::random::SeededRandom;

    struct Cells {
        target: Option<usize>,
    }

    impl Board for Cells {
        type Input = ClickTarget;
        fn cell_count(&self) -> usize { 6 }
        fn place_target_at(&mut self, index: usize) { self.target = Some(index); }
        fn remove_target(&mut self) { self.target = None; }
        fn resolve_click(&self, input: &ClickTarget) -> ClickTarget { *input }
    }

    fn new_game(seed: u64) -> Game<Cells> {
        Game::new(Cells { target: None }, &RulesConfig::default(), Box::new(SeededRandom::from_seed(seed)))
            .expect("valid test config")
    }

    #[test]
    fn replace_tears_down_the_previous_game() {
        let mut session = Session::new();
        assert!(session.replace(new_game(1), Duration::ZERO).is_none());
        session.game_mut().unwrap().tick(Duration::ZERO);
        assert!(session.game().unwrap().board().target.is_some());

        let old = session.replace(new_game(2), Duration::from_millis(300)).unwrap();
        assert_eq!(old.pending_timers(), 0);
        assert!(old.board().target.is_none());
        assert!(!old.round_active());

        let live = session.game().unwrap();
        assert_eq!(live.pending_timers(), 1);
        assert_eq!(live.next_spawn_at(), Some(Duration::from_millis(300)));
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn end_keeps_final_score_on_the_returned_game() {
        let mut session = Session::new();
        session.replace(new_game(3), Duration::ZERO);
        let game = session.game_mut().unwrap();
        game.tick(Duration::ZERO);
        let idx = game.current_index().unwrap();
        game.click(&ClickTarget::cell(idx, true), Duration::from_millis(10));

        let ended = session.end().unwrap();
        assert_eq!(ended.hits(), 1);
        assert_eq!(ended.pending_timers(), 0);
        assert!(session.game().is_none());
        assert!(session.end().is_none());
    }
}

/// Events emitted by the game core.
/// The presentation layer consumes these for HUD, overlay and sound.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    TargetSpawned { index: usize },
    TargetHit { index: usize },
    /// The round timed out before the target was clicked.
    TargetEscaped { index: usize },
    ClickMissed { cell: usize },
    ScoreChanged { hits: u32, misses: u32 },
    GameEnded { outcome: Outcome, hits: u32, misses: u32 },
}

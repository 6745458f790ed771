/// Error types.
///
/// The game core only fails at construction time; everything after that is
/// a closed state machine whose "bad" inputs are silent no-ops.

use thiserror::Error;

/// Contract violations detected when building a `Game`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("win threshold must be at least one hit")]
    ZeroWinThreshold,
    #[error("miss limit must be at least one miss")]
    ZeroMaxMisses,
    #[error("spawn interval must be longer than zero")]
    ZeroInterval,
    #[error("the board has no cells to spawn into")]
    EmptyBoard,
}

/// Problems with the merged (file + command line) configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("grid of {rows}x{cols} cells is too large for the terminal board")]
    GridTooLarge { rows: usize, cols: usize },
    #[error("invalid game rules: {source}")]
    Rules {
        #[from]
        source: GameError,
    },
}

/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), then
/// applies command-line overrides on top. Missing files or keys fall back
/// to defaults; the merged result is validated before a game is built.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::{ConfigError, GameError};

/// Largest rows / cols the terminal board will lay out.
pub const MAX_GRID_SIDE: usize = 12;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub rules: RulesConfig,
    pub general: GeneralConfig,
    /// Problems found while loading, reported once logging is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub interval_ms: u64,
    pub win_hits: u32,
    pub max_misses: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneralConfig {
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub frame_ms: u64,
    pub sound: bool,
}

// ── Command line ──

/// Click the goblin before it slips away.
#[derive(Parser, Debug, Default)]
#[command(name = "goblin-whack", version, about)]
pub struct Cli {
    /// Path to a config.toml (skips the usual search)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Grid rows
    #[arg(long)]
    pub rows: Option<usize>,
    /// Grid columns
    #[arg(long)]
    pub cols: Option<usize>,
    /// Milliseconds between goblin appearances
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Hits needed to win
    #[arg(long)]
    pub win_hits: Option<u32>,
    /// Misses allowed before losing
    #[arg(long)]
    pub max_misses: Option<u32>,
    /// Fixed RNG seed for reproducible spawn sequences
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Disable sound effects
    #[arg(long)]
    pub mute: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_cols")]
    cols: usize,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_interval")]
    interval_ms: u64,
    #[serde(default = "default_win_hits")]
    win_hits: u32,
    #[serde(default = "default_max_misses")]
    max_misses: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_sound")]
    sound: bool,
}

// ── Defaults ──

fn default_rows() -> usize { 4 }
fn default_cols() -> usize { 4 }
fn default_interval() -> u64 { 1000 }
fn default_win_hits() -> u32 { 10 }
fn default_max_misses() -> u32 { 5 }
fn default_frame_ms() -> u64 { 16 }   // ~60 fps redraw
fn default_sound() -> bool { true }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { rows: default_rows(), cols: default_cols() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            interval_ms: default_interval(),
            win_hits: default_win_hits(),
            max_misses: default_max_misses(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: None,
            frame_ms: default_frame_ms(),
            sound: default_sound(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        let t = TomlRules::default();
        RulesConfig { interval_ms: t.interval_ms, win_hits: t.win_hits, max_misses: t.max_misses }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Validation ──

impl RulesConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.win_hits == 0 {
            return Err(GameError::ZeroWinThreshold);
        }
        if self.max_misses == 0 {
            return Err(GameError::ZeroMaxMisses);
        }
        if self.interval_ms == 0 {
            return Err(GameError::ZeroInterval);
        }
        Ok(())
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig { rows, cols } = self.grid;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        if rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge { rows, cols });
        }
        self.rules.validate()?;
        Ok(())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`, then apply command-line overrides.
    /// Search order: (1) `--config`, (2) exe directory, (3) CWD, (4) XDG data dir.
    pub fn load(cli: &Cli) -> Self {
        let mut warnings = Vec::new();
        let toml_cfg = match &cli.config {
            Some(path) => load_file(path, &mut warnings).unwrap_or_default(),
            None => load_toml(&candidate_dirs(), &mut warnings),
        };

        let mut cfg = GameConfig::from_toml(toml_cfg);
        cfg.warnings = warnings;
        cfg.apply_overrides(cli);
        cfg
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            grid: GridConfig { rows: t.grid.rows, cols: t.grid.cols },
            rules: RulesConfig {
                interval_ms: t.rules.interval_ms,
                win_hits: t.rules.win_hits,
                max_misses: t.rules.max_misses,
            },
            general: GeneralConfig {
                seed: t.general.seed,
                log_file: t.general.log_file.map(PathBuf::from),
                frame_ms: t.general.frame_ms.max(1),
                sound: t.general.sound,
            },
            warnings: Vec::new(),
        }
    }

    /// Command-line values win over file values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(rows) = cli.rows { self.grid.rows = rows; }
        if let Some(cols) = cli.cols { self.grid.cols = cols; }
        if let Some(ms) = cli.interval_ms { self.rules.interval_ms = ms; }
        if let Some(n) = cli.win_hits { self.rules.win_hits = n; }
        if let Some(n) = cli.max_misses { self.rules.max_misses = n; }
        if cli.seed.is_some() { self.general.seed = cli.seed; }
        if cli.log_file.is_some() { self.general.log_file = cli.log_file.clone(); }
        if cli.mute { self.general.sound = false; }
    }
}

fn parse_toml(text: &str) -> Result<TomlConfig, toml::de::Error> {
    toml::from_str::<TomlConfig>(text)
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/goblin-whack)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/goblin-whack");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return load_file(&path, warnings).unwrap_or_default();
        }
    }
    TomlConfig::default()
}

fn load_file(path: &Path, warnings: &mut Vec<String>) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match parse_toml(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warnings.push(format!("{} parse error: {e}; using default settings", path.display()));
                None
            }
        },
        Err(e) => {
            warnings.push(format!("could not read {}: {e}; using default settings", path.display()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_text(text: &str) -> GameConfig {
        GameConfig::from_toml(parse_toml(text).expect("valid toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = from_text("");
        assert_eq!(cfg.grid, GridConfig { rows: 4, cols: 4 });
        assert_eq!(cfg.rules, RulesConfig { interval_ms: 1000, win_hits: 10, max_misses: 5 });
        assert_eq!(cfg.general.seed, None);
        assert!(cfg.general.sound);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = from_text(
            r#"
            [grid]
            cols = 6

            [rules]
            max_misses = 3

            [general]
            seed = 42
            log_file = "goblin.log"
            "#,
        );
        assert_eq!(cfg.grid, GridConfig { rows: 4, cols: 6 });
        assert_eq!(cfg.rules.max_misses, 3);
        assert_eq!(cfg.rules.win_hits, 10);
        assert_eq!(cfg.general.seed, Some(42));
        assert_eq!(cfg.general.log_file, Some(PathBuf::from("goblin.log")));
    }

    #[test]
    fn malformed_toml_is_rejected_by_the_parser() {
        assert!(parse_toml("[grid\nrows = 4").is_err());
        assert!(parse_toml("[rules]\nwin_hits = \"ten\"").is_err());
    }

    #[test]
    fn unreadable_file_falls_back_with_a_warning() {
        let mut warnings = Vec::new();
        let cfg = load_file(Path::new("/nonexistent/goblin/config.toml"), &mut warnings);
        assert!(cfg.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut cfg = from_text("[rules]\ninterval_ms = 800\n[general]\nseed = 1");
        let cli = Cli {
            rows: Some(3),
            interval_ms: Some(650),
            seed: Some(9),
            mute: true,
            ..Cli::default()
        };
        cfg.apply_overrides(&cli);
        assert_eq!(cfg.grid, GridConfig { rows: 3, cols: 4 });
        assert_eq!(cfg.rules.interval_ms, 650);
        assert_eq!(cfg.general.seed, Some(9));
        assert!(!cfg.general.sound);
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from(["goblin-whack", "--rows", "5", "--win-hits", "3", "--mute"])
            .expect("valid args");
        assert_eq!(cli.rows, Some(5));
        assert_eq!(cli.win_hits, Some(3));
        assert!(cli.mute);
        assert_eq!(cli.cols, None);
    }

    #[test]
    fn validation_rejects_degenerate_settings() {
        let mut cfg = GameConfig::default();
        cfg.grid.rows = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyGrid { rows: 0, cols: 4 }));

        let mut cfg = GameConfig::default();
        cfg.grid.cols = MAX_GRID_SIDE + 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::GridTooLarge { .. })));

        let mut cfg = GameConfig::default();
        cfg.rules.win_hits = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Rules { source: GameError::ZeroWinThreshold })
        );

        let mut cfg = GameConfig::default();
        cfg.rules.interval_ms = 0;
        assert!(cfg.validate().is_err());
    }
}

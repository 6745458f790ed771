/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::KeyCode;
use log::{info, warn, LevelFilter};

use config::{Cli, GameConfig, GeneralConfig};
use domain::random::SeededRandom;
use error::GameError;
use sim::event::{GameEvent, Outcome};
use sim::game::Game;
use sim::session::{Session, SessionClock};
use ui::grid::TerminalBoard;
use ui::input::InputState;
use ui::renderer::{FrameInfo, Renderer};
use ui::sound::{self, SoundEngine};

const MESSAGE_TIME: Duration = Duration::from_millis(900);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GameConfig::load(&cli);

    init_logging(&config.general)?;
    for w in &config.warnings {
        warn!("config: {w}");
    }
    config.validate().context("invalid configuration")?;
    info!("config: {:?} {:?}", config.grid, config.rules);

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = if config.general.sound { SoundEngine::new() } else { None };
    let mut session: Session<TerminalBoard> = Session::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    // Terminal must be restored before anything is printed.
    let final_game = session.end();
    let cleanup = renderer.cleanup();

    result?;
    cleanup.context("terminal cleanup failed")?;

    println!();
    println!("Thanks for playing Goblin Whack!");
    if let Some(game) = final_game {
        println!("Final tally: {} hits, {} misses", game.hits(), game.misses());
    }
    Ok(())
}

fn init_logging(general: &GeneralConfig) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    match &general.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .filter_level(LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            // stderr shares the screen with the game; keep it quiet
            builder.filter_level(LevelFilter::Warn);
        }
    }
    builder.parse_default_env();
    builder.try_init().context("logger init failed")?;
    Ok(())
}

fn new_game(config: &GameConfig) -> Result<Game<TerminalBoard>, GameError> {
    let board = TerminalBoard::new(config.grid.rows, config.grid.cols);
    let rng = Box::new(SeededRandom::new(config.general.seed));
    Game::new(board, &config.rules, rng)
}

/// Short-lived message shown in the message bar.
struct Message {
    text: String,
    expires_at: Duration,
}

impl Message {
    fn new() -> Self {
        Message { text: String::new(), expires_at: Duration::ZERO }
    }

    fn set(&mut self, text: &str, now: Duration, duration: Duration) {
        self.text = text.to_string();
        self.expires_at = now + duration;
    }

    fn tick(&mut self, now: Duration) {
        if !self.text.is_empty() && now >= self.expires_at {
            self.text.clear();
        }
    }
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_NEW_SESSION: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];

fn game_loop(
    session: &mut Session<TerminalBoard>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let clock = SessionClock::new();
    let frame_sleep = Duration::from_millis(config.general.frame_ms);
    let mut input = InputState::new();
    let mut message = Message::new();

    session.replace(new_game(config)?, clock.now());

    loop {
        input.drain_events();
        if input.ctrl_c_pressed() || input.any_pressed(KEYS_QUIT) {
            break;
        }

        let now = clock.now();
        if input.any_pressed(KEYS_NEW_SESSION) {
            session.replace(new_game(config)?, now);
            message.set(&format!("New session #{}", session.generation()), now, MESSAGE_TIME);
        }

        let Some(game) = session.game_mut() else { break };
        let mut events: Vec<GameEvent> = Vec::new();

        if game.is_over() {
            let play_again = input.any_pressed(KEYS_CONFIRM)
                || renderer
                    .play_again_button()
                    .is_some_and(|b| input.clicks().iter().any(|c| b.contains(*c)));
            if play_again {
                events.extend(game.reset(now));
                message.set("Here they come again!", now, MESSAGE_TIME);
            }
        } else {
            for click in input.clicks() {
                events.extend(game.click(click, now));
            }
        }

        events.extend(game.tick(now));

        sound::play_events(sound, &events);
        announce(&events, &mut message, now);
        message.tick(now);

        let info = FrameInfo {
            now,
            message: &message.text,
            pointer: input.pointer,
            button_down: input.button_down,
            sound_on: sound.is_some(),
        };
        renderer.render(game, &info)?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn announce(events: &[GameEvent], message: &mut Message, now: Duration) {
    for event in events {
        let text = match event {
            GameEvent::TargetHit { .. } => "Bonk!",
            GameEvent::TargetEscaped { .. } => "It got away!",
            GameEvent::ClickMissed { .. } => "Missed!",
            GameEvent::GameEnded { outcome: Outcome::Win, .. } => "Victory!",
            GameEvent::GameEnded { outcome: Outcome::Lose, .. } => "Defeat...",
            GameEvent::TargetSpawned { .. } | GameEvent::ScoreChanged { .. } => continue,
        };
        message.set(text, now, MESSAGE_TIME);
    }
}

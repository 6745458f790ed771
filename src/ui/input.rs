/// Input state tracker.
///
/// Collects, per frame:
///   - left-button presses (the only gameplay input)
///   - pointer position and button state, for the hammer cursor
///   - freshly pressed keys, for meta actions (quit, play again, new game)
///
/// Mouse capture must be enabled by the renderer for mouse events to arrive.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use super::grid::MouseClick;

pub struct InputState {
    /// Left-button presses received during the most recent drain.
    clicks: Vec<MouseClick>,

    /// Keys pressed during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_keys: Vec<KeyEvent>,

    /// Last known pointer position (column, row).
    pub pointer: Option<(u16, u16)>,

    /// Left button currently held down.
    pub button_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            clicks: Vec::with_capacity(4),
            fresh_presses: Vec::with_capacity(8),
            raw_keys: Vec::with_capacity(8),
            pointer: None,
            button_down: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before advancing the game.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.handle_event(ev),
                Err(_) => break,
            }
        }
    }

    fn begin_frame(&mut self) {
        self.clicks.clear();
        self.fresh_presses.clear();
        self.raw_keys.clear();
    }

    pub fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => {
                // Release / Repeat only show up with keyboard enhancement; ignore them.
                if key.kind == KeyEventKind::Press {
                    self.raw_keys.push(key);
                    self.fresh_presses.push(key.code);
                }
            }
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                self.pointer = Some((column, row));
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.button_down = true;
                        self.clicks.push(MouseClick { column, row });
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        self.button_down = false;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// Left-button presses since the last drain, oldest first.
    pub fn clicks(&self) -> &[MouseClick] {
        &self.clicks
    }

    /// Was this key freshly pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_keys.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0        HUD (hits / misses / thresholds)
///   rows 2..     the grid, laid out by `TerminalBoard`
///   last-1       message bar
///   last         help bar

use std::io::{self, BufWriter, Write};
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::event::Outcome;
use crate::sim::game::Game;
use super::grid::{GridLayout, MouseClick, TerminalBoard};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 8],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every "empty" terminal cell, so gaps between
    /// rows match the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 28, b: 22 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 8],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position is re-emitted.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut cell = Self::from_char(c, Color::Reset, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Place a 2-column glyph at (x, y).
    fn set_wide(&mut self, x: usize, y: usize, c: char, bg: Color) {
        if x + 1 < self.width {
            self.set(x, y, Cell::from_char_wide(c, bg));
            self.set(x + 1, y, Cell::WIDE_CONT);
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..).zip(s.chars()) {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::from_char(' ', Color::White, bg));
            }
        }
    }
}

// ── Screen regions ──

const HUD_ROW: usize = 0;
const GRID_TOP: usize = 2;
/// HUD + gap above the grid, gap + message + help below.
const RESERVED_ROWS: usize = GRID_TOP + 3;

const HUD_BG: Color = Color::Rgb { r: 30, g: 50, b: 30 };
const CELL_BG: Color = Color::Rgb { r: 70, g: 52, b: 30 };
const CELL_LIVE_BG: Color = Color::Rgb { r: 110, g: 80, b: 40 };
const MODAL_BG: Color = Color::Rgb { r: 35, g: 35, b: 45 };
const BUTTON_BG: Color = Color::Rgb { r: 60, g: 140, b: 60 };

const FUSE_LEN: usize = 10;

const GOBLIN: char = '👺';
const HAMMER: char = '🔨';
const HAMMER_STRIKE: char = '💥';

/// Clickable rectangle in terminal coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ButtonRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl ButtonRect {
    pub fn contains(&self, click: MouseClick) -> bool {
        let (cx, cy) = (click.column as usize, click.row as usize);
        cx >= self.x && cx < self.x + self.w && cy >= self.y && cy < self.y + self.h
    }
}

/// Per-frame presentation state that lives outside the game core.
pub struct FrameInfo<'a> {
    pub now: Duration,
    pub message: &'a str,
    pub pointer: Option<(u16, u16)>,
    pub button_down: bool,
    pub sound_on: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    was_over: bool,
    play_again: Option<ButtonRect>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            was_over: false,
            play_again: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Where the "Play again" button was drawn in the last frame, if shown.
    pub fn play_again_button(&self) -> Option<ButtonRect> {
        self.play_again
    }

    /// Recompute the grid layout for the current terminal size.
    pub fn layout_board(&self, board: &mut TerminalBoard) {
        let area_h = self.term_h.saturating_sub(RESERVED_ROWS);
        let layout = GridLayout::fit(board.rows(), board.cols(), 0, GRID_TOP, self.term_w, area_h);
        board.set_layout(layout);
    }

    pub fn render(&mut self, game: &mut Game<TerminalBoard>, info: &FrameInfo) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.layout_board(game.board_mut());

        // Entering / leaving the game-over modal: clean transition
        if game.is_over() != self.was_over {
            self.back.cells.fill(Cell::INVALID);
            self.was_over = game.is_over();
        }

        self.front.clear();
        self.compose_hud(game, info);
        self.compose_grid(game.board());
        self.compose_bars(game, info);

        self.play_again = None;
        if let Some(outcome) = game.outcome() {
            self.compose_game_over(outcome, game.hits(), game.misses());
        }

        self.compose_cursor(info);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal's own default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Right half of a wide glyph
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, game: &Game<TerminalBoard>, info: &FrameInfo) {
        let hud = format!(
            " GOBLIN WHACK   Hits: {}/{}   Misses: {}/{}   {}",
            game.hits(), game.win_hits(),
            game.misses(), game.max_misses(),
            if info.sound_on { "♪" } else { "" },
        );
        self.front.fill(0, HUD_ROW, self.front.width, 1, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Time left in the current round
        if let (true, Some(due)) = (game.round_active(), game.next_spawn_at()) {
            let filled = fuse_cells(due.saturating_sub(info.now), game.interval());
            let bar: String = (0..FUSE_LEN).map(|i| if i < filled { '▮' } else { '▯' }).collect();
            let x = self.front.width.saturating_sub(FUSE_LEN + 2);
            let fg = if filled * 3 <= FUSE_LEN { Color::Rgb { r: 255, g: 90, b: 60 } } else { Color::Rgb { r: 255, g: 220, b: 50 } };
            self.front.put_str(x, HUD_ROW, &bar, fg, HUD_BG);
        }
    }

    fn compose_grid(&mut self, board: &TerminalBoard) {
        let layout = board.layout();
        for index in 0..board.rows() * board.cols() {
            let (x, y) = board.cell_origin(index);
            let live = board.target() == Some(index);
            let bg = if live { CELL_LIVE_BG } else { CELL_BG };
            self.front.fill(x, y, layout.cell_w, layout.cell_h, bg);

            if live {
                let gx = x + layout.cell_w.saturating_sub(2) / 2;
                let gy = y + layout.cell_h / 2;
                self.front.set_wide(gx, gy, GOBLIN, bg);
            }
        }
    }

    fn compose_bars(&mut self, game: &Game<TerminalBoard>, info: &FrameInfo) {
        let h = self.front.height;
        if h < 2 { return; }

        if !info.message.is_empty() {
            let msg = format!(" ◈ {} ", info.message);
            let bar = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill(0, h - 2, self.front.width, 1, bar);
            self.front.put_str(0, h - 2, &msg, Color::Black, bar);
        }

        let help = if game.is_over() {
            " ENTER / click: Play again   N: New session   Q: Quit"
        } else {
            " Click the goblin!   N: New session   Q / ESC: Quit"
        };
        self.front.put_str(0, h - 1, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_game_over(&mut self, outcome: Outcome, hits: u32, misses: u32) {
        let (title, color) = match outcome {
            Outcome::Win => ("You saved humanity! 🎉", Color::Rgb { r: 80, g: 255, b: 80 }),
            Outcome::Lose => ("The goblins broke free. An age of servitude begins.", Color::Rgb { r: 255, g: 80, b: 80 }),
        };
        let text = format!("Final tally: {hits} hits, {misses} misses.");
        let button = "[ Play again ]";

        let box_w = (title.chars().count().max(text.len()) + 6).min(self.front.width);
        let box_h = 7_usize.min(self.front.height);
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = self.front.height.saturating_sub(box_h) / 2;

        self.front.fill(box_x, box_y, box_w, box_h, MODAL_BG);
        self.front.put_str(box_x + 3, box_y + 1, title, color, MODAL_BG);
        self.front.put_str(box_x + 3, box_y + 3, &text, Color::White, MODAL_BG);

        let bx = box_x + box_w.saturating_sub(button.len()) / 2;
        let by = box_y + 5;
        self.front.put_str(bx, by, button, Color::White, BUTTON_BG);
        self.play_again = Some(ButtonRect { x: bx, y: by, w: button.len(), h: 1 });
    }

    /// Hammer glyph just right of the pointer; struck pose while held.
    fn compose_cursor(&mut self, info: &FrameInfo) {
        if let Some((col, row)) = info.pointer {
            let (x, y) = (col as usize + 1, row as usize);
            let glyph = if info.button_down { HAMMER_STRIKE } else { HAMMER };
            let bg = self.front.get(x, y).bg;
            self.front.set_wide(x, y, glyph, bg);
        }
    }
}

/// How many of the `FUSE_LEN` bar cells stay lit with `remaining` of `interval` left.
fn fuse_cells(remaining: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return 0;
    }
    let frac = remaining.as_secs_f64() / interval.as_secs_f64();
    ((frac * FUSE_LEN as f64).ceil() as usize).min(FUSE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuse_drains_with_the_round() {
        let second = Duration::from_secs(1);
        assert_eq!(fuse_cells(second, second), FUSE_LEN);
        assert_eq!(fuse_cells(Duration::from_millis(450), second), 5);
        assert_eq!(fuse_cells(Duration::ZERO, second), 0);
        assert_eq!(fuse_cells(second * 3, second), FUSE_LEN);
        assert_eq!(fuse_cells(second, Duration::ZERO), 0);
    }

    #[test]
    fn button_rect_hit_test() {
        let b = ButtonRect { x: 10, y: 5, w: 14, h: 1 };
        assert!(b.contains(MouseClick { column: 10, row: 5 }));
        assert!(b.contains(MouseClick { column: 23, row: 5 }));
        assert!(!b.contains(MouseClick { column: 24, row: 5 }));
        assert!(!b.contains(MouseClick { column: 12, row: 6 }));
    }

    #[test]
    fn wide_glyph_writes_continuation() {
        let mut fb = FrameBuffer::new(10, 2);
        fb.set_wide(3, 1, GOBLIN, CELL_BG);
        assert!(fb.get(3, 1).wide);
        assert!(fb.get(4, 1).cont);
        assert_eq!(fb.get(3, 1).as_str(), "👺");

        // no room for the right half: nothing is drawn
        fb.set_wide(9, 0, GOBLIN, CELL_BG);
        assert!(!fb.get(9, 0).wide);
    }

    #[test]
    fn put_str_clips_at_the_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "hits", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).as_str(), "h");
        assert_eq!(fb.get(3, 0).as_str(), "i");
        assert_eq!(fb.get(3, 0).bg, Cell::BASE_BG);
    }
}

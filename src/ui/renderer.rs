/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Puzzles are drawn in board coordinates (`BOARD_W` x `BOARD_H`); the
/// board is centered horizontally below the HUD, and `to_board` maps
/// mouse clicks back through the same offset.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::Cell as MazeCell;
use crate::domain::geom::{Point, Rect, BOARD_H, BOARD_W};
use crate::sim::circuit::LogicGate;
use crate::sim::core_breach::CoreBreach;
use crate::sim::game::{Game, MenuItem, Phase};
use crate::sim::level::{Level, LevelId, Stage};
use crate::sim::maze::Maze;
use crate::sim::memory::MemoryMatch;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells. Using the
    /// same RGB for `Clear` and every cell keeps VTE row gaps invisible.
    const BASE_BG: Color = Color::Rgb { r: 8, g: 12, b: 10 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Write a string horizontally centered on row `y`.
    fn put_center(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Palette ──

const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const DARK_GREEN: Color = Color::Rgb { r: 20, g: 90, b: 30 };
const AMBER: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const RED: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const GREY: Color = Color::Rgb { r: 100, g: 100, b: 100 };
const DIM: Color = Color::Rgb { r: 45, g: 60, b: 50 };
const PANEL_BG: Color = Color::Rgb { r: 20, g: 28, b: 24 };

// ── Layout ──

const HUD_ROW: usize = 0;
const INFO_ROW: usize = 1;
const MAP_ROW: usize = 2;
const FOOTER_ROW: usize = MAP_ROW + BOARD_H as usize + 1;

/// Typewriter speed of the intro banner.
const INTRO_CHARS_PER_SEC: f32 = 140.0;

const BANNER: [&str; 5] = [
    r"  ______   ______  _   _ _____ ____   ____ ___  ____  _____ ",
    r" / ___\ \ / /  _ \| | | | ____|  _ \ / ___/ _ \|  _ \| ____|",
    r"| |    \ V /| |_) | |_| |  _| | |_) | |  | | | | |_) |  _|  ",
    r"| |___  | | |  __/|  _  | |___|  _ <| |__| |_| |  _ <| |___ ",
    r" \____| |_| |_|   |_| |_|_____|_| \_\\____\___/|_| \_\_____|",
];

pub const BANNER_LINES: usize = BANNER.len();

/// Banner lines whose first character has been typed after `elapsed` seconds.
pub fn intro_lines_started(elapsed: f32) -> usize {
    let mut typed = (elapsed.max(0.0) * INTRO_CHARS_PER_SEC) as usize;
    let mut started = 0;
    for line in BANNER {
        if typed == 0 { break; }
        started += 1;
        typed = typed.saturating_sub(line.len());
    }
    started
}

/// HUD clock: plain seconds under a minute, m:ss otherwise.
pub fn format_time(secs: u32) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Needle glyph for an angle (0° = up, clockwise).
fn needle(angle: f32) -> char {
    const ARROWS: [char; 8] = ['↑', '↗', '→', '↘', '↓', '↙', '←', '↖'];
    let sector = ((angle.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    ARROWS[sector]
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Screen column of board x = 0.
    origin_x: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            origin_x: 0,
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
        self.resize(tw as usize, th as usize);
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

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
        self.origin_x = w.saturating_sub(BOARD_W as usize) / 2;
    }

    /// Screen cell → board coordinates (may fall outside the board).
    pub fn to_board(&self, screen: Point) -> Point {
        Point::new(screen.x - self.origin_x as i32, screen.y - MAP_ROW as i32)
    }

    pub fn render(&mut self, game: &Game, fps: f32) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(game.phase()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(game.phase());
        }

        self.front.clear();

        match game.phase() {
            Phase::Intro => self.compose_intro(game.intro_elapsed()),
            Phase::Menu => self.compose_menu(game.menu_cursor()),
            Phase::Playing => {
                self.compose_playing(game);
                if game.paused() {
                    self.compose_pause_overlay();
                }
            }
            Phase::LevelClear => {
                self.compose_playing(game);
                self.compose_level_clear(game);
            }
            Phase::Won => self.compose_won(game),
            Phase::Lost => self.compose_lost(game),
        }

        if game.show_fps() {
            let label = format!(" FPS {:>3.0} ", fps);
            let x = self.front.width.saturating_sub(label.len());
            self.front.put_str(x, HUD_ROW, &label, Color::Black, CYAN);
        }

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

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
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
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Board-space drawing helpers ──

    fn board_set(&mut self, bx: i32, by: i32, ch: char, fg: Color, bg: Color) {
        if bx < 0 || by < 0 || bx >= BOARD_W || by >= BOARD_H {
            return;
        }
        let x = self.origin_x + bx as usize;
        let y = MAP_ROW + by as usize;
        self.front.set(x, y, Cell::new(ch, fg, bg));
    }

    fn board_str(&mut self, bx: i32, by: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.board_set(bx + i as i32, by, ch, fg, bg);
        }
    }

    /// Single-line box with `text` centered on its middle row.
    fn board_box(&mut self, r: Rect, text: &str, fg: Color, bg: Color) {
        let (x0, y0) = (r.x, r.y);
        let (x1, y1) = (r.x + r.w - 1, r.y + r.h - 1);
        for x in x0..=x1 {
            for y in y0..=y1 {
                let ch = match (x == x0, x == x1, y == y0, y == y1) {
                    (true, _, true, _) => '┌',
                    (_, true, true, _) => '┐',
                    (true, _, _, true) => '└',
                    (_, true, _, true) => '┘',
                    (_, _, true, _) | (_, _, _, true) => '─',
                    (true, _, _, _) | (_, true, _, _) => '│',
                    _ => ' ',
                };
                self.board_set(x, y, ch, fg, bg);
            }
        }
        let len = text.chars().count() as i32;
        let tx = r.x + (r.w - len) / 2;
        self.board_str(tx, r.y + r.h / 2, text, fg, bg);
    }

    // ── Intro / menu ──

    fn banner_x(&self) -> usize {
        self.front.width.saturating_sub(BANNER[0].len()) / 2
    }

    fn compose_intro(&mut self, elapsed: f32) {
        let mut typed = (elapsed * INTRO_CHARS_PER_SEC) as usize;
        let bx = self.banner_x();
        for (i, line) in BANNER.iter().enumerate() {
            let n = typed.min(line.len());
            self.front.put_str(bx, 3 + i, &line[..n], GREEN, Color::Reset);
            typed -= n;
        }

        if typed > 0 {
            let tag = "> FOUR LAYERS OF SECURITY. 120 SECONDS EACH. BREACH THE CORE.";
            let n = typed.min(tag.len());
            self.front.put_center(10, &tag[..n], AMBER, Color::Reset);
            if typed > tag.len() && (elapsed * 2.0) as u32 % 2 == 0 {
                self.front.put_center(13, "[ PRESS ENTER ]", GREEN, Color::Reset);
            }
        }
    }

    fn compose_menu(&mut self, cursor: usize) {
        let bx = self.banner_x();
        for (i, line) in BANNER.iter().enumerate() {
            self.front.put_str(bx, 2 + i, line, GREEN, Color::Reset);
        }

        for (i, item) in MenuItem::ALL.iter().enumerate() {
            let (text, fg) = if i == cursor {
                (format!("▸ {} ◂", item.label()), GREEN)
            } else {
                (format!("  {}  ", item.label()), GREY)
            };
            self.front.put_center(10 + i * 2, &text, fg, Color::Reset);
        }

        let help = [
            "↑↓ / WS  Select      ENTER  Confirm",
            "Mouse    Puzzles     ESC    Menu",
            "F1       Pause       F3     FPS",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_center(16 + i, line, DIM, Color::Reset);
        }
    }

    // ── Playing ──

    fn compose_playing(&mut self, game: &Game) {
        let Some(level) = game.level() else { return };
        self.compose_hud(game, level);

        match level.stage() {
            Stage::Maze(m) => self.compose_maze(m),
            Stage::LogicGate(lg) => self.compose_circuit(lg),
            Stage::MemoryMatch(mm) => self.compose_memory(mm),
            Stage::CoreBreach(cb) => self.compose_core(cb),
        }

        let footer = "ESC Menu   F1 Pause   F3 FPS";
        self.front.put_str(self.origin_x, FOOTER_ROW, footer, DIM, Color::Reset);
    }

    fn compose_hud(&mut self, game: &Game, level: &Level) {
        let id = level.id();
        let secs = level.clock().whole_seconds();
        let time_fg = if secs < 60 { RED } else { GREEN };

        let left = format!(" LEVEL {}/{}  {} ", id.index() + 1, LevelId::ALL.len(), id.title());
        self.front.put_str(self.origin_x, HUD_ROW, &left, Color::Black, GREEN);

        let time = format!("TIME {:>5}", format_time(secs));
        let score = format!("SCORE {:<6}", game.score());
        let x = self.origin_x + 34;
        self.front.put_str(x, HUD_ROW, &time, time_fg, Color::Reset);
        self.front.put_str(x + 12, HUD_ROW, &score, AMBER, Color::Reset);

        self.front.put_str(self.origin_x, INFO_ROW, id.instructions(), DIM, Color::Reset);
    }

    fn compose_maze(&mut self, m: &Maze) {
        let ox = (BOARD_W - m.cols() as i32 * 2) / 2;
        let oy = (BOARD_H - m.rows() as i32) / 2;
        let fade = if m.hint_visible() { m.hint_fade() } else { 0.0 };
        let hint_bg = Color::Rgb { r: 0, g: (30.0 + 120.0 * fade) as u8, b: 0 };
        let flash = m.flash();
        let floor_bg = if flash > 0.0 {
            Color::Rgb { r: (40.0 + 160.0 * flash) as u8, g: 10, b: 10 }
        } else {
            PANEL_BG
        };

        for r in 0..m.rows() {
            for c in 0..m.cols() {
                let cell = m.cell_at(r as i32, c as i32);
                let on_hint = fade > 0.0 && m.hint().contains(&(r, c));
                let bg = if on_hint { hint_bg } else { floor_bg };
                // Cosmetic bit pattern on open floor.
                let bit = if (r * 7 + c * 3) % 5 < 2 { "1 " } else { "0 " };
                let (text, fg, bg) = if (r, c) == m.player() {
                    ("@@", Color::Black, GREEN)
                } else {
                    match cell {
                        MazeCell::Wall => ("██", DARK_GREEN, Color::Reset),
                        MazeCell::Goal => ("<>", Color::Black, AMBER),
                        MazeCell::Trap if fade <= 0.0 => ("░░", Color::Rgb { r: 90, g: 25, b: 25 }, bg),
                        MazeCell::Trap | MazeCell::Path => (bit, DIM, bg),
                    }
                };
                self.board_str(ox + c as i32 * 2, oy + r as i32, text, fg, bg);
            }
        }

        if flash > 0.0 {
            self.front.put_str(self.origin_x, INFO_ROW, "TRAP TRIGGERED! Back to start.       ", RED, Color::Reset);
        }
    }

    fn compose_circuit(&mut self, lg: &LogicGate) {
        // Wires first, so boxes draw over their ends.
        for w in lg.wires() {
            let fg = if w.live { GREEN } else { GREY };
            let mid = (w.from.x + w.to.x) / 2;
            for x in w.from.x..mid {
                self.board_set(x, w.from.y, '─', fg, Color::Reset);
            }
            for x in mid + 1..=w.to.x {
                self.board_set(x, w.to.y, '─', fg, Color::Reset);
            }
            let (top, bottom) = (w.from.y.min(w.to.y), w.from.y.max(w.to.y));
            for y in top + 1..bottom {
                self.board_set(mid, y, '│', fg, Color::Reset);
            }
            let (c_from, c_to) = match w.to.y.cmp(&w.from.y) {
                std::cmp::Ordering::Greater => ('┐', '└'),
                std::cmp::Ordering::Less => ('┘', '┌'),
                std::cmp::Ordering::Equal => ('─', '─'),
            };
            self.board_set(mid, w.from.y, c_from, fg, Color::Reset);
            self.board_set(mid, w.to.y, c_to, fg, Color::Reset);
        }

        for s in lg.switches() {
            let fg = if s.value { GREEN } else { GREY };
            let text = format!("{}:{}", s.label, u8::from(s.value));
            self.board_box(s.rect, &text, fg, PANEL_BG);
        }

        for g in lg.gates() {
            let fg = if g.value { CYAN } else { GREY };
            self.board_box(g.rect, g.kind.label(), fg, PANEL_BG);
        }

        let out = lg.output_rect();
        let fg = if lg.output_value() == lg.target() { GREEN } else { RED };
        let text = format!("OUT:{}", u8::from(lg.output_value()));
        self.board_box(out, &text, fg, PANEL_BG);
        let want = format!("WANT {}", u8::from(lg.target()));
        self.board_str(out.x + 1, out.y - 1, &want, AMBER, Color::Reset);
    }

    fn compose_memory(&mut self, mm: &MemoryMatch) {
        for (i, t) in mm.tiles().iter().enumerate() {
            let (text, fg) = if mm.face_up(i) {
                let fg = if t.matched {
                    GREEN
                } else if t.revealed {
                    AMBER
                } else {
                    CYAN
                };
                (t.symbol.as_str(), fg)
            } else {
                ("????", GREY)
            };
            self.board_box(t.rect, text, fg, PANEL_BG);
        }

        if mm.in_preview() {
            self.front.put_str(self.origin_x, INFO_ROW, "MEMORIZE THE DUMP...                 ", AMBER, Color::Reset);
        }
    }

    fn compose_core(&mut self, cb: &CoreBreach) {
        let core = Rect::centered(BOARD_W / 2, 8, 8, 3);
        self.board_box(core, "CORE", RED, PANEL_BG);

        let feedback = cb.feedback();
        for (i, node) in cb.nodes().iter().enumerate() {
            let is_target = cb.target() == Some(i);
            let fg = if cb.node_in_window(i) {
                GREEN
            } else if is_target {
                AMBER
            } else {
                GREY
            };
            let bg = match feedback {
                Some(f) if f.node == i && f.hit => DARK_GREEN,
                Some(f) if f.node == i => Color::Rgb { r: 110, g: 20, b: 20 },
                _ => PANEL_BG,
            };
            let text = format!("{}{}", i + 1, needle(cb.angle(i)));
            self.board_box(node.rect, &text, fg, bg);
            if is_target {
                self.board_set(node.rect.x - 1, node.rect.y + 1, '▶', AMBER, Color::Reset);
            }
        }

        // Sequence strip on the bottom board row.
        let mut x = 1;
        self.board_str(x, BOARD_H - 1, "SEQUENCE", DIM, Color::Reset);
        x += 9;
        for (k, &node) in cb.sequence().iter().enumerate() {
            let fg = match k.cmp(&cb.cursor()) {
                std::cmp::Ordering::Less => GREEN,
                std::cmp::Ordering::Equal => AMBER,
                std::cmp::Ordering::Greater => GREY,
            };
            self.board_str(x, BOARD_H - 1, &format!("[{}]", node + 1), fg, Color::Reset);
            x += 4;
        }
    }

    // ── Overlays and end screens ──

    fn panel(&mut self, lines: &[(&str, Color)]) {
        let w = 40;
        let h = lines.len() as i32 + 2;
        let r = Rect::centered(BOARD_W / 2, BOARD_H / 2, w, h);
        self.board_box(r, "", AMBER, PANEL_BG);
        for (i, (text, fg)) in lines.iter().enumerate() {
            let tx = r.x + (w - text.chars().count() as i32) / 2;
            self.board_str(tx, r.y + 1 + i as i32, text, *fg, PANEL_BG);
        }
    }

    fn compose_level_clear(&mut self, game: &Game) {
        let last = game.level_index() + 1 >= LevelId::ALL.len();
        let title = if last { "CORE BREACHED" } else { "LAYER BREACHED" };
        let bonus = format!("+{} pts", game.last_bonus());
        let next = if last {
            "ENTER to continue".to_string()
        } else {
            format!("Next layer in {:.0}s  (ENTER skips)", game.clear_remaining().ceil())
        };
        self.panel(&[(title, GREEN), ("", GREEN), (bonus.as_str(), AMBER), (next.as_str(), GREY)]);
    }

    fn compose_pause_overlay(&mut self) {
        self.panel(&[("PAUSED", AMBER), ("", AMBER), ("F1  Resume", CYAN), ("ESC Menu", CYAN)]);
    }

    fn compose_won(&mut self, game: &Game) {
        let art = [
            "╔══════════════════════════════════╗",
            "║   ★ SYSTEM COMPROMISED ★         ║",
            "╚══════════════════════════════════╝",
        ];
        for (i, l) in art.iter().enumerate() {
            self.front.put_center(4 + i, l, AMBER, Color::Reset);
        }
        let score = format!("◈ Final Score: {}", game.score());
        self.front.put_center(9, &score, Color::White, Color::Reset);
        self.front.put_center(10, "◈ All four layers breached", GREEN, Color::Reset);
        self.front.put_center(13, "▸ ENTER / ESC: Back to Menu", GREEN, Color::Reset);
    }

    fn compose_lost(&mut self, game: &Game) {
        let art = [
            "╔══════════════════════════════════╗",
            "║   ✕ CONNECTION TRACED ✕          ║",
            "╚══════════════════════════════════╝",
        ];
        for (i, l) in art.iter().enumerate() {
            self.front.put_center(4 + i, l, RED, Color::Reset);
        }
        let id = LevelId::from_index(game.level_index()).unwrap_or(LevelId::Maze);
        let level = format!("◈ Time expired on level {}: {}", game.level_index() + 1, id.title());
        let score = format!("◈ Score: {}", game.score());
        self.front.put_center(9, &level, Color::White, Color::Reset);
        self.front.put_center(10, &score, Color::White, Color::Reset);
        self.front.put_center(13, "▸ ENTER: Retry level", GREEN, Color::Reset);
        self.front.put_center(14, "▸ ESC:   Back to Menu", GREY, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_format() {
        assert_eq!(format_time(120), "2:00");
        assert_eq!(format_time(61), "1:01");
        assert_eq!(format_time(60), "1:00");
        assert_eq!(format_time(59), "59s");
        assert_eq!(format_time(0), "0s");
    }

    #[test]
    fn needle_points_by_octant() {
        assert_eq!(needle(0.0), '↑');
        assert_eq!(needle(350.0), '↑');
        assert_eq!(needle(90.0), '→');
        assert_eq!(needle(180.0), '↓');
        assert_eq!(needle(270.0), '←');
        assert_eq!(needle(44.0), '↗');
    }

    #[test]
    fn intro_typewriter_progress() {
        assert_eq!(intro_lines_started(0.0), 0);
        assert_eq!(intro_lines_started(0.01), 1);
        assert_eq!(intro_lines_started(60.0), BANNER.len());
    }

    #[test]
    fn clicks_map_through_board_origin() {
        let mut r = Renderer::new();
        r.resize(100, 30);
        assert_eq!(r.origin_x, 18);
        assert_eq!(r.to_board(Point::new(18, 2)), Point::new(0, 0));
        assert_eq!(r.to_board(Point::new(50, 10)), Point::new(32, 8));
        assert_eq!(r.to_board(Point::new(0, 0)), Point::new(-18, -2));
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abcd", Color::White, Color::Reset);
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(1, 0).ch, ' ');
    }
}

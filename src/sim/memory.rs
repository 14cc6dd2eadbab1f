/// Level 3: memory match.
///
/// A grid of face-down tiles holding pairs of hex symbols. All faces are
/// shown during a short preview, then hidden. Clicking reveals a tile; a
/// second reveal either locks the pair as matched or, after a brief
/// reveal delay, turns both back over. While the preview runs or a
/// mismatch is pending, clicks are ignored, so at most two unmatched
/// tiles are ever face up.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::MemoryConfig;
use crate::domain::geom::{Point, Rect, BOARD_H, BOARD_W};
use crate::domain::input::InputEvent;
use crate::domain::timer::Countdown;
use super::event::GameEvent;
use super::level::Puzzle;

const TILE_W: i32 = 8;
const TILE_H: i32 = 3;
const GAP_X: i32 = 1;
const GAP_Y: i32 = 1;

#[derive(Clone, Debug)]
pub struct Tile {
    pub symbol: String,
    pub revealed: bool,
    pub matched: bool,
    pub rect: Rect,
}

#[derive(Clone, Debug)]
pub struct MemoryMatch {
    tiles: Vec<Tile>,
    selection: Vec<usize>,
    preview: f32,
    reveal_secs: f32,
    /// Seconds until a mismatched pair is turned back over.
    hide_in: Option<f32>,
    mistakes: u32,
}

/// Symbol for pair `i`: "0x01", "0x02", ...
pub fn pair_symbol(i: usize) -> String {
    format!("0x{:02X}", i + 1)
}

// ── Construction ──

impl MemoryMatch {
    /// Tiles in the given order, laid out row-major and centered on the board.
    pub fn new(symbols: Vec<String>, columns: usize, preview_secs: f32, reveal_secs: f32) -> MemoryMatch {
        let columns = columns.max(1);
        let rows = symbols.len().div_ceil(columns) as i32;
        let cols = columns.min(symbols.len()).max(1) as i32;

        let grid_w = cols * (TILE_W + GAP_X) - GAP_X;
        let grid_h = rows * (TILE_H + GAP_Y) - GAP_Y;
        let ox = ((BOARD_W - grid_w) / 2).max(0);
        let oy = ((BOARD_H - grid_h) / 2).max(0);

        let tiles = symbols
            .into_iter()
            .enumerate()
            .map(|(i, symbol)| {
                let c = (i % columns) as i32;
                let r = (i / columns) as i32;
                Tile {
                    symbol,
                    revealed: false,
                    matched: false,
                    rect: Rect::new(ox + c * (TILE_W + GAP_X), oy + r * (TILE_H + GAP_Y), TILE_W, TILE_H),
                }
            })
            .collect();

        MemoryMatch {
            tiles,
            selection: Vec::with_capacity(2),
            preview: preview_secs.max(0.0),
            reveal_secs: reveal_secs.max(0.0),
            hide_in: None,
            mistakes: 0,
        }
    }

    /// `cfg.pairs` symbol pairs in a random arrangement.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R, cfg: &MemoryConfig) -> MemoryMatch {
        let mut symbols: Vec<String> = (0..cfg.pairs)
            .flat_map(|i| [pair_symbol(i), pair_symbol(i)])
            .collect();
        symbols.shuffle(rng);
        MemoryMatch::new(symbols, cfg.columns, cfg.preview_secs, cfg.reveal_secs)
    }
}

// ── Play ──

impl MemoryMatch {
    /// True while input is locked (preview or pending mismatch).
    pub fn locked(&self) -> bool {
        self.preview > 0.0 || self.hide_in.is_some()
    }

    pub fn tile_at(&self, p: Point) -> Option<usize> {
        self.tiles.iter().position(|t| t.rect.contains(p))
    }

    /// Reveal tile `index` if that is currently allowed.
    pub fn flip(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        if self.locked() || self.selection.len() >= 2 {
            return;
        }
        let Some(tile) = self.tiles.get_mut(index) else { return };
        if tile.matched || tile.revealed {
            return;
        }
        tile.revealed = true;
        self.selection.push(index);
        events.push(GameEvent::TileFlipped { index });

        if let [a, b] = self.selection[..] {
            if self.tiles[a].symbol == self.tiles[b].symbol {
                self.tiles[a].matched = true;
                self.tiles[b].matched = true;
                self.selection.clear();
                events.push(GameEvent::PairMatched { symbol: self.tiles[a].symbol.clone() });
            } else {
                self.mistakes += 1;
                self.hide_in = Some(self.reveal_secs);
                events.push(GameEvent::PairMismatched);
            }
        }
    }

    fn hide_selection(&mut self) {
        for &i in &self.selection {
            self.tiles[i].revealed = false;
        }
        self.selection.clear();
        self.hide_in = None;
    }
}

// ── Queries ──

impl MemoryMatch {
    pub fn tiles(&self) -> &[Tile] { &self.tiles }
    pub fn mistakes(&self) -> u32 { self.mistakes }

    pub fn in_preview(&self) -> bool {
        self.preview > 0.0
    }

    /// Whether tile `i`'s face should be drawn.
    pub fn face_up(&self, i: usize) -> bool {
        self.in_preview() || self.tiles.get(i).is_some_and(|t| t.revealed || t.matched)
    }

    /// Revealed tiles that are not yet matched.
    pub fn open_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.revealed && !t.matched).count()
    }

    pub fn matched_pairs(&self) -> usize {
        self.tiles.iter().filter(|t| t.matched).count() / 2
    }
}

impl Puzzle for MemoryMatch {
    fn handle_input(&mut self, input: &InputEvent, _clock: &mut Countdown, events: &mut Vec<GameEvent>) {
        if let InputEvent::Click(p) = *input {
            if let Some(i) = self.tile_at(p) {
                self.flip(i, events);
            }
        }
    }

    fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.preview = (self.preview - dt).max(0.0);
        if let Some(t) = self.hide_in.as_mut() {
            *t -= dt;
            if *t <= 0.0 {
                self.hide_selection();
            }
        }
    }

    fn is_solved(&self) -> bool {
        !self.tiles.is_empty() && self.tiles.iter().all(|t| t.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn board(symbols: &[&str]) -> MemoryMatch {
        MemoryMatch::new(symbols.iter().map(|s| s.to_string()).collect(), 4, 0.0, 1.0)
    }

    fn click(m: &mut MemoryMatch, i: usize) -> Vec<GameEvent> {
        let mut clock = Countdown::default();
        let mut ev = vec![];
        let p = m.tiles()[i].rect.center();
        m.handle_input(&InputEvent::Click(p), &mut clock, &mut ev);
        ev
    }

    #[test]
    fn matching_pair_locks() {
        let mut m = board(&["0x01", "0x02", "0x01", "0x02"]);
        click(&mut m, 0);
        let ev = click(&mut m, 2);
        assert!(ev.contains(&GameEvent::PairMatched { symbol: "0x01".into() }));
        assert!(m.tiles()[0].matched && m.tiles()[2].matched);
        assert_eq!(m.open_count(), 0);
    }

    #[test]
    fn mismatch_hides_after_delay_and_blocks_clicks() {
        let mut m = board(&["0x01", "0x02", "0x01", "0x02"]);
        click(&mut m, 0);
        let ev = click(&mut m, 1);
        assert!(ev.contains(&GameEvent::PairMismatched));
        assert!(m.locked());

        // Third click while pending is ignored.
        assert!(click(&mut m, 2).is_empty());
        assert_eq!(m.open_count(), 2);

        m.advance(0.5);
        assert_eq!(m.open_count(), 2);
        m.advance(0.6);
        assert_eq!(m.open_count(), 0);
        assert!(!m.locked());
        assert_eq!(m.mistakes(), 1);
    }

    #[test]
    fn clicking_the_same_tile_twice_does_not_pair_it() {
        let mut m = board(&["0x01", "0x01"]);
        click(&mut m, 0);
        assert!(click(&mut m, 0).is_empty());
        assert!(!m.is_solved());
    }

    #[test]
    fn preview_ignores_clicks() {
        let mut m = MemoryMatch::new(vec!["0x01".into(), "0x01".into()], 4, 3.0, 1.0);
        assert!(m.face_up(0));
        assert!(click(&mut m, 0).is_empty());
        m.advance(3.0);
        assert!(!m.face_up(0));
        assert_eq!(click(&mut m, 0), vec![GameEvent::TileFlipped { index: 0 }]);
    }

    #[test]
    fn full_board_of_four_pairs_solves() {
        let mut m = board(&["0x01", "0x02", "0x03", "0x04", "0x04", "0x03", "0x02", "0x01"]);
        for (a, b) in [(0, 7), (1, 6), (2, 5), (3, 4)] {
            click(&mut m, a);
            click(&mut m, b);
        }
        assert!(m.is_solved());
        assert_eq!(m.matched_pairs(), 4);
    }

    #[test]
    fn shuffled_board_has_each_symbol_twice() {
        let cfg = MemoryConfig { pairs: 8, columns: 4, preview_secs: 3.0, reveal_secs: 1.0 };
        let m = MemoryMatch::shuffled(&mut Pcg32::seed_from_u64(9), &cfg);
        assert_eq!(m.tiles().len(), 16);
        for i in 0..8 {
            let sym = pair_symbol(i);
            assert_eq!(m.tiles().iter().filter(|t| t.symbol == sym).count(), 2);
        }
        for t in m.tiles() {
            assert!(t.rect.x >= 0 && t.rect.right() <= BOARD_W);
            assert!(t.rect.y >= 0 && t.rect.y + t.rect.h <= BOARD_H);
        }
    }

    #[test]
    fn never_more_than_two_open() {
        let cfg = MemoryConfig { pairs: 8, columns: 4, preview_secs: 0.0, reveal_secs: 1.0 };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut m = MemoryMatch::shuffled(&mut rng, &cfg);
        for _ in 0..200 {
            let i = rng.random_range(0..16);
            click(&mut m, i);
            assert!(m.open_count() <= 2);
            m.advance(0.3);
        }
    }
}

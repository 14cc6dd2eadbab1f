/// Level 1: maze navigation.
///
/// The player moves one cell per directional press. Walls (and anything
/// outside the grid) block movement, traps send the player back to the
/// start cell, and reaching the goal solves the level.
///
/// ## Layout format (`from_rows`):
///   `#` = Wall   `T` = Trap   `G` = Goal   `S` = Start   `.` = Path
///
/// Generated mazes always have a carved route from the top-left corner to
/// the bottom-right goal; a BFS over that grid yields the hint path that
/// is shown for the first few seconds of the level.

use std::collections::{HashSet, VecDeque};

use rand::Rng;

use crate::config::MazeConfig;
use crate::domain::cell::Cell;
use crate::domain::input::{Dir, InputEvent};
use crate::domain::timer::Countdown;
use super::event::GameEvent;
use super::level::Puzzle;

/// How long the red flash lasts after a trap fires.
const TRAP_FLASH_SECS: f32 = 0.5;
/// Chance that a carving step also opens a side branch.
const BRANCH_CHANCE: f64 = 0.2;
/// Placement attempts per trap before giving up on it.
const TRAP_ATTEMPTS: usize = 50;

pub type Pos = (usize, usize); // (row, col)

#[derive(Clone, Debug)]
pub struct Maze {
    cells: Vec<Vec<Cell>>,
    rows: usize,
    cols: usize,
    start: Pos,
    player: Pos,
    hint: Vec<Pos>,
    hint_secs: f32,
    elapsed: f32,
    flash: f32,
    traps_hit: u32,
}

// ── Construction ──

impl Maze {
    /// Build a maze from a text diagram. Returns `None` for empty,
    /// ragged, or unknown-character layouts, or when no goal exists.
    pub fn from_rows(rows: &[&str]) -> Option<Maze> {
        let height = rows.len();
        let width = rows.first()?.chars().count();
        if width == 0 {
            return None;
        }

        let mut cells = Vec::with_capacity(height);
        let mut start = (0, 0);
        for (r, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return None;
            }
            let mut row = Vec::with_capacity(width);
            for (c, ch) in line.chars().enumerate() {
                if ch == 'S' {
                    start = (r, c);
                }
                row.push(Cell::from_char(ch)?);
            }
            cells.push(row);
        }

        if !cells.iter().flatten().any(|c| c.is_goal()) {
            return None;
        }

        let mut maze = Maze::with_cells(cells, start);
        maze.hint = maze.solution_path();
        Some(maze)
    }

    /// Random square maze with a guaranteed route from (0,0) to the far corner.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, cfg: &MazeConfig) -> Maze {
        let n = cfg.size.max(2);
        let goal = (n - 1, n - 1);
        let density = if cfg.wall_density.is_finite() {
            f64::from(cfg.wall_density.clamp(0.0, 1.0))
        } else {
            0.0
        };

        let mut cells = vec![vec![Cell::Path; n]; n];
        for (r, row) in cells.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let corner = (r, c) == (0, 0) || (r, c) == goal;
                if !corner && rng.random_bool(density) {
                    *cell = Cell::Wall;
                }
            }
        }

        carve_route(&mut cells, rng, goal);
        cells[goal.0][goal.1] = Cell::Goal;

        let mut maze = Maze::with_cells(cells, (0, 0));
        maze.hint_secs = cfg.hint_secs;
        maze.hint = maze.solution_path();
        maze.place_traps(rng, cfg.traps);
        maze
    }

    fn with_cells(cells: Vec<Vec<Cell>>, start: Pos) -> Maze {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        Maze {
            cells,
            rows,
            cols,
            start,
            player: start,
            hint: vec![],
            hint_secs: 0.0,
            elapsed: 0.0,
            flash: 0.0,
            traps_hit: 0,
        }
    }

    /// Scatter traps on open cells that are not on the hint path.
    fn place_traps<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) {
        let mut safe: HashSet<Pos> = self.hint.iter().copied().collect();
        safe.insert(self.start);

        for _ in 0..count {
            for _ in 0..TRAP_ATTEMPTS {
                let r = rng.random_range(0..self.rows);
                let c = rng.random_range(0..self.cols);
                if self.cells[r][c] == Cell::Path && !safe.contains(&(r, c)) {
                    self.cells[r][c] = Cell::Trap;
                    break;
                }
            }
        }
    }
}

/// Monotone random walk (right/down) from the origin to `goal`, clearing
/// every visited cell and occasionally a neighbouring branch cell.
fn carve_route<R: Rng + ?Sized>(cells: &mut [Vec<Cell>], rng: &mut R, goal: Pos) {
    let n = cells.len();
    let mut pos = (0usize, 0usize);
    while pos != goal {
        let go_right = pos.0 == goal.0 || (pos.1 < goal.1 && rng.random_bool(0.5));
        if go_right {
            pos.1 += 1;
        } else {
            pos.0 += 1;
        }
        cells[pos.0][pos.1] = Cell::Path;

        if rng.random_bool(BRANCH_CHANCE) {
            let dir = [Dir::Up, Dir::Down, Dir::Left, Dir::Right][rng.random_range(0..4)];
            let (dr, dc) = dir.delta();
            let br = pos.0 as i32 + dr;
            let bc = pos.1 as i32 + dc;
            if br >= 0 && bc >= 0 && (br as usize) < n && (bc as usize) < n {
                cells[br as usize][bc as usize] = Cell::Path;
            }
        }
    }
}

// ── Queries ──

impl Maze {
    /// Cell at (row, col). Out of bounds = Wall.
    #[inline]
    pub fn cell_at(&self, row: i32, col: i32) -> Cell {
        if row < 0 || col < 0 {
            return Cell::Wall;
        }
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(Cell::Wall)
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn player(&self) -> Pos { self.player }
    pub fn traps_hit(&self) -> u32 { self.traps_hit }
    pub fn hint(&self) -> &[Pos] { &self.hint }

    pub fn hint_visible(&self) -> bool {
        self.elapsed < self.hint_secs
    }

    /// Hint brightness, 1.0 at level start fading to 0.0.
    pub fn hint_fade(&self) -> f32 {
        if self.hint_secs <= 0.0 {
            0.0
        } else {
            (1.0 - self.elapsed / self.hint_secs).clamp(0.0, 1.0)
        }
    }

    /// Trap flash intensity in 0.0..=1.0.
    pub fn flash(&self) -> f32 {
        (self.flash / TRAP_FLASH_SECS).clamp(0.0, 1.0)
    }

    /// Shortest walkable route from the start to the nearest goal,
    /// avoiding traps. Empty when no route exists.
    pub fn solution_path(&self) -> Vec<Pos> {
        let mut prev = vec![vec![None::<Pos>; self.cols]; self.rows];
        let mut seen = vec![vec![false; self.cols]; self.rows];
        let mut queue = VecDeque::new();
        seen[self.start.0][self.start.1] = true;
        queue.push_back(self.start);

        while let Some(cur) = queue.pop_front() {
            if self.cells[cur.0][cur.1].is_goal() {
                let mut path = vec![cur];
                let mut at = cur;
                while let Some(p) = prev[at.0][at.1] {
                    path.push(p);
                    at = p;
                }
                path.reverse();
                return path;
            }
            for dir in [Dir::Right, Dir::Down, Dir::Left, Dir::Up] {
                let (dr, dc) = dir.delta();
                let nr = cur.0 as i32 + dr;
                let nc = cur.1 as i32 + dc;
                let cell = self.cell_at(nr, nc);
                if !cell.is_walkable() || cell.is_trap() {
                    continue;
                }
                let next = (nr as usize, nc as usize);
                if !seen[next.0][next.1] {
                    seen[next.0][next.1] = true;
                    prev[next.0][next.1] = Some(cur);
                    queue.push_back(next);
                }
            }
        }
        vec![]
    }
}

// ── Movement ──

impl Maze {
    /// Attempt one step. Blocked moves leave the player where they are.
    pub fn try_move(&mut self, dir: Dir, events: &mut Vec<GameEvent>) {
        let (dr, dc) = dir.delta();
        let nr = self.player.0 as i32 + dr;
        let nc = self.player.1 as i32 + dc;
        let target = self.cell_at(nr, nc);
        if !target.is_walkable() {
            return;
        }

        let (row, col) = (nr as usize, nc as usize);
        self.player = (row, col);
        events.push(GameEvent::PlayerMoved { row, col });

        if target.is_trap() {
            self.player = self.start;
            self.flash = TRAP_FLASH_SECS;
            self.traps_hit += 1;
            events.push(GameEvent::TrapTriggered { row, col });
        }
    }
}

impl Puzzle for Maze {
    fn handle_input(&mut self, input: &InputEvent, _clock: &mut Countdown, events: &mut Vec<GameEvent>) {
        if let InputEvent::Move(dir) = *input {
            self.try_move(dir, events);
        }
    }

    fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.flash = (self.flash - dt.max(0.0)).max(0.0);
    }

    fn is_solved(&self) -> bool {
        self.cells[self.player.0][self.player.1].is_goal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn step(m: &mut Maze, dir: Dir) -> Vec<GameEvent> {
        let mut ev = vec![];
        m.try_move(dir, &mut ev);
        ev
    }

    #[test]
    fn walls_and_edges_block() {
        let mut m = Maze::from_rows(&[
            "S#.",
            "..G",
        ])
        .unwrap();
        assert!(step(&mut m, Dir::Right).is_empty()); // wall
        assert!(step(&mut m, Dir::Up).is_empty());    // edge
        assert!(step(&mut m, Dir::Left).is_empty());  // edge
        assert_eq!(m.player(), (0, 0));

        step(&mut m, Dir::Down);
        assert_eq!(m.player(), (1, 0));
    }

    #[test]
    fn every_wall_blocks() {
        let m = Maze::from_rows(&[
            ".#.#.",
            "#S#.#",
            ".#.#G",
        ])
        .unwrap();
        for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
            let mut probe = m.clone();
            step(&mut probe, dir);
            assert_eq!(probe.player(), (1, 1), "{dir:?} moved into a wall");
        }
    }

    #[test]
    fn trap_resets_to_start() {
        let mut m = Maze::from_rows(&[
            ".S.T",
            "...G",
        ])
        .unwrap();
        step(&mut m, Dir::Right);
        assert_eq!(m.player(), (0, 2));
        let ev = step(&mut m, Dir::Right);
        assert_eq!(m.player(), (0, 1));
        assert_eq!(m.traps_hit(), 1);
        assert!(m.flash() > 0.0);
        assert!(ev.contains(&GameEvent::TrapTriggered { row: 0, col: 3 }));
    }

    #[test]
    fn goal_solves() {
        let mut m = Maze::from_rows(&["S.G"]).unwrap();
        step(&mut m, Dir::Right);
        assert!(!m.is_solved());
        step(&mut m, Dir::Right);
        assert!(m.is_solved());
    }

    #[test]
    fn hint_avoids_traps() {
        let m = Maze::from_rows(&[
            "S.T",
            "#..",
            "..G",
        ])
        .unwrap();
        let path = m.solution_path();
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(2, 2)));
        assert!(!path.contains(&(0, 2)));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(Maze::from_rows(&[]).is_none());
        assert!(Maze::from_rows(&["S..", ".."]).is_none());
        assert!(Maze::from_rows(&["S.x", "..G"]).is_none());
        assert!(Maze::from_rows(&["S..", "..."]).is_none()); // no goal
    }

    #[test]
    fn generated_maze_is_solvable_and_deterministic() {
        let cfg = MazeConfig { size: 12, wall_density: 0.4, traps: 6, hint_secs: 5.0 };
        for seed in 0..20 {
            let a = Maze::generate(&mut Pcg32::seed_from_u64(seed), &cfg);
            let b = Maze::generate(&mut Pcg32::seed_from_u64(seed), &cfg);
            assert_eq!(a.cells, b.cells);

            let path = a.solution_path();
            assert_eq!(path.first(), Some(&(0, 0)));
            assert_eq!(path.last(), Some(&(11, 11)));
            for &(r, c) in &path {
                assert!(!a.cells[r][c].is_trap());
            }
        }
    }

    #[test]
    fn walking_the_hint_solves_generated_maze() {
        let cfg = MazeConfig { size: 10, wall_density: 0.35, traps: 4, hint_secs: 5.0 };
        let mut m = Maze::generate(&mut Pcg32::seed_from_u64(42), &cfg);
        let path = m.hint().to_vec();
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let dir = match (b.0 as i32 - a.0 as i32, b.1 as i32 - a.1 as i32) {
                (-1, 0) => Dir::Up,
                (1, 0) => Dir::Down,
                (0, -1) => Dir::Left,
                _ => Dir::Right,
            };
            step(&mut m, dir);
            assert_eq!(m.player(), b);
        }
        assert!(m.is_solved());
    }

    #[test]
    fn nan_density_generates_open_maze() {
        let cfg = MazeConfig { size: 8, wall_density: f32::NAN, traps: 0, hint_secs: 1.0 };
        let m = Maze::generate(&mut Pcg32::seed_from_u64(3), &cfg);
        assert!(!m.hint().is_empty());
        assert_eq!(m.hint().last(), Some(&(7, 7)));
    }

    #[test]
    fn hint_fades_out() {
        let cfg = MazeConfig { size: 6, wall_density: 0.0, traps: 0, hint_secs: 2.0 };
        let mut m = Maze::generate(&mut Pcg32::seed_from_u64(1), &cfg);
        assert!(m.hint_visible());
        m.advance(1.0);
        assert!((m.hint_fade() - 0.5).abs() < 1e-6);
        m.advance(1.5);
        assert!(!m.hint_visible());
    }
}

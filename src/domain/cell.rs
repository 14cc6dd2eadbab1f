/// Maze cell types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Path,
    Wall,
    Trap, // walkable, sends the player back to start
    Goal,
}

impl Cell {
    /// Can the player occupy this cell?
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    pub fn is_trap(self) -> bool {
        matches!(self, Cell::Trap)
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Cell::Goal)
    }

    /// Parse a layout character.
    ///
    /// Legend: `#`=Wall  `T`=Trap  `G`=Goal  `.`/` `/`S`=Path
    /// (`S` only marks the start position, the cell itself is Path).
    pub fn from_char(ch: char) -> Option<Cell> {
        match ch {
            '#' => Some(Cell::Wall),
            'T' => Some(Cell::Trap),
            'G' => Some(Cell::Goal),
            '.' | ' ' | 'S' => Some(Cell::Path),
            _ => None,
        }
    }
}

/// Board geometry shared by every puzzle.
///
/// All hit-testing happens in *board coordinates*: terminal cells relative
/// to the top-left corner of the play area. The renderer places the board
/// on screen and translates mouse clicks back into this space, so puzzles
/// never see raw terminal positions.

/// Width of the play area in terminal columns.
pub const BOARD_W: i32 = 64;
/// Height of the play area in terminal rows.
pub const BOARD_H: i32 = 18;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle in board cells. `w`/`h` are inclusive sizes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Rect::new(cx - w / 2, cy - h / 2, w, h)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(2, 3, 4, 2);
        assert!(r.contains(Point::new(2, 3)));
        assert!(r.contains(Point::new(5, 4)));
        assert!(!r.contains(Point::new(6, 4))); // right edge excluded
        assert!(!r.contains(Point::new(2, 5))); // bottom edge excluded
        assert!(!r.contains(Point::new(1, 3)));
    }

    #[test]
    fn centered_rect() {
        let r = Rect::centered(10, 5, 5, 3);
        assert_eq!(r, Rect::new(8, 4, 5, 3));
        assert_eq!(r.center(), Point::new(10, 5));
    }
}

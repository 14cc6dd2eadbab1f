/// Events emitted during a frame update.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // ── Menu ──
    MenuMoved,
    MenuSelected,

    // ── Maze ──
    PlayerMoved { row: usize, col: usize },
    TrapTriggered { row: usize, col: usize },

    // ── Logic gate ──
    InputToggled { index: usize, output: bool },

    // ── Memory match ──
    TileFlipped { index: usize },
    PairMatched { symbol: String },
    PairMismatched,

    // ── Core breach ──
    NodeHit { node: usize },
    NodeMissed { node: usize },

    // ── Level / run outcome ──
    LevelStarted { level: usize },
    LevelCompleted { level: usize },
    LevelFailed { level: usize },
    GameWon,
}

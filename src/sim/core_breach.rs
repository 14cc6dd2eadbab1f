/// Level 4: core breach.
///
/// Security nodes sit on a ring around the core, each with a needle that
/// spins at a constant rate from its own starting phase. The player must
/// click the nodes in the shown order, and each click only counts while
/// that node's needle is inside the target window around 0°. A wrong node
/// or a click outside the window costs time and does not advance the
/// sequence.

use rand::Rng;

use crate::config::CoreConfig;
use crate::domain::geom::{Point, Rect, BOARD_W};
use crate::domain::input::InputEvent;
use crate::domain::timer::Countdown;
use super::event::GameEvent;
use super::level::Puzzle;

const NODE_W: i32 = 5;
const NODE_H: i32 = 3;
const RING_CY: i32 = 8;
const RING_RX: f32 = 26.0;
const RING_RY: f32 = 6.0;
/// How long a hit/miss highlight stays on a node.
const FEEDBACK_SECS: f32 = 0.4;

#[derive(Clone, Copy, Debug)]
pub struct Node {
    pub phase_deg: f32,
    pub speed_deg: f32,
    pub rect: Rect,
}

impl Node {
    /// Needle angle in [0, 360) after `t` seconds.
    pub fn angle_at(&self, t: f32) -> f32 {
        (self.phase_deg + self.speed_deg * t).rem_euclid(360.0)
    }
}

/// Whether `angle` lies within `tolerance` degrees of 0°, either side.
pub fn in_window(angle: f32, tolerance: f32) -> bool {
    let a = angle.rem_euclid(360.0);
    a.min(360.0 - a) <= tolerance
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Feedback {
    pub node: usize,
    pub hit: bool,
}

#[derive(Clone, Debug)]
pub struct CoreBreach {
    nodes: Vec<Node>,
    sequence: Vec<usize>,
    cursor: usize,
    tolerance: f32,
    penalty: f32,
    elapsed: f32,
    feedback: Option<(Feedback, f32)>,
    misses: u32,
}

// ── Construction ──

/// Node boxes evenly spaced on an ellipse, first node at the top.
pub fn ring_layout(count: usize) -> Vec<Rect> {
    let cx = BOARD_W / 2;
    (0..count)
        .map(|i| {
            let a = (i as f32 * 360.0 / count as f32 - 90.0).to_radians();
            let x = cx + (RING_RX * a.cos()).round() as i32;
            let y = RING_CY + (RING_RY * a.sin()).round() as i32;
            Rect::centered(x, y, NODE_W, NODE_H)
        })
        .collect()
}

impl CoreBreach {
    pub fn new(nodes: Vec<Node>, sequence: Vec<usize>, tolerance: f32, penalty: f32) -> CoreBreach {
        CoreBreach {
            nodes,
            sequence,
            cursor: 0,
            tolerance,
            penalty: penalty.max(0.0),
            elapsed: 0.0,
            feedback: None,
            misses: 0,
        }
    }

    /// Ring of `cfg.nodes` with random phases and a random target order.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, cfg: &CoreConfig) -> CoreBreach {
        let nodes = ring_layout(cfg.nodes)
            .into_iter()
            .map(|rect| Node {
                phase_deg: rng.random_range(0.0..360.0),
                speed_deg: cfg.speed_deg,
                rect,
            })
            .collect::<Vec<_>>();

        let mut sequence = Vec::with_capacity(cfg.sequence_len);
        while sequence.len() < cfg.sequence_len && !nodes.is_empty() {
            let pick = rng.random_range(0..nodes.len());
            // Avoid asking for the same node twice in a row.
            if sequence.last() != Some(&pick) || nodes.len() == 1 {
                sequence.push(pick);
            }
        }

        CoreBreach::new(nodes, sequence, cfg.tolerance_deg, cfg.miss_penalty_secs)
    }
}

// ── Play ──

impl CoreBreach {
    pub fn node_at(&self, p: Point) -> Option<usize> {
        self.nodes.iter().position(|n| n.rect.contains(p))
    }

    pub fn node_in_window(&self, node: usize) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| in_window(n.angle_at(self.elapsed), self.tolerance))
    }

    /// Resolve a click on `node`.
    pub fn strike(&mut self, node: usize, clock: &mut Countdown, events: &mut Vec<GameEvent>) {
        let Some(&expected) = self.sequence.get(self.cursor) else { return };
        let hit = node == expected && self.node_in_window(node);
        if hit {
            self.cursor += 1;
            events.push(GameEvent::NodeHit { node });
        } else {
            clock.penalize(self.penalty);
            self.misses += 1;
            events.push(GameEvent::NodeMissed { node });
        }
        self.feedback = Some((Feedback { node, hit }, FEEDBACK_SECS));
    }
}

// ── Queries ──

impl CoreBreach {
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn sequence(&self) -> &[usize] { &self.sequence }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn elapsed(&self) -> f32 { self.elapsed }
    pub fn misses(&self) -> u32 { self.misses }

    pub fn angle(&self, node: usize) -> f32 {
        self.nodes.get(node).map_or(0.0, |n| n.angle_at(self.elapsed))
    }

    /// Node the player should click next.
    pub fn target(&self) -> Option<usize> {
        self.sequence.get(self.cursor).copied()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback.map(|(f, _)| f)
    }
}

impl Puzzle for CoreBreach {
    fn handle_input(&mut self, input: &InputEvent, clock: &mut Countdown, events: &mut Vec<GameEvent>) {
        if let InputEvent::Click(p) = *input {
            if let Some(node) = self.node_at(p) {
                self.strike(node, clock, events);
            }
        }
    }

    fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        if let Some((_, ttl)) = self.feedback.as_mut() {
            *ttl -= dt;
            if *ttl <= 0.0 {
                self.feedback = None;
            }
        }
    }

    fn is_solved(&self) -> bool {
        self.cursor >= self.sequence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geom::BOARD_H;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn two_nodes(phase0: f32, phase1: f32) -> CoreBreach {
        let rects = ring_layout(2);
        let nodes = vec![
            Node { phase_deg: phase0, speed_deg: 90.0, rect: rects[0] },
            Node { phase_deg: phase1, speed_deg: 90.0, rect: rects[1] },
        ];
        CoreBreach::new(nodes, vec![0, 1], 25.0, 5.0)
    }

    fn click(cb: &mut CoreBreach, node: usize, clock: &mut Countdown) -> Vec<GameEvent> {
        let mut ev = vec![];
        let p = cb.nodes()[node].rect.center();
        cb.handle_input(&InputEvent::Click(p), clock, &mut ev);
        ev
    }

    #[test]
    fn window_wraps_around_zero() {
        assert!(in_window(0.0, 25.0));
        assert!(in_window(20.0, 25.0));
        assert!(in_window(340.0, 25.0));
        assert!(in_window(-10.0, 25.0));
        assert!(!in_window(30.0, 25.0));
        assert!(!in_window(180.0, 25.0));
    }

    #[test]
    fn needle_rotates_at_constant_rate() {
        let n = Node { phase_deg: 350.0, speed_deg: 90.0, rect: Rect::new(0, 0, 1, 1) };
        assert!((n.angle_at(0.0) - 350.0).abs() < 1e-3);
        assert!((n.angle_at(1.0) - 80.0).abs() < 1e-3);
        assert!((n.angle_at(4.0) - 350.0).abs() < 1e-3);
    }

    #[test]
    fn correct_node_in_window_advances() {
        let mut cb = two_nodes(0.0, 180.0);
        let mut clock = Countdown::new(120.0);
        let ev = click(&mut cb, 0, &mut clock);
        assert_eq!(ev, vec![GameEvent::NodeHit { node: 0 }]);
        assert_eq!(cb.cursor(), 1);
        assert_eq!(clock.remaining(), 120.0);
    }

    #[test]
    fn out_of_window_costs_time() {
        let mut cb = two_nodes(90.0, 0.0);
        let mut clock = Countdown::new(120.0);
        let ev = click(&mut cb, 0, &mut clock);
        assert_eq!(ev, vec![GameEvent::NodeMissed { node: 0 }]);
        assert_eq!(cb.cursor(), 0);
        assert!((clock.remaining() - 115.0).abs() < 1e-6);
    }

    #[test]
    fn wrong_node_costs_time_even_in_window() {
        let mut cb = two_nodes(180.0, 0.0);
        let mut clock = Countdown::new(120.0);
        click(&mut cb, 1, &mut clock);
        assert_eq!(cb.cursor(), 0);
        assert_eq!(cb.misses(), 1);
        assert_eq!(cb.feedback(), Some(Feedback { node: 1, hit: false }));
    }

    #[test]
    fn empty_space_is_ignored() {
        let mut cb = two_nodes(0.0, 0.0);
        let mut clock = Countdown::new(120.0);
        let mut ev = vec![];
        cb.handle_input(&InputEvent::Click(Point::new(32, 8)), &mut clock, &mut ev);
        assert!(ev.is_empty());
        assert_eq!(clock.remaining(), 120.0);
    }

    #[test]
    fn timed_sequence_solves() {
        // Node 1 reaches 0° two seconds in.
        let mut cb = two_nodes(0.0, 180.0);
        let mut clock = Countdown::new(120.0);
        click(&mut cb, 0, &mut clock);
        cb.advance(2.0);
        click(&mut cb, 1, &mut clock);
        assert!(cb.is_solved());
        assert_eq!(clock.remaining(), 120.0);
    }

    #[test]
    fn ring_fits_on_board_without_overlap() {
        for n in 2..=10 {
            let rects = ring_layout(n);
            for r in &rects {
                assert!(r.x >= 0 && r.right() <= BOARD_W);
                assert!(r.y >= 0 && r.y + r.h <= BOARD_H);
            }
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    assert!(!a.contains(b.center()), "{n} nodes overlap");
                }
            }
        }
    }

    #[test]
    fn random_sequence_has_requested_length() {
        let cfg = CoreConfig {
            nodes: 6,
            sequence_len: 5,
            speed_deg: 90.0,
            tolerance_deg: 25.0,
            miss_penalty_secs: 5.0,
        };
        let cb = CoreBreach::random(&mut Pcg32::seed_from_u64(11), &cfg);
        assert_eq!(cb.nodes().len(), 6);
        assert_eq!(cb.sequence().len(), 5);
        assert!(cb.sequence().iter().all(|&i| i < 6));
        assert!(cb.sequence().windows(2).all(|w| w[0] != w[1]));
    }

    proptest! {
        #[test]
        fn outside_window_never_advances(phase in 0.0f32..360.0, t in 0.0f32..30.0) {
            let mut cb = two_nodes(phase, 0.0);
            cb.advance(t);
            let inside = cb.node_in_window(0);
            let mut clock = Countdown::new(120.0);
            click(&mut cb, 0, &mut clock);
            prop_assert_eq!(cb.cursor() == 1, inside);
        }
    }
}

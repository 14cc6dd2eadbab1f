/// Level 2: logic gate puzzle.
///
/// A small fixed circuit of boolean input switches feeding AND/OR/XOR/
/// NAND/NOT gates into a single output. Clicking a switch toggles it; the
/// circuit is re-evaluated immediately and the level is solved as soon as
/// the output matches its target value. Clicks anywhere else (gates,
/// wires, empty board) do nothing.
///
/// Gates are stored in topological order: a gate may only read switches
/// or gates with a lower index, so a single forward pass evaluates the
/// whole circuit.

use rand::Rng;

use crate::domain::gate::GateKind;
use crate::domain::geom::{Point, Rect};
use crate::domain::input::InputEvent;
use crate::domain::timer::Countdown;
use super::event::GameEvent;
use super::level::Puzzle;

/// Number of built-in circuit layouts.
pub const VARIANTS: usize = 3;

const SWITCH_W: i32 = 5;
const GATE_W: i32 = 8;
const OUTPUT_W: i32 = 7;
const BOX_H: i32 = 3;

/// Where a gate input (or the circuit output) takes its value from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Source {
    Switch(usize),
    Gate(usize),
}

#[derive(Clone, Debug)]
pub struct Switch {
    pub label: char,
    pub value: bool,
    pub rect: Rect,
}

#[derive(Clone, Debug)]
pub struct Gate {
    pub kind: GateKind,
    pub inputs: Vec<Source>,
    pub rect: Rect,
    pub value: bool,
}

/// A drawn connection: from a source's output port to a consumer's input port.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Wire {
    pub from: Point,
    pub to: Point,
    pub live: bool,
}

#[derive(Clone, Debug)]
pub struct LogicGate {
    switches: Vec<Switch>,
    gates: Vec<Gate>,
    output: Source,
    output_rect: Rect,
    target: bool,
    output_value: bool,
    solved: bool,
}

// ── Construction ──

fn switch(label: char, value: bool, y: i32) -> Switch {
    Switch { label, value, rect: Rect::new(1, y, SWITCH_W, BOX_H) }
}

fn gate(kind: GateKind, inputs: &[Source], x: i32, y: i32) -> Gate {
    Gate { kind, inputs: inputs.to_vec(), rect: Rect::new(x, y, GATE_W, BOX_H), value: false }
}

impl LogicGate {
    /// Pick one of the built-in layouts at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> LogicGate {
        LogicGate::variant(rng.random_range(0..VARIANTS))
    }

    /// Built-in layout `index` (wraps modulo `VARIANTS`).
    pub fn variant(index: usize) -> LogicGate {
        use GateKind::*;
        use Source::{Gate as G, Switch as S};

        let index = index % VARIANTS;
        let (switches, gates, output, output_rect) = match index {
            // !(A&B) & ((C|D) ^ !(A&B))
            0 => (
                vec![
                    switch('A', true, 1),
                    switch('B', true, 5),
                    switch('C', true, 9),
                    switch('D', false, 13),
                ],
                vec![
                    gate(And, &[S(0), S(1)], 14, 2),
                    gate(Or, &[S(2), S(3)], 14, 10),
                    gate(Not, &[G(0)], 28, 2),
                    gate(Xor, &[G(1), G(2)], 28, 10),
                    gate(And, &[G(2), G(3)], 42, 6),
                ],
                G(4),
                Rect::new(55, 6, OUTPUT_W, BOX_H),
            ),
            // !(A&B) | !(B&C)
            1 => (
                vec![
                    switch('A', true, 2),
                    switch('B', true, 7),
                    switch('C', true, 12),
                ],
                vec![
                    gate(Nand, &[S(0), S(1)], 16, 3),
                    gate(Nand, &[S(1), S(2)], 16, 10),
                    gate(Or, &[G(0), G(1)], 32, 6),
                ],
                G(2),
                Rect::new(50, 6, OUTPUT_W, BOX_H),
            ),
            // A & (A ^ B ^ C)
            _ => (
                vec![
                    switch('A', false, 2),
                    switch('B', false, 7),
                    switch('C', false, 12),
                ],
                vec![
                    gate(Xor, &[S(0), S(1)], 16, 3),
                    gate(Xor, &[G(0), S(2)], 30, 9),
                    gate(And, &[S(0), G(1)], 44, 5),
                ],
                G(2),
                Rect::new(56, 5, OUTPUT_W, BOX_H),
            ),
        };

        LogicGate::new(switches, gates, output, output_rect, true)
    }

    pub fn new(
        switches: Vec<Switch>,
        gates: Vec<Gate>,
        output: Source,
        output_rect: Rect,
        target: bool,
    ) -> LogicGate {
        debug_assert!(gates.iter().enumerate().all(|(i, g)| {
            g.inputs.iter().all(|s| match *s {
                Source::Switch(j) => j < switches.len(),
                Source::Gate(j) => j < i,
            })
        }));

        let mut circuit = LogicGate {
            switches,
            gates,
            output,
            output_rect,
            target,
            output_value: false,
            solved: false,
        };
        circuit.evaluate();
        circuit
    }
}

// ── Evaluation ──

impl LogicGate {
    fn source_value(&self, source: Source) -> bool {
        match source {
            Source::Switch(i) => self.switches.get(i).is_some_and(|s| s.value),
            Source::Gate(i) => self.gates.get(i).is_some_and(|g| g.value),
        }
    }

    /// Recompute every gate and the output in one forward pass.
    pub fn evaluate(&mut self) {
        let mut buf = Vec::with_capacity(2);
        for i in 0..self.gates.len() {
            buf.clear();
            buf.extend(self.gates[i].inputs.iter().map(|&s| self.source_value(s)));
            self.gates[i].value = self.gates[i].kind.eval(&buf);
        }
        self.output_value = self.source_value(self.output);
    }

    /// Flip switch `index`, re-evaluate, and check the target.
    pub fn toggle(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        let Some(sw) = self.switches.get_mut(index) else { return };
        sw.value = !sw.value;
        self.evaluate();
        events.push(GameEvent::InputToggled { index, output: self.output_value });
        if self.output_value == self.target {
            self.solved = true;
        }
    }

    pub fn switch_at(&self, p: Point) -> Option<usize> {
        self.switches.iter().position(|s| s.rect.contains(p))
    }
}

// ── Queries (for rendering) ──

impl LogicGate {
    pub fn switches(&self) -> &[Switch] { &self.switches }
    pub fn gates(&self) -> &[Gate] { &self.gates }
    pub fn output_rect(&self) -> Rect { self.output_rect }
    pub fn output_value(&self) -> bool { self.output_value }
    pub fn target(&self) -> bool { self.target }

    fn out_port(&self, source: Source) -> Option<Point> {
        let rect = match source {
            Source::Switch(i) => self.switches.get(i)?.rect,
            Source::Gate(i) => self.gates.get(i)?.rect,
        };
        Some(Point::new(rect.right(), rect.y + 1))
    }

    /// Every connection in the circuit, with its current signal level.
    pub fn wires(&self) -> Vec<Wire> {
        let mut wires = Vec::new();
        for g in &self.gates {
            let single = g.inputs.len() == 1;
            for (k, &src) in g.inputs.iter().enumerate() {
                let Some(from) = self.out_port(src) else { continue };
                let dy = if single { 1 } else if k == 0 { 0 } else { BOX_H - 1 };
                let to = Point::new(g.rect.x - 1, g.rect.y + dy);
                wires.push(Wire { from, to, live: self.source_value(src) });
            }
        }
        if let Some(from) = self.out_port(self.output) {
            let to = Point::new(self.output_rect.x - 1, self.output_rect.y + 1);
            wires.push(Wire { from, to, live: self.output_value });
        }
        wires
    }
}

impl Puzzle for LogicGate {
    fn handle_input(&mut self, input: &InputEvent, _clock: &mut Countdown, events: &mut Vec<GameEvent>) {
        if let InputEvent::Click(p) = *input {
            if let Some(i) = self.switch_at(p) {
                self.toggle(i, events);
            }
        }
    }

    fn advance(&mut self, _dt: f32) {}

    fn is_solved(&self) -> bool {
        self.solved
    }
}

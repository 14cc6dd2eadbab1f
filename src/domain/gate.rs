/// Boolean gate kinds and their evaluation rules.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
    Not,
}

impl GateKind {
    /// Evaluate over the given input values.
    ///
    /// AND/OR/XOR/NAND accept any fan-in (XOR = odd parity).
    /// NOT inverts its first input; with no input it yields `false`.
    pub fn eval(self, inputs: &[bool]) -> bool {
        match self {
            GateKind::And => inputs.iter().all(|&v| v),
            GateKind::Or => inputs.iter().any(|&v| v),
            GateKind::Xor => inputs.iter().filter(|&&v| v).count() % 2 == 1,
            GateKind::Nand => !inputs.iter().all(|&v| v),
            GateKind::Not => inputs.first().map_or(false, |&v| !v),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Nand => "NAND",
            GateKind::Not => "NOT",
        }
    }
}

//! Circuit and wire graph.
//!
//! Wires live in one flat arena and refer to their inputs by index.

use crate::gkr_error::GkrError;
use crate::gkr_gate::Gate;

/// Position of a wire in its circuit.
pub type WireId = usize;

#[derive(Clone, Debug)]
pub struct Wire {
    pub gate: Gate,
    /// Empty for input wires.
    pub inputs: Vec<WireId>,
}

impl Wire {
    pub fn input() -> Self {
        Self { gate: Gate::Identity, inputs: Vec::new() }
    }

    pub fn new(gate: Gate, inputs: Vec<WireId>) -> Self {
        Self { gate, inputs }
    }

    pub fn is_input(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Validated wire arena with fan-out metadata.
#[derive(Clone, Debug)]
pub struct Circuit {
    wires: Vec<Wire>,
    unique_outputs: Vec<usize>,
    // one entry per input occurrence, duplicates included
    consumers: Vec<Vec<WireId>>,
}

impl Circuit {
    pub fn new(mut wires: Vec<Wire>) -> Result<Self, GkrError> {
        let len = wires.len();
        for (i, wire) in wires.iter_mut().enumerate() {
            if wire.is_input() {
                wire.gate = Gate::Identity;
                continue;
            }
            if let Some(expected) = wire.gate.arity() {
                if expected != wire.inputs.len() {
                    return Err(GkrError::GateArity { wire: i, expected, actual: wire.inputs.len() });
                }
            }
            for &input in &wire.inputs {
                if input >= len {
                    return Err(GkrError::InputOutOfRange { wire: i, input, len });
                }
                if input == i {
                    return Err(GkrError::SelfReference { wire: i });
                }
            }
        }

        let mut unique_outputs = vec![0usize; len];
        let mut consumers = vec![Vec::new(); len];
        for (i, wire) in wires.iter().enumerate() {
            for (k, &input) in wire.inputs.iter().enumerate() {
                consumers[input].push(i);
                if !wire.inputs[..k].contains(&input) {
                    unique_outputs[input] += 1;
                }
            }
        }

        Ok(Self { wires, unique_outputs, consumers })
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id]
    }

    pub fn gate(&self, id: WireId) -> &Gate {
        &self.wires[id].gate
    }

    pub fn inputs(&self, id: WireId) -> &[WireId] {
        &self.wires[id].inputs
    }

    pub fn is_input(&self, id: WireId) -> bool {
        self.wires[id].is_input()
    }

    /// Wires that no other wire consumes.
    pub fn is_output(&self, id: WireId) -> bool {
        self.unique_outputs[id] == 0
    }

    /// Number of distinct wires consuming `id`.
    pub fn unique_output_count(&self, id: WireId) -> usize {
        self.unique_outputs[id]
    }

    pub(crate) fn consumers(&self, id: WireId) -> &[WireId] {
        &self.consumers[id]
    }

    /// Claims the wire receives during a run: one per distinct consumer, or
    /// the single output claim.
    pub fn claims_num(&self, id: WireId) -> usize {
        if self.is_output(id) {
            1
        } else {
            self.unique_outputs[id]
        }
    }

    /// Input wires with a single claim are checked by direct evaluation.
    pub fn needs_no_proof(&self, id: WireId) -> bool {
        self.is_input(id) && self.claims_num(id) == 1
    }

    /// Inputs of `id` in order of first appearance, duplicates removed.
    pub fn distinct_inputs(&self, id: WireId) -> Vec<WireId> {
        let mut out: Vec<WireId> = Vec::with_capacity(self.wires[id].inputs.len());
        for &input in &self.wires[id].inputs {
            if !out.contains(&input) {
                out.push(input);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_outputs_ignore_duplicate_inputs() {
        // w2 = w0 * w0, w3 = w0 * w1
        let circuit = match Circuit::new(vec![
            Wire::input(),
            Wire::input(),
            Wire::new(Gate::Mul, vec![0, 0]),
            Wire::new(Gate::Mul, vec![0, 1]),
        ]) {
            Ok(c) => c,
            Err(err) => {
                assert!(false, "circuit: {err}");
                return;
            }
        };
        assert_eq!(circuit.unique_output_count(0), 2);
        assert_eq!(circuit.unique_output_count(1), 1);
        assert!(circuit.is_output(2));
        assert!(circuit.is_output(3));
        assert_eq!(circuit.claims_num(0), 2);
        assert_eq!(circuit.claims_num(2), 1);
        assert!(!circuit.needs_no_proof(0));
        assert!(circuit.needs_no_proof(1));
        assert_eq!(circuit.distinct_inputs(2), vec![0]);
        assert_eq!(circuit.consumers(0), &[2, 2, 3]);
    }

    #[test]
    fn test_input_wire_gets_identity_gate() {
        let circuit = match Circuit::new(vec![Wire::new(Gate::Mul, vec![])]) {
            Ok(c) => c,
            Err(err) => {
                assert!(false, "circuit: {err}");
                return;
            }
        };
        assert!(matches!(circuit.gate(0), Gate::Identity));
        assert!(circuit.is_input(0));
        assert!(circuit.is_output(0));
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            Circuit::new(vec![Wire::input(), Wire::new(Gate::Identity, vec![1])]).err(),
            Some(GkrError::SelfReference { wire: 1 })
        );
        assert_eq!(
            Circuit::new(vec![Wire::input(), Wire::new(Gate::Identity, vec![5])]).err(),
            Some(GkrError::InputOutOfRange { wire: 1, input: 5, len: 2 })
        );
        assert_eq!(
            Circuit::new(vec![Wire::input(), Wire::new(Gate::Mul, vec![0])]).err(),
            Some(GkrError::GateArity { wire: 1, expected: 2, actual: 1 })
        );
    }
}

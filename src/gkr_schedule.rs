//! Topological scheduling of circuit wires.
//!
//! Keeps the given order where possible: among ready wires the lowest index
//! is emitted first, so an already sorted circuit is returned unchanged.
//! Worst case O(n²), linear on nearly sorted input.

use crate::gkr_circuit::{Circuit, WireId};
use crate::gkr_error::GkrError;

const DONE: isize = -1;

struct TopSortData<'a> {
    circuit: &'a Circuit,
    // > 0: inputs left before ready, 0: ready, DONE: emitted
    status: Vec<isize>,
    least_ready: usize,
}

impl<'a> TopSortData<'a> {
    fn new(circuit: &'a Circuit) -> Self {
        let status = circuit.wires().iter().map(|w| w.inputs.len() as isize).collect();
        let mut data = Self { circuit, status, least_ready: 0 };
        data.advance();
        data
    }

    fn advance(&mut self) {
        while self.least_ready < self.status.len() && self.status[self.least_ready] != 0 {
            self.least_ready += 1;
        }
    }

    fn mark_done(&mut self, i: WireId) {
        self.status[i] = DONE;
        for &out in self.circuit.consumers(i) {
            self.status[out] -= 1;
            if self.status[out] == 0 && out < self.least_ready {
                self.least_ready = out;
            }
        }
        self.advance();
    }
}

/// Orders wires so that each appears after all of its inputs.
pub fn topological_sort(circuit: &Circuit) -> Result<Vec<WireId>, GkrError> {
    let len = circuit.len();
    let mut data = TopSortData::new(circuit);
    let mut sorted = Vec::with_capacity(len);
    while sorted.len() < len {
        if data.least_ready >= len {
            return Err(GkrError::CyclicCircuit { scheduled: sorted.len(), len });
        }
        let next = data.least_ready;
        sorted.push(next);
        data.mark_done(next);
    }
    Ok(sorted)
}

/// Checks a caller-supplied order: a permutation where inputs precede consumers.
pub fn validate_sorted(circuit: &Circuit, sorted: &[WireId]) -> Result<(), GkrError> {
    if sorted.len() != circuit.len() {
        return Err(GkrError::SortedOrderMismatch { expected: circuit.len(), actual: sorted.len() });
    }
    let mut position = vec![usize::MAX; circuit.len()];
    for (pos, &id) in sorted.iter().enumerate() {
        if id >= circuit.len() || position[id] != usize::MAX {
            return Err(GkrError::InvalidSortedOrder(format!("not a permutation at position {pos}")));
        }
        position[id] = pos;
    }
    for (pos, &id) in sorted.iter().enumerate() {
        if circuit.inputs(id).iter().any(|&input| position[input] > pos) {
            return Err(GkrError::InvalidSortedOrder(format!("wire {id} at position {pos} precedes an input")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gkr_circuit::Wire;
    use crate::gkr_gate::Gate;

    fn circuit(wires: Vec<Wire>) -> Circuit {
        match Circuit::new(wires) {
            Ok(c) => c,
            Err(err) => panic!("circuit: {err}"),
        }
    }

    #[test]
    fn test_sorted_circuit_unchanged() {
        let c = circuit(vec![
            Wire::input(),
            Wire::input(),
            Wire::new(Gate::Mul, vec![0, 1]),
            Wire::new(Gate::Identity, vec![2]),
        ]);
        assert_eq!(topological_sort(&c), Ok(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_reorders_with_lowest_ready_first() {
        // 0 = 3 * 2, 1 = id(0), 2 and 3 inputs
        let c = circuit(vec![
            Wire::new(Gate::Mul, vec![3, 2]),
            Wire::new(Gate::Identity, vec![0]),
            Wire::input(),
            Wire::input(),
        ]);
        let sorted = match topological_sort(&c) {
            Ok(s) => s,
            Err(err) => {
                assert!(false, "sort: {err}");
                return;
            }
        };
        assert_eq!(sorted, vec![2, 3, 0, 1]);
        assert!(validate_sorted(&c, &sorted).is_ok());
    }

    #[test]
    fn test_duplicate_inputs_resolve() {
        let c = circuit(vec![
            Wire::new(Gate::Mul, vec![1, 1]),
            Wire::input(),
        ]);
        assert_eq!(topological_sort(&c), Ok(vec![1, 0]));
    }

    #[test]
    fn test_cycle_detected() {
        let c = circuit(vec![
            Wire::new(Gate::Identity, vec![1]),
            Wire::new(Gate::Identity, vec![0]),
        ]);
        assert_eq!(topological_sort(&c), Err(GkrError::CyclicCircuit { scheduled: 0, len: 2 }));
    }

    #[test]
    fn test_validate_sorted_rejects_bad_orders() {
        let c = circuit(vec![Wire::input(), Wire::new(Gate::Identity, vec![0])]);
        assert!(validate_sorted(&c, &[1, 0]).is_err());
        assert!(validate_sorted(&c, &[0, 0]).is_err());
        assert!(validate_sorted(&c, &[0]).is_err());
        assert!(validate_sorted(&c, &[0, 1]).is_ok());
    }
}

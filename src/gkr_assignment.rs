//! Per-wire values across all parallel instances.

use crate::gkr_circuit::{Circuit, WireId};
use crate::gkr_error::GkrError;
use crate::gkr_schedule::topological_sort;
use crate::multilin::MultiLin;
use crate::Fr;
use ark_ff::Zero;
use rayon::prelude::*;

/// Values of each wire over every instance, indexed by `WireId`.
///
/// Provers need every wire assigned; verifiers only need input and output wires.
#[derive(Clone, Debug, Default)]
pub struct WireAssignment {
    values: Vec<Option<MultiLin>>,
}

impl WireAssignment {
    pub fn new(num_wires: usize) -> Self {
        Self { values: vec![None; num_wires] }
    }

    /// Assignment holding only the given wires.
    pub fn from_wires<I>(num_wires: usize, wires: I) -> Self
    where
        I: IntoIterator<Item = (WireId, Vec<Fr>)>,
    {
        let mut out = Self::new(num_wires);
        for (wire, values) in wires {
            out.set(wire, values);
        }
        out
    }

    pub fn set(&mut self, wire: WireId, values: Vec<Fr>) {
        if wire >= self.values.len() {
            self.values.resize(wire + 1, None);
        }
        self.values[wire] = Some(MultiLin::new(values));
    }

    pub fn get(&self, wire: WireId) -> Option<&MultiLin> {
        self.values.get(wire).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, wire: WireId) -> Option<&mut MultiLin> {
        self.values.get_mut(wire).and_then(Option::as_mut)
    }

    pub fn require(&self, wire: WireId) -> Result<&MultiLin, GkrError> {
        self.get(wire).ok_or(GkrError::MissingAssignment { wire })
    }

    /// Number of wire slots, assigned or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn assigned_count(&self) -> usize {
        self.values.iter().flatten().count()
    }

    /// Length of the first assigned wire.
    pub fn num_instances(&self) -> Result<usize, GkrError> {
        self.values
            .iter()
            .flatten()
            .map(|m| m.len())
            .next()
            .ok_or(GkrError::EmptyAssignment)
    }

    /// `log2` of the instance count, which must be a power of two.
    pub fn num_vars(&self) -> Result<usize, GkrError> {
        let n = self.num_instances()?;
        if !n.is_power_of_two() {
            return Err(GkrError::NonPowerOfTwoInstances(n));
        }
        Ok(n.trailing_zeros() as usize)
    }

    /// Checks shape against `circuit` and returns the common instance count.
    pub fn validate(&self, circuit: &Circuit) -> Result<usize, GkrError> {
        if self.values.len() > circuit.len() {
            return Err(GkrError::AssignmentShape { expected: circuit.len(), actual: self.values.len() });
        }
        let expected = self.num_instances()?;
        for (wire, values) in self.values.iter().enumerate() {
            if let Some(values) = values {
                if values.len() != expected {
                    return Err(GkrError::InstanceCountMismatch { wire, expected, actual: values.len() });
                }
            }
        }
        Ok(expected)
    }

    /// Evaluates every non-input wire from its inputs, in dependency order.
    pub fn complete(&mut self, circuit: &Circuit) -> Result<(), GkrError> {
        let sorted = topological_sort(circuit)?;
        self.complete_sorted(circuit, &sorted)
    }

    pub(crate) fn complete_sorted(&mut self, circuit: &Circuit, sorted: &[WireId]) -> Result<(), GkrError> {
        if self.values.len() < circuit.len() {
            self.values.resize(circuit.len(), None);
        }
        let num_instances = self.validate(circuit)?;
        for &wire in sorted {
            if circuit.is_input(wire) {
                self.require(wire)?;
                continue;
            }
            let inputs: Vec<&MultiLin> = circuit
                .inputs(wire)
                .iter()
                .map(|&input| self.require(input))
                .collect::<Result<_, _>>()?;
            let gate = circuit.gate(wire);
            let evals: Vec<Fr> = (0..num_instances)
                .into_par_iter()
                .map_init(
                    || vec![Fr::zero(); inputs.len()],
                    |ins, k| {
                        for (slot, input) in ins.iter_mut().zip(inputs.iter()) {
                            *slot = input[k];
                        }
                        gate.evaluate(ins)
                    },
                )
                .collect();
            self.values[wire] = Some(MultiLin::new(evals));
        }
        Ok(())
    }
}

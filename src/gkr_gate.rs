//! Gates: low-degree polynomials applied per instance to a wire's inputs.

use crate::Fr;
use ark_ff::{Field, Zero};
use std::fmt;
use std::sync::Arc;

/// A user-supplied gate.
///
/// `evaluate` must be a polynomial in its inputs of total degree at most
/// `degree()`; the round-polynomial buffers are sized from it.
pub trait GateFunction: Send + Sync + fmt::Debug {
    fn evaluate(&self, inputs: &[Fr]) -> Fr;
    fn degree(&self) -> usize;
}

#[derive(Clone, Debug)]
pub enum Gate {
    /// `x0`; assigned to every input wire.
    Identity,
    /// `x0 · x1`
    Mul,
    /// `x0 + x1`
    Add,
    /// One MiMC round `(x0 + x1 + ark)^7`.
    MimcCipher { ark: Fr },
    Custom(Arc<dyn GateFunction>),
}

impl Gate {
    pub fn mimc() -> Self {
        Gate::MimcCipher { ark: Fr::zero() }
    }

    pub fn custom<G: GateFunction + 'static>(gate: G) -> Self {
        Gate::Custom(Arc::new(gate))
    }

    #[inline]
    pub fn evaluate(&self, inputs: &[Fr]) -> Fr {
        match self {
            Gate::Identity => inputs[0],
            Gate::Mul => inputs[0] * inputs[1],
            Gate::Add => inputs[0] + inputs[1],
            Gate::MimcCipher { ark } => {
                let sum = inputs[0] + inputs[1] + ark;
                let sq = sum.square();
                let cube = sq * sum;
                cube.square() * sum
            }
            Gate::Custom(gate) => gate.evaluate(inputs),
        }
    }

    pub fn degree(&self) -> usize {
        match self {
            Gate::Identity | Gate::Add => 1,
            Gate::Mul => 2,
            Gate::MimcCipher { .. } => 7,
            Gate::Custom(gate) => gate.degree(),
        }
    }

    /// Number of inputs a built-in gate reads; `None` for custom gates.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Gate::Identity => Some(1),
            Gate::Mul | Gate::Add | Gate::MimcCipher { .. } => Some(2),
            Gate::Custom(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gate::Identity => "identity",
            Gate::Mul => "mul",
            Gate::Add => "add",
            Gate::MimcCipher { .. } => "mimc",
            Gate::Custom(_) => "custom",
        }
    }
}

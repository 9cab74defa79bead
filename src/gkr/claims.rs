//! Per-wire claim registry.

use super::eq_claims::{EqTimesGateClaims, EqTimesGateLazyClaims};
use crate::gkr_assignment::WireAssignment;
use crate::gkr_circuit::{Circuit, WireId};
use crate::gkr_config::GkrConfig;
use crate::gkr_error::GkrError;
use crate::multilin_pool::MultiLinPool;
use crate::Fr;
use rayon::ThreadPool;

/// Evaluation claims `(x_k, y_k)` gathered on one wire.
#[derive(Clone, Debug, Default)]
pub(crate) struct WireClaims {
    pub points: Vec<Vec<Fr>>,
    pub evaluations: Vec<Fr>,
}

impl WireClaims {
    fn with_capacity(n: usize) -> Self {
        Self { points: Vec::with_capacity(n), evaluations: Vec::with_capacity(n) }
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }
}

/// `None` marks a wire whose claims were consumed; it accepts nothing further.
pub(crate) struct ClaimsManager<'a> {
    claims: Vec<Option<WireClaims>>,
    pub(crate) circuit: &'a Circuit,
    pub(crate) assignment: &'a WireAssignment,
    pub(crate) pool: &'a MultiLinPool,
    pub(crate) config: &'a GkrConfig,
    // dedicated round-polynomial workers; the global rayon pool otherwise
    pub(crate) workers: Option<&'a ThreadPool>,
}

impl<'a> ClaimsManager<'a> {
    pub fn new(
        circuit: &'a Circuit,
        assignment: &'a WireAssignment,
        pool: &'a MultiLinPool,
        config: &'a GkrConfig,
        workers: Option<&'a ThreadPool>,
    ) -> Self {
        let claims = (0..circuit.len())
            .map(|wire| Some(WireClaims::with_capacity(circuit.claims_num(wire))))
            .collect();
        Self { claims, circuit, assignment, pool, config, workers }
    }

    fn entry(&mut self, wire: WireId) -> Result<&mut WireClaims, GkrError> {
        self.claims
            .get_mut(wire)
            .and_then(Option::as_mut)
            .ok_or(GkrError::ClaimConsumed { wire })
    }

    pub fn add(&mut self, wire: WireId, point: Vec<Fr>, evaluation: Fr) -> Result<(), GkrError> {
        let entry = self.entry(wire)?;
        entry.points.push(point);
        entry.evaluations.push(evaluation);
        Ok(())
    }

    /// Moves the accumulated claims out, leaving the entry open but empty.
    pub fn take(&mut self, wire: WireId) -> Result<WireClaims, GkrError> {
        let entry = self.entry(wire)?;
        if entry.len() == 0 {
            return Err(GkrError::MissingClaims { wire });
        }
        Ok(std::mem::take(entry))
    }

    /// Prover claim with one pooled copy of each input's assignment.
    pub fn get_claim<'m>(&'m mut self, wire: WireId) -> Result<EqTimesGateClaims<'m, 'a>, GkrError> {
        let claims = self.take(wire)?;
        let sources: Vec<WireId> = if self.circuit.is_input(wire) {
            vec![wire]
        } else {
            self.circuit.inputs(wire).to_vec()
        };
        let mut preprocessors = Vec::with_capacity(sources.len());
        for source in sources {
            match self.assignment.require(source) {
                Ok(values) => preprocessors.push(self.pool.clone_slice(values)),
                Err(err) => {
                    self.pool.dump_all(preprocessors);
                    return Err(err);
                }
            }
        }
        Ok(EqTimesGateClaims::new(wire, claims, preprocessors, self))
    }

    pub fn get_lazy_claim<'m>(&'m mut self, wire: WireId) -> Result<EqTimesGateLazyClaims<'m, 'a>, GkrError> {
        let claims = self.take(wire)?;
        Ok(EqTimesGateLazyClaims::new(wire, claims, self))
    }

    pub fn delete_claim(&mut self, wire: WireId) {
        if let Some(entry) = self.claims.get_mut(wire) {
            *entry = None;
        }
    }
}

//! Sumcheck instance for one wire: `Σ_h E(h) · gate(P_u0(h), …)` with
//! `E = Σ_k a^k · EQ(x_k, ·)` combining the wire's claims `(x_k, y_k)`.

use super::claims::{ClaimsManager, WireClaims};
use super::round_poly::compute_gj;
use crate::gkr_circuit::WireId;
use crate::gkr_error::GkrError;
use crate::multilin::{eq_in_place, eval_eq, eval_polynomial, fold_in_place};
use crate::sumcheck::{SumcheckClaims, SumcheckLazyClaims};
use crate::Fr;
use ark_ff::{One, Zero};

fn check_points(claims: &WireClaims, vars_num: usize) -> Result<(), GkrError> {
    match claims.points.iter().find(|p| p.len() != vars_num) {
        Some(p) => Err(GkrError::PointLength { expected: vars_num, actual: p.len() }),
        None => Ok(()),
    }
}

/// Prover view: owns pooled copies of the input tables until the final evaluation.
pub(crate) struct EqTimesGateClaims<'m, 'a> {
    wire: WireId,
    claims: WireClaims,
    manager: &'m mut ClaimsManager<'a>,
    // P_u: one table per input occurrence, or the wire itself for input wires
    preprocessors: Vec<Vec<Fr>>,
    eq: Option<Vec<Fr>>,
}

impl<'m, 'a> EqTimesGateClaims<'m, 'a> {
    pub(crate) fn new(
        wire: WireId,
        claims: WireClaims,
        preprocessors: Vec<Vec<Fr>>,
        manager: &'m mut ClaimsManager<'a>,
    ) -> Self {
        Self { wire, claims, manager, preprocessors, eq: None }
    }

    fn round_polynomial(&self) -> Result<Vec<Fr>, GkrError> {
        let eq = self.eq.as_deref().ok_or_else(|| GkrError::MissingClaims { wire: self.wire })?;
        Ok(compute_gj(
            self.manager.circuit.gate(self.wire),
            eq,
            &self.preprocessors,
            self.manager.pool,
            self.manager.config,
            self.manager.workers,
        ))
    }
}

impl SumcheckClaims for EqTimesGateClaims<'_, '_> {
    fn vars_num(&self) -> usize {
        self.claims.points.first().map_or(0, Vec::len)
    }

    fn claims_num(&self) -> usize {
        self.claims.len()
    }

    fn combine(&mut self, a: Fr) -> Result<Vec<Fr>, GkrError> {
        let vars_num = self.vars_num();
        check_points(&self.claims, vars_num)?;
        let len = 1usize << vars_num;
        if let Some(p) = self.preprocessors.iter().find(|p| p.len() != len) {
            return Err(GkrError::InstanceCountMismatch { wire: self.wire, expected: len, actual: p.len() });
        }
        let pool = self.manager.pool;

        let mut eq = pool.make(len);
        eq[0] = Fr::one();
        eq_in_place(&mut eq, &self.claims.points[0]);

        if self.claims.len() > 1 {
            let mut term = pool.make(len);
            let mut a_k = a;
            for (k, point) in self.claims.points.iter().enumerate().skip(1) {
                term[0] = a_k;
                eq_in_place(&mut term, point);
                for (e, t) in eq.iter_mut().zip(term.iter()) {
                    *e += t;
                }
                if k + 1 < self.claims.len() {
                    a_k *= a;
                }
            }
            pool.dump(term);
        }

        if let Some(old) = self.eq.replace(eq) {
            pool.dump(old);
        }
        self.round_polynomial()
    }

    fn next(&mut self, r: Fr) -> Result<Vec<Fr>, GkrError> {
        if let Some(eq) = self.eq.as_mut() {
            fold_in_place(eq, r);
        }
        for p in self.preprocessors.iter_mut() {
            fold_in_place(p, r);
        }
        self.round_polynomial()
    }

    /// Claims each distinct input at `r` and returns those values in order of first appearance.
    fn prove_final_eval(&mut self, r: &[Fr]) -> Result<Vec<Fr>, GkrError> {
        if r.len() != self.vars_num() {
            return Err(GkrError::PointLength { expected: self.vars_num(), actual: r.len() });
        }
        // tables are already single values when there are no variables
        let last = r.last().copied();
        let circuit = self.manager.circuit;
        let pool = self.manager.pool;
        let inputs = circuit.inputs(self.wire);

        let mut evaluations = Vec::with_capacity(inputs.len());
        let mut seen = vec![self.wire];
        let mut preprocessors = std::mem::take(&mut self.preprocessors).into_iter();
        let mut result = Ok(());
        for &input in inputs {
            let Some(mut p) = preprocessors.next() else {
                break;
            };
            if result.is_ok() && !seen.contains(&input) {
                seen.push(input);
                if let Some(last) = last {
                    fold_in_place(&mut p, last);
                }
                evaluations.push(p[0]);
                result = self.manager.add(input, r.to_vec(), p[0]);
            }
            pool.dump(p);
        }
        pool.dump_all(preprocessors);
        if let Some(eq) = self.eq.take() {
            pool.dump(eq);
        }
        result.map(|_| evaluations)
    }
}

impl Drop for EqTimesGateClaims<'_, '_> {
    fn drop(&mut self) {
        let pool = self.manager.pool;
        pool.dump_all(std::mem::take(&mut self.preprocessors));
        if let Some(eq) = self.eq.take() {
            pool.dump(eq);
        }
    }
}

/// Verifier view: claims only, reads the assignment for input wires.
pub(crate) struct EqTimesGateLazyClaims<'m, 'a> {
    wire: WireId,
    claims: WireClaims,
    manager: &'m mut ClaimsManager<'a>,
}

impl<'m, 'a> EqTimesGateLazyClaims<'m, 'a> {
    pub(crate) fn new(wire: WireId, claims: WireClaims, manager: &'m mut ClaimsManager<'a>) -> Self {
        Self { wire, claims, manager }
    }
}

impl SumcheckLazyClaims for EqTimesGateLazyClaims<'_, '_> {
    fn vars_num(&self) -> usize {
        self.claims.points.first().map_or(0, Vec::len)
    }

    fn claims_num(&self) -> usize {
        self.claims.len()
    }

    fn combined_sum(&self, a: Fr) -> Fr {
        eval_polynomial(&self.claims.evaluations, a)
    }

    fn degree(&self, _round: usize) -> usize {
        1 + self.manager.circuit.gate(self.wire).degree()
    }

    fn verify_final_eval(&mut self, r: &[Fr], a: Fr, purported: Fr, proof: &[Fr]) -> Result<(), GkrError> {
        check_points(&self.claims, r.len())?;

        // Σ_k a^k · EQ(x_k, r), Horner from the last claim
        let evaluation = self
            .claims
            .points
            .iter()
            .rev()
            .fold(Fr::zero(), |acc, point| acc * a + eval_eq(point, r));

        let circuit = self.manager.circuit;
        let gate_evaluation = if circuit.is_input(self.wire) {
            if !proof.is_empty() {
                return Err(GkrError::InputEvaluationCount { given: proof.len(), expected: 0 });
            }
            self.manager.assignment.require(self.wire)?.evaluate(r, self.manager.pool)?
        } else {
            let distinct = circuit.distinct_inputs(self.wire);
            if proof.len() != distinct.len() {
                return Err(GkrError::InputEvaluationCount { given: proof.len(), expected: distinct.len() });
            }
            let inputs: Vec<Fr> = circuit
                .inputs(self.wire)
                .iter()
                .map(|input| {
                    let index = distinct.iter().position(|d| d == input).unwrap_or(0);
                    proof[index]
                })
                .collect();
            for (input, value) in distinct.iter().zip(proof) {
                self.manager.add(*input, r.to_vec(), *value)?;
            }
            circuit.gate(self.wire).evaluate(&inputs)
        };

        if evaluation * gate_evaluation == purported {
            Ok(())
        } else {
            Err(GkrError::IncompatibleEvaluations)
        }
    }
}

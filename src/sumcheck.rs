//! Generic non-interactive sumcheck driver.
//!
//! Round polynomials travel as their evaluations at `1..=degree`; the verifier
//! recovers `g_j(0)` from `g_j(0) + g_j(1) = g_{j-1}(r_{j-1})`.

use crate::fiat_shamir::{TranscriptHandle, TranscriptSettings};
use crate::gkr_error::GkrError;
use crate::multilin::interpolate_on_range;
use crate::Fr;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

/// Prover side of a sumcheck instance.
pub trait SumcheckClaims {
    fn vars_num(&self) -> usize;
    fn claims_num(&self) -> usize;
    /// Folds all claims into one with coefficient `a` and returns `g_0`.
    fn combine(&mut self, a: Fr) -> Result<Vec<Fr>, GkrError>;
    /// Fixes the current variable to `r` and returns the next round polynomial.
    fn next(&mut self, r: Fr) -> Result<Vec<Fr>, GkrError>;
    fn prove_final_eval(&mut self, r: &[Fr]) -> Result<Vec<Fr>, GkrError>;
}

/// Verifier side of a sumcheck instance.
pub trait SumcheckLazyClaims {
    fn vars_num(&self) -> usize;
    fn claims_num(&self) -> usize;
    fn combined_sum(&self, a: Fr) -> Fr;
    /// Number of evaluations sent for round `round`.
    fn degree(&self, round: usize) -> usize;
    fn verify_final_eval(&mut self, r: &[Fr], a: Fr, purported: Fr, proof: &[Fr]) -> Result<(), GkrError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumcheckProof {
    #[serde(with = "crate::gkr_proof::fr_vec_vec")]
    pub partial_sum_polys: Vec<Vec<Fr>>,
    #[serde(with = "crate::gkr_proof::fr_vec")]
    pub final_eval_proof: Vec<Fr>,
}

impl SumcheckProof {
    pub fn is_empty(&self) -> bool {
        self.partial_sum_polys.is_empty() && self.final_eval_proof.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.partial_sum_polys.iter().map(Vec::len).sum::<usize>() + self.final_eval_proof.len()
    }
}

/// `{prefix}comb` when there is more than one claim, then `{prefix}pSP.{j}`.
pub fn challenge_names(prefix: &str, claims_num: usize, vars_num: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(vars_num + 1);
    if claims_num >= 2 {
        names.push(format!("{prefix}comb"));
    }
    names.extend((0..vars_num).map(|j| format!("{prefix}pSP.{j}")));
    names
}

struct SumcheckTranscript<'a> {
    transcript: TranscriptHandle<'a>,
    names: std::vec::IntoIter<String>,
}

impl<'a> SumcheckTranscript<'a> {
    fn open(settings: TranscriptSettings<'a>, claims_num: usize, vars_num: usize) -> Result<Self, GkrError> {
        let names = challenge_names(settings.prefix(), claims_num, vars_num);
        let (transcript, _) = settings.open(&names)?;
        Ok(Self { transcript, names: names.into_iter() })
    }

    fn next(&mut self, bindings: &[Fr]) -> Result<Fr, GkrError> {
        let name = self
            .names
            .next()
            .ok_or_else(|| GkrError::ChallengeNotFound("sumcheck challenge list exhausted".to_string()))?;
        self.transcript.next_element(&name, bindings)
    }
}

pub fn prove<C: SumcheckClaims + ?Sized>(
    claims: &mut C,
    settings: TranscriptSettings<'_>,
) -> Result<SumcheckProof, GkrError> {
    let vars_num = claims.vars_num();
    let mut transcript = SumcheckTranscript::open(settings, claims.claims_num(), vars_num)?;

    let a = if claims.claims_num() >= 2 { transcript.next(&[])? } else { Fr::zero() };

    // with no variables the claims go straight to the final evaluation
    let mut partial_sum_polys = Vec::with_capacity(vars_num);
    let mut r = Vec::with_capacity(vars_num);
    if vars_num > 0 {
        partial_sum_polys.push(claims.combine(a)?);
        for j in 0..vars_num {
            let r_j = transcript.next(&partial_sum_polys[j])?;
            r.push(r_j);
            if j + 1 < vars_num {
                partial_sum_polys.push(claims.next(r_j)?);
            }
        }
    }

    let final_eval_proof = claims.prove_final_eval(&r)?;
    Ok(SumcheckProof { partial_sum_polys, final_eval_proof })
}

pub fn verify<C: SumcheckLazyClaims + ?Sized>(
    claims: &mut C,
    proof: &SumcheckProof,
    settings: TranscriptSettings<'_>,
) -> Result<(), GkrError> {
    let vars_num = claims.vars_num();
    if proof.partial_sum_polys.len() != vars_num {
        return Err(GkrError::MalformedProof(format!(
            "{} round polynomials, expected {vars_num}",
            proof.partial_sum_polys.len()
        )));
    }
    let mut transcript = SumcheckTranscript::open(settings, claims.claims_num(), vars_num)?;

    let a = if claims.claims_num() >= 2 { transcript.next(&[])? } else { Fr::zero() };

    let max_degree = (0..vars_num).map(|j| claims.degree(j)).max().unwrap_or(0);
    let mut g_j = vec![Fr::zero(); max_degree + 1];
    // sum of g over the remaining hypercube with the fixed prefix r
    let mut g_j_r = claims.combined_sum(a);
    let mut r = Vec::with_capacity(vars_num);

    for (j, poly) in proof.partial_sum_polys.iter().enumerate() {
        let degree = claims.degree(j);
        if poly.len() != degree || degree == 0 {
            return Err(GkrError::MalformedProof(format!(
                "round {j} polynomial has {} evaluations, expected {degree}",
                poly.len()
            )));
        }
        g_j[0] = g_j_r - poly[0];
        g_j[1..=degree].copy_from_slice(poly);
        let r_j = transcript.next(poly)?;
        r.push(r_j);
        g_j_r = interpolate_on_range(&g_j[..=degree], r_j);
    }

    claims.verify_final_eval(&r, a, g_j_r, &proof.final_eval_proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multilin::MultiLin;
    use crate::multilin_pool::MultiLinPool;

    // Sum of one multilinear polynomial over the hypercube.
    struct SingleMultilinClaim {
        g: MultiLin,
    }

    impl SingleMultilinClaim {
        fn upper_half_sum(&self) -> Vec<Fr> {
            let half = self.g.len() / 2;
            vec![self.g[half..].iter().sum()]
        }
    }

    impl SumcheckClaims for SingleMultilinClaim {
        fn vars_num(&self) -> usize {
            self.g.num_vars()
        }

        fn claims_num(&self) -> usize {
            1
        }

        fn combine(&mut self, _a: Fr) -> Result<Vec<Fr>, GkrError> {
            Ok(self.upper_half_sum())
        }

        fn next(&mut self, r: Fr) -> Result<Vec<Fr>, GkrError> {
            self.g.fold(r);
            Ok(self.upper_half_sum())
        }

        fn prove_final_eval(&mut self, _r: &[Fr]) -> Result<Vec<Fr>, GkrError> {
            Ok(Vec::new())
        }
    }

    struct SingleMultilinLazyClaim {
        g: MultiLin,
        claimed_sum: Fr,
    }

    impl SumcheckLazyClaims for SingleMultilinLazyClaim {
        fn vars_num(&self) -> usize {
            self.g.num_vars()
        }

        fn claims_num(&self) -> usize {
            1
        }

        fn combined_sum(&self, _a: Fr) -> Fr {
            self.claimed_sum
        }

        fn degree(&self, _round: usize) -> usize {
            1
        }

        fn verify_final_eval(&mut self, r: &[Fr], _a: Fr, purported: Fr, _proof: &[Fr]) -> Result<(), GkrError> {
            let pool = MultiLinPool::new(2, self.g.len());
            if self.g.evaluate(r, &pool)? == purported {
                Ok(())
            } else {
                Err(GkrError::IncompatibleEvaluations)
            }
        }
    }

    fn table(values: &[u64]) -> MultiLin {
        MultiLin::new(values.iter().map(|v| Fr::from(*v)).collect())
    }

    fn prove_table(values: &[u64]) -> SumcheckProof {
        let mut claim = SingleMultilinClaim { g: table(values) };
        match prove(&mut claim, TranscriptSettings::new(vec![vec![1]])) {
            Ok(proof) => proof,
            Err(err) => panic!("prove: {err}"),
        }
    }

    fn verify_table(values: &[u64], claimed_sum: u64, proof: &SumcheckProof) -> Result<(), GkrError> {
        let mut lazy = SingleMultilinLazyClaim { g: table(values), claimed_sum: Fr::from(claimed_sum) };
        verify(&mut lazy, proof, TranscriptSettings::new(vec![vec![1]]))
    }

    #[test]
    fn test_single_multilin_sumcheck() {
        for values in [vec![1u64, 2], vec![1, 2, 3, 4], vec![1, 2, 3, 4, 5, 6, 7, 8]] {
            let sum: u64 = values.iter().sum();
            let proof = prove_table(&values);
            assert_eq!(proof.partial_sum_polys.len(), values.len().trailing_zeros() as usize);
            assert!(proof.final_eval_proof.is_empty());
            assert_eq!(verify_table(&values, sum, &proof), Ok(()));
            assert!(verify_table(&values, sum + 1, &proof).is_err(), "wrong sum must be rejected");
        }
    }

    #[test]
    fn test_malformed_round_polynomials() {
        let values = [1u64, 2, 3, 4];
        let mut proof = prove_table(&values);
        proof.partial_sum_polys[1].push(Fr::zero());
        assert!(matches!(verify_table(&values, 10, &proof), Err(GkrError::MalformedProof(_))));

        let mut short = prove_table(&values);
        short.partial_sum_polys.pop();
        assert!(matches!(verify_table(&values, 10, &short), Err(GkrError::MalformedProof(_))));
    }

    #[test]
    fn test_tampered_round_rejected() {
        let values = [3u64, 1, 4, 1, 5, 9, 2, 6];
        let mut proof = prove_table(&values);
        proof.partial_sum_polys[1][0] += Fr::from(1u64);
        assert!(verify_table(&values, 31, &proof).is_err());
    }

    #[test]
    fn test_zero_variables_checks_final_evaluation_only() {
        let proof = prove_table(&[5]);
        assert!(proof.is_empty());
        assert_eq!(verify_table(&[5], 5, &proof), Ok(()));
        assert_eq!(verify_table(&[5], 6, &proof), Err(GkrError::IncompatibleEvaluations));
        assert!(challenge_names("w0.", 1, 0).is_empty());
    }

    #[test]
    fn test_challenge_names() {
        assert_eq!(challenge_names("w1.", 1, 2), vec!["w1.pSP.0", "w1.pSP.1"]);
        assert_eq!(challenge_names("", 2, 1), vec!["comb", "pSP.0"]);
    }
}

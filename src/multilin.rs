//! Multilinear extensions given by their evaluation tables on {0,1}^k.
//!
//! Index convention: the first variable is the most significant bit of the
//! table index, so `fold` fixes the first remaining variable and halves the
//! table, and `expand_eq(q)` writes `EQ(q, h)` at the index whose big-endian bits are `h`.

use crate::gkr_error::GkrError;
use crate::multilin_pool::MultiLinPool;
use crate::Fr;
use ark_ff::{batch_inversion, Field, One, Zero};
use std::ops::{Deref, DerefMut};

/// Evaluation table of a multilinear polynomial in `log2(len)` variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiLin {
    evals: Vec<Fr>,
}

impl MultiLin {
    pub fn new(evals: Vec<Fr>) -> Self {
        Self { evals }
    }

    pub fn into_vec(self) -> Vec<Fr> {
        self.evals
    }

    pub fn num_vars(&self) -> usize {
        self.evals.len().trailing_zeros() as usize
    }

    /// Fixes the first variable to `r`.
    pub fn fold(&mut self, r: Fr) {
        fold_in_place(&mut self.evals, r);
    }

    /// Expands `self[0]` into `self[0] · EQ(q, ·)` over the whole table.
    pub fn expand_eq(&mut self, q: &[Fr]) -> Result<(), GkrError> {
        if self.evals.len() != 1 << q.len() {
            return Err(GkrError::PointLength { expected: self.num_vars(), actual: q.len() });
        }
        eq_in_place(&mut self.evals, q);
        Ok(())
    }

    /// Evaluates at `point` on a pooled copy; `self` is left intact.
    pub fn evaluate(&self, point: &[Fr], pool: &MultiLinPool) -> Result<Fr, GkrError> {
        evaluate_slice(&self.evals, point, pool)
    }
}

impl From<Vec<Fr>> for MultiLin {
    fn from(evals: Vec<Fr>) -> Self {
        Self { evals }
    }
}

impl Deref for MultiLin {
    type Target = [Fr];

    fn deref(&self) -> &[Fr] {
        &self.evals
    }
}

impl DerefMut for MultiLin {
    fn deref_mut(&mut self) -> &mut [Fr] {
        &mut self.evals
    }
}

pub(crate) fn fold_in_place(m: &mut Vec<Fr>, r: Fr) {
    let mid = m.len() / 2;
    let (bottom, top) = m.split_at_mut(mid);
    for (b, t) in bottom.iter_mut().zip(top.iter()) {
        *b += r * (*t - *b);
    }
    m.truncate(mid);
}

pub(crate) fn eq_in_place(m: &mut [Fr], q: &[Fr]) {
    let n = q.len();
    // after step i, m[b₁…bᵢ₊₁ 0…0] = m[0]·EQ(q₁…qᵢ₊₁, b₁…bᵢ₊₁)
    for (i, q_i) in q.iter().enumerate() {
        for j in 0..(1usize << i) {
            let j0 = j << (n - i);
            let j1 = j0 + (1 << (n - 1 - i));
            m[j1] = *q_i * m[j0];
            let hi = m[j1];
            m[j0] -= hi;
        }
    }
}

pub(crate) fn evaluate_slice(evals: &[Fr], point: &[Fr], pool: &MultiLinPool) -> Result<Fr, GkrError> {
    if evals.len() != 1 << point.len() {
        return Err(GkrError::PointLength {
            expected: evals.len().trailing_zeros() as usize,
            actual: point.len(),
        });
    }
    let mut scratch = pool.clone_slice(evals);
    for r in point {
        fold_in_place(&mut scratch, *r);
    }
    let out = scratch[0];
    pool.dump(scratch);
    Ok(out)
}

/// `EQ(q, p) = Π (qᵢpᵢ + (1 − qᵢ)(1 − pᵢ))`.
pub fn eval_eq(q: &[Fr], p: &[Fr]) -> Fr {
    q.iter().zip(p.iter()).fold(Fr::one(), |acc, (q_i, p_i)| {
        let qp = *q_i * p_i;
        // qp + (1 - q - p + qp)
        acc * (qp.double() + Fr::one() - q_i - p_i)
    })
}

/// Horner evaluation of `Σ coeffs[i] xⁱ`.
pub fn eval_polynomial(coeffs: &[Fr], x: Fr) -> Fr {
    coeffs.iter().rev().fold(Fr::zero(), |acc, c| acc * x + c)
}

/// Evaluates at `x` the polynomial of degree < `values.len()` through
/// `(i, values[i])` for `i = 0..values.len()`.
pub fn interpolate_on_range(values: &[Fr], x: Fr) -> Fr {
    let n = values.len();
    if n == 0 {
        return Fr::zero();
    }
    let nodes: Vec<Fr> = (0..n as u64).map(Fr::from).collect();

    // prefix[i] = Π_{j<i} (x - j), suffix[i] = Π_{j>i} (x - j)
    let mut prefix = vec![Fr::one(); n];
    for i in 1..n {
        prefix[i] = prefix[i - 1] * (x - nodes[i - 1]);
    }
    let mut suffix = vec![Fr::one(); n];
    for i in (0..n - 1).rev() {
        suffix[i] = suffix[i + 1] * (x - nodes[i + 1]);
    }

    // Π_{j≠i} (i - j) = i! · (−1)^{n−1−i} · (n−1−i)!
    let mut factorial = vec![Fr::one(); n];
    for i in 1..n {
        factorial[i] = factorial[i - 1] * nodes[i];
    }
    let mut denominators: Vec<Fr> = (0..n)
        .map(|i| {
            let d = factorial[i] * factorial[n - 1 - i];
            if (n - 1 - i) % 2 == 1 { -d } else { d }
        })
        .collect();
    batch_inversion(&mut denominators);

    values
        .iter()
        .zip(denominators.iter())
        .enumerate()
        .fold(Fr::zero(), |acc, (i, (v, inv))| acc + *v * prefix[i] * suffix[i] * inv)
}

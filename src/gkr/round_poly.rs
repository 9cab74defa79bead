//! Round-polynomial evaluation for `E(h) · gate(P_u0(h), …)`.
//!
//! Every table is linear in the current variable `X`, so for each hypercube
//! row `i` the value at `X = d + 1` is reached from the value at `X = d` by
//! adding `step[i] = f(1, i) − f(0, i)`. Rows are stored index-major as
//! `[E, P_u0, P_u1, …]` and split into jobs of `job_size` rows. Each degree
//! point is a full parallel reduction; the next point starts only after the
//! previous one has updated every row.

use crate::gkr_config::GkrConfig;
use crate::gkr_gate::Gate;
use crate::multilin_pool::MultiLinPool;
use crate::Fr;
use ark_ff::Zero;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{trace, warn};

/// Dedicated pool of `workers` threads for one run; `None` falls back to the global pool.
pub(crate) fn build_workers(workers: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("gkr-sumcheck-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(workers, %err, "sumcheck pool build failed, using the global rayon pool");
            None
        }
    }
}

/// Sums `gate(row inputs) · E` over `val`, then advances each row by `step`
/// when `advance` is set.
#[inline]
fn accumulate_rows(gate: &Gate, val: &mut [Fr], step: &[Fr], width: usize, inputs: &mut [Fr], advance: bool) -> Fr {
    let mut acc = Fr::zero();
    for (row, delta) in val.chunks_exact_mut(width).zip(step.chunks_exact(width)) {
        inputs.copy_from_slice(&row[1..]);
        acc += gate.evaluate(inputs) * row[0];
        if advance {
            for (x, dx) in row.iter_mut().zip(delta) {
                *x += dx;
            }
        }
    }
    acc
}

/// Evaluations of the current round polynomial at `1..=1 + gate.degree()`.
pub(crate) fn compute_gj(
    gate: &Gate,
    eq: &[Fr],
    preprocessors: &[Vec<Fr>],
    pool: &MultiLinPool,
    config: &GkrConfig,
    workers: Option<&ThreadPool>,
) -> Vec<Fr> {
    let half = eq.len() / 2;
    let width = 1 + preprocessors.len();
    let degree = 1 + gate.degree();

    let mut val = pool.make(half * width);
    let mut step = pool.make(half * width);
    for i in 0..half {
        let row = i * width;
        val[row] = eq[half + i];
        step[row] = eq[half + i] - eq[i];
        for (u, p) in preprocessors.iter().enumerate() {
            val[row + 1 + u] = p[half + i];
            step[row + 1 + u] = p[half + i] - p[i];
        }
    }

    let job_rows = config.job_size.max(1);
    let jobs = half.div_ceil(job_rows);
    let mut gj = vec![Fr::zero(); degree];

    if config.parallel && jobs > 1 {
        trace!(rows = half, job_rows, jobs, degree, "round polynomial jobs");
        let chunk = job_rows * width;
        let mut run = || {
            for (d, slot) in gj.iter_mut().enumerate() {
                let advance = d + 1 < degree;
                *slot = val
                    .par_chunks_mut(chunk)
                    .zip(step.par_chunks(chunk))
                    .map_init(
                        || vec![Fr::zero(); width - 1],
                        |inputs, (v, s)| accumulate_rows(gate, v, s, width, inputs, advance),
                    )
                    .reduce(Fr::zero, |a, b| a + b);
            }
        };
        match workers {
            Some(workers) => workers.install(run),
            None => run(),
        }
    } else {
        let mut inputs = vec![Fr::zero(); width - 1];
        for (d, slot) in gj.iter_mut().enumerate() {
            *slot = accumulate_rows(gate, &mut val, &step, width, &mut inputs, d + 1 < degree);
        }
    }

    pool.dump(val);
    pool.dump(step);
    gj
}

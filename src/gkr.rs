//! GKR prover and verifier.
//!
//! Walks the wires from outputs to inputs. Output wires are claimed at a
//! transcript-derived point; each wire's claims are reduced by one sumcheck
//! to claims on its inputs at the sumcheck's final point. Input wires with a
//! single claim are checked by direct evaluation instead.

mod claims;
mod eq_claims;
mod round_poly;


use crate::fiat_shamir::{fr_from_challenge, fr_to_bytes, Transcript, TranscriptSettings};
use crate::gkr_assignment::WireAssignment;
use crate::gkr_circuit::{Circuit, WireId};
use crate::gkr_config::GkrConfig;
use crate::gkr_error::{wrap_wire, GkrError};
use crate::gkr_proof::Proof;
use crate::gkr_schedule::{topological_sort, validate_sorted};
use crate::multilin_pool::MultiLinPool;
use crate::sumcheck::{self, SumcheckProof};
use crate::Fr;
use claims::ClaimsManager;
use rayon::ThreadPool;
use round_poly::build_workers;
use tracing::{debug, debug_span};

/// Optional inputs to `prove` and `verify`.
#[derive(Clone, Debug, Default)]
pub struct GkrOptions<'p> {
    /// Scratch pool to draw from; a private one is built otherwise.
    pub pool: Option<&'p MultiLinPool>,
    /// Precomputed topological order; validated before use.
    pub sorted: Option<Vec<WireId>>,
    /// Prover tuning; `GkrConfig::global()` otherwise.
    pub config: Option<GkrConfig>,
    /// Round-polynomial workers. Without one, `config.max_workers` builds a
    /// pool that lives for a single `prove` call.
    pub workers: Option<&'p ThreadPool>,
}

impl<'p> GkrOptions<'p> {
    pub fn with_pool(mut self, pool: &'p MultiLinPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_sorted(mut self, sorted: Vec<WireId>) -> Self {
        self.sorted = Some(sorted);
        self
    }

    pub fn with_config(mut self, config: GkrConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_workers(mut self, workers: &'p ThreadPool) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Names of every challenge a run draws, in drawing order.
pub fn challenge_names(circuit: &Circuit, sorted: &[WireId], log_instances: usize, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = first_challenge_names(log_instances, prefix);
    for (i, &wire) in sorted.iter().enumerate().rev() {
        if circuit.needs_no_proof(wire) {
            continue;
        }
        names.extend(sumcheck::challenge_names(
            &format!("{prefix}w{i}."),
            circuit.claims_num(wire),
            log_instances,
        ));
    }
    names
}

fn first_challenge_names(log_instances: usize, prefix: &str) -> Vec<String> {
    (0..log_instances).map(|j| format!("{prefix}fC.{j}")).collect()
}

/// Field elements in a proof for `2^log_instances` instances.
pub fn proof_size(circuit: &Circuit, log_instances: usize) -> usize {
    (0..circuit.len())
        .map(|wire| {
            // each distinct consumer receives this wire's value in its final evaluation
            let final_evals = circuit.unique_output_count(wire);
            let rounds = if circuit.needs_no_proof(wire) {
                0
            } else {
                (circuit.gate(wire).degree() + 1) * log_instances
            };
            final_evals + rounds
        })
        .sum()
}

struct Setup {
    sorted: Vec<WireId>,
    num_instances: usize,
    vars_num: usize,
    config: GkrConfig,
}

fn setup(circuit: &Circuit, assignment: &WireAssignment, options: &GkrOptions<'_>) -> Result<Setup, GkrError> {
    let num_instances = assignment.validate(circuit)?;
    if !num_instances.is_power_of_two() {
        return Err(GkrError::NonPowerOfTwoInstances(num_instances));
    }
    let vars_num = num_instances.trailing_zeros() as usize;

    let sorted = match &options.sorted {
        Some(sorted) => {
            validate_sorted(circuit, sorted)?;
            sorted.clone()
        }
        None => topological_sort(circuit)?,
    };
    let config = match &options.config {
        Some(config) => config.clone(),
        None => GkrConfig::global()?.clone(),
    };
    debug!(wires = circuit.len(), num_instances, vars_num, job_size = config.job_size, "gkr setup");
    Ok(Setup { sorted, num_instances, vars_num, config })
}

fn first_challenge(transcript: &mut Transcript, prefix: &str, vars_num: usize) -> Result<Vec<Fr>, GkrError> {
    first_challenge_names(vars_num, prefix)
        .iter()
        .map(|name| transcript.compute_challenge(name).map(fr_from_challenge))
        .collect()
}

fn base_challenges(final_eval_proof: &[Fr]) -> Vec<Vec<u8>> {
    final_eval_proof.iter().map(|x| fr_to_bytes(x).to_vec()).collect()
}

/// Proves that `assignment` is consistent with `circuit` on every instance.
///
/// Every wire must be assigned; see `WireAssignment::complete`.
pub fn prove(
    circuit: &Circuit,
    assignment: &WireAssignment,
    settings: TranscriptSettings<'_>,
    options: &GkrOptions<'_>,
) -> Result<Proof, GkrError> {
    let span = debug_span!("gkr_prove", wires = circuit.len());
    let _enter = span.enter();

    let Setup { sorted, num_instances, vars_num, config } = setup(circuit, assignment, options)?;
    for wire in 0..circuit.len() {
        assignment.require(wire)?;
    }
    let owned_pool;
    let pool = match options.pool {
        Some(pool) => pool,
        None => {
            owned_pool = MultiLinPool::new(config.pool_capacity, num_instances);
            &owned_pool
        }
    };

    let owned_workers;
    let workers = match options.workers {
        Some(workers) => Some(workers),
        None => {
            owned_workers = match config.max_workers {
                Some(n) if config.parallel => build_workers(n),
                _ => None,
            };
            owned_workers.as_ref()
        }
    };

    let names = challenge_names(circuit, &sorted, vars_num, settings.prefix());
    let (mut transcript, prefix) = settings.open(&names)?;
    let first = first_challenge(&mut transcript, &prefix, vars_num)?;

    let mut claims = ClaimsManager::new(circuit, assignment, pool, &config, workers);
    let mut proof = vec![SumcheckProof::default(); circuit.len()];
    let mut base = Vec::new();

    for (i, &wire) in sorted.iter().enumerate().rev() {
        let _wire_span = debug_span!("wire", i, wire, gate = circuit.gate(wire).name()).entered();
        if circuit.is_output(wire) {
            let value = assignment.require(wire)?.evaluate(&first, pool)?;
            claims.add(wire, first.clone(), value)?;
        }
        if !circuit.needs_no_proof(wire) {
            let mut claim = claims.get_claim(wire)?;
            let wire_settings = TranscriptSettings::resume(&mut transcript, format!("{prefix}w{i}."))
                .with_base_challenges(std::mem::take(&mut base));
            proof[i] = sumcheck::prove(&mut claim, wire_settings)?;
            base = base_challenges(&proof[i].final_eval_proof);
        }
        claims.delete_claim(wire);
    }

    debug!(elements = proof.iter().map(SumcheckProof::element_count).sum::<usize>(), "gkr proof done");
    Ok(Proof::new(proof))
}

/// Checks `proof` against the input and output wires of `assignment`.
pub fn verify(
    circuit: &Circuit,
    assignment: &WireAssignment,
    proof: &Proof,
    settings: TranscriptSettings<'_>,
    options: &GkrOptions<'_>,
) -> Result<(), GkrError> {
    let span = debug_span!("gkr_verify", wires = circuit.len());
    let _enter = span.enter();

    let Setup { sorted, num_instances, vars_num, config } = setup(circuit, assignment, options)?;
    if proof.len() != circuit.len() {
        return Err(GkrError::ProofLength { expected: circuit.len(), actual: proof.len() });
    }
    let owned_pool;
    let pool = match options.pool {
        Some(pool) => pool,
        None => {
            owned_pool = MultiLinPool::new(config.pool_capacity, num_instances);
            &owned_pool
        }
    };

    let names = challenge_names(circuit, &sorted, vars_num, settings.prefix());
    let (mut transcript, prefix) = settings.open(&names)?;
    let first = first_challenge(&mut transcript, &prefix, vars_num)?;

    let mut claims = ClaimsManager::new(circuit, assignment, pool, &config, None);
    let mut base = Vec::new();

    for (i, &wire) in sorted.iter().enumerate().rev() {
        let _wire_span = debug_span!("wire", i, wire, gate = circuit.gate(wire).name()).entered();
        if circuit.is_output(wire) {
            let value = assignment.require(wire)?.evaluate(&first, pool)?;
            claims.add(wire, first.clone(), value)?;
        }
        let wire_proof = &proof[i];
        if circuit.needs_no_proof(wire) {
            if !wire_proof.is_empty() {
                return Err(GkrError::UnexpectedProof { wire });
            }
            let claim = claims.take(wire)?;
            let evaluation = assignment.require(wire)?.evaluate(&claim.points[0], pool)?;
            if evaluation != claim.evaluations[0] {
                return Err(GkrError::IncorrectInputClaim { wire });
            }
        } else {
            let mut claim = claims.get_lazy_claim(wire)?;
            let wire_settings = TranscriptSettings::resume(&mut transcript, format!("{prefix}w{i}."))
                .with_base_challenges(std::mem::take(&mut base));
            sumcheck::verify(&mut claim, wire_proof, wire_settings).map_err(|err| wrap_wire(wire, err))?;
            base = base_challenges(&wire_proof.final_eval_proof);
        }
        claims.delete_claim(wire);
    }
    Ok(())
}

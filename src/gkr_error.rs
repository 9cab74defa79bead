//! Error type shared by every stage of the GKR engine.

use crate::gkr_circuit::WireId;

/// Errors raised while building circuits, proving or verifying.
///
/// Setup and caller-contract variants are reported before any proving work
/// starts. Protocol variants are definitive rejections of a proof.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GkrError {
    #[error("wire {wire} references input {input}, out of range for a circuit of {len} wires")]
    InputOutOfRange { wire: WireId, input: WireId, len: usize },

    #[error("wire {wire} references itself as an input")]
    SelfReference { wire: WireId },

    #[error("wire {wire}: gate expects {expected} inputs, got {actual}")]
    GateArity { wire: WireId, expected: usize, actual: usize },

    #[error("circuit has a dependency cycle; {scheduled} of {len} wires could be scheduled")]
    CyclicCircuit { scheduled: usize, len: usize },

    #[error("sorted wire order has {actual} entries, circuit has {expected}")]
    SortedOrderMismatch { expected: usize, actual: usize },

    #[error("invalid sorted order: {0}")]
    InvalidSortedOrder(String),

    #[error("number of instances must be a power of 2, got {0}")]
    NonPowerOfTwoInstances(usize),

    #[error("assignment is empty")]
    EmptyAssignment,

    #[error("assignment has {actual} entries, circuit has {expected} wires")]
    AssignmentShape { expected: usize, actual: usize },

    #[error("missing assignment for wire {wire}")]
    MissingAssignment { wire: WireId },

    #[error("wire {wire} assignment has {actual} instances, expected {expected}")]
    InstanceCountMismatch { wire: WireId, expected: usize, actual: usize },

    #[error("claim for wire {wire} was already consumed")]
    ClaimConsumed { wire: WireId },

    #[error("wire {wire} has no claims")]
    MissingClaims { wire: WireId },

    #[error("evaluation point has {actual} coordinates, expected {expected}")]
    PointLength { expected: usize, actual: usize },

    #[error("proof has {actual} wire entries, circuit has {expected}")]
    ProofLength { expected: usize, actual: usize },

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("no proof allowed for input wire {wire} with a single claim")]
    UnexpectedProof { wire: WireId },

    #[error("incorrect claim on input wire {wire}")]
    IncorrectInputClaim { wire: WireId },

    #[error("{given} input wire evaluations given, {expected} expected")]
    InputEvaluationCount { given: usize, expected: usize },

    #[error("incompatible evaluations")]
    IncompatibleEvaluations,

    #[error("sumcheck proof rejected at wire {wire}: {source}")]
    SumcheckRejected {
        wire: WireId,
        #[source]
        source: Box<GkrError>,
    },

    #[error("challenge {0} not found")]
    ChallengeNotFound(String),

    #[error("challenge {0} declared twice")]
    DuplicateChallenge(String),

    #[error("challenge {0} already computed, cannot bind")]
    ChallengeAlreadyComputed(String),

    #[error("previous challenge of {0} not computed")]
    PreviousChallengeNotComputed(String),

    #[error("proof encoding: {0}")]
    Encoding(String),

    #[error("config: {0}")]
    Config(String),
}

impl GkrError {
    /// True for variants that reject a proof, as opposed to setup or caller mistakes.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GkrError::MalformedProof(_)
                | GkrError::UnexpectedProof { .. }
                | GkrError::IncorrectInputClaim { .. }
                | GkrError::InputEvaluationCount { .. }
                | GkrError::IncompatibleEvaluations
                | GkrError::SumcheckRejected { .. }
                | GkrError::ProofLength { .. }
        )
    }
}

pub(crate) fn wrap_wire(wire: WireId, err: GkrError) -> GkrError {
    if err.is_rejection() {
        GkrError::SumcheckRejected { wire, source: Box::new(err) }
    } else {
        err
    }
}

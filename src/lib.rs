//! GKR proof engine over the BN254 scalar field.

pub mod gkr_error;
pub mod gkr_config;
pub mod multilin;
pub mod multilin_pool;
pub mod gkr_gate;
pub mod gkr_circuit;
pub mod gkr_schedule;
pub mod gkr_assignment;
pub mod fiat_shamir;
pub mod sumcheck;
pub mod gkr_proof;
pub mod gkr;

pub use ark_bn254::Fr;

pub use fiat_shamir::{Keccak256Hasher, Transcript, TranscriptHasher, TranscriptSettings};
pub use gkr::{challenge_names, proof_size, prove, verify, GkrOptions};
pub use gkr_assignment::WireAssignment;
pub use gkr_circuit::{Circuit, Wire, WireId};
pub use gkr_config::GkrConfig;
pub use gkr_error::GkrError;
pub use gkr_gate::{Gate, GateFunction};
pub use gkr_proof::Proof;
pub use multilin::MultiLin;
pub use multilin_pool::MultiLinPool;
pub use sumcheck::SumcheckProof;

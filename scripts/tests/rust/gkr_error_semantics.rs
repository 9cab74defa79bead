use glyph_gkr::gkr_schedule::topological_sort;
use glyph_gkr::{
    prove, verify, Circuit, Fr, Gate, GkrConfig, GkrError, GkrOptions, Proof, Transcript, TranscriptSettings, Wire,
    WireAssignment,
};

fn assert_prefix(err: &GkrError, prefix: &str) {
    let msg = err.to_string();
    assert!(msg.starts_with(prefix), "expected prefix {prefix}, got {msg}");
}

fn mul_circuit() -> Circuit {
    match Circuit::new(vec![Wire::input(), Wire::input(), Wire::new(Gate::Mul, vec![0, 1])]) {
        Ok(c) => c,
        Err(err) => panic!("circuit: {err}"),
    }
}

fn mul_assignment(circuit: &Circuit) -> WireAssignment {
    let a = (1..=4u64).map(Fr::from).collect();
    let b = (5..=8u64).map(Fr::from).collect();
    let mut assignment = WireAssignment::from_wires(3, vec![(0, a), (1, b)]);
    if let Err(err) = assignment.complete(circuit) {
        panic!("complete: {err}");
    }
    assignment
}

fn options() -> GkrOptions<'static> {
    GkrOptions::default().with_config(GkrConfig::default())
}

#[test]
fn error_circuit_construction() {
    let arity = Circuit::new(vec![Wire::input(), Wire::new(Gate::Mul, vec![0])]).unwrap_err();
    assert_eq!(arity, GkrError::GateArity { wire: 1, expected: 2, actual: 1 });
    assert_prefix(&arity, "wire 1: gate expects 2 inputs");

    let range = Circuit::new(vec![Wire::new(Gate::Identity, vec![4])]).unwrap_err();
    assert_prefix(&range, "wire 0 references input 4");

    let own = Circuit::new(vec![Wire::input(), Wire::new(Gate::Add, vec![0, 1])]).unwrap_err();
    assert_eq!(own, GkrError::SelfReference { wire: 1 });
    assert!(!own.is_rejection());
}

#[test]
fn error_cycle_detected_by_scheduler() {
    let circuit = Circuit::new(vec![
        Wire::input(),
        Wire::new(Gate::Add, vec![0, 2]),
        Wire::new(Gate::Identity, vec![1]),
    ])
    .unwrap();
    let err = topological_sort(&circuit).unwrap_err();
    assert_eq!(err, GkrError::CyclicCircuit { scheduled: 1, len: 3 });
    assert_prefix(&err, "circuit has a dependency cycle");
}

#[test]
fn error_setup_before_transcript() {
    let circuit = mul_circuit();
    let three = WireAssignment::from_wires(3, vec![(0, vec![Fr::from(1u64); 3]), (1, vec![Fr::from(2u64); 3])]);
    let err = prove(&circuit, &three, TranscriptSettings::new(Vec::new()), &options()).unwrap_err();
    assert_eq!(err, GkrError::NonPowerOfTwoInstances(3));
    assert_prefix(&err, "number of instances must be a power of 2");

    let empty = WireAssignment::new(3);
    let err = verify(&circuit, &empty, &Proof::default(), TranscriptSettings::new(Vec::new()), &options()).unwrap_err();
    assert_eq!(err, GkrError::EmptyAssignment);
    assert!(!err.is_rejection());
}

#[test]
fn error_wrong_transcript_is_rejection() {
    let circuit = mul_circuit();
    let assignment = mul_assignment(&circuit);
    let proof = prove(&circuit, &assignment, TranscriptSettings::new(vec![vec![1]]), &options()).unwrap();
    let err = verify(&circuit, &assignment, &proof, TranscriptSettings::new(vec![vec![2]]), &options()).unwrap_err();
    assert!(err.is_rejection());
    assert_prefix(&err, "sumcheck proof rejected at wire 2:");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn error_proof_shape_is_rejection() {
    let circuit = mul_circuit();
    let assignment = mul_assignment(&circuit);
    let err = verify(&circuit, &assignment, &Proof::default(), TranscriptSettings::new(Vec::new()), &options())
        .unwrap_err();
    assert_eq!(err, GkrError::ProofLength { expected: 3, actual: 0 });
    assert!(err.is_rejection());
}

#[test]
fn error_unknown_challenge_prefix() {
    let circuit = mul_circuit();
    let assignment = mul_assignment(&circuit);
    let mut outer = Transcript::new(&["fC.0"]).unwrap();
    let settings = TranscriptSettings::resume(&mut outer, "gkr.");
    let err = prove(&circuit, &assignment, settings, &options()).unwrap_err();
    assert_eq!(err, GkrError::ChallengeNotFound("gkr.fC.0".to_string()));
}

#[test]
fn error_transcript_misuse() {
    let dup = Transcript::new(&["a", "a"]).unwrap_err();
    assert_eq!(dup.to_string(), "challenge a declared twice");

    let mut transcript = Transcript::new(&["a", "b"]).unwrap();
    assert_eq!(
        transcript.compute_challenge("b").unwrap_err(),
        GkrError::PreviousChallengeNotComputed("b".to_string())
    );
    transcript.compute_challenge("a").unwrap();
    assert_prefix(&transcript.bind("a", &[1]).unwrap_err(), "challenge a already computed");
}

#[test]
fn error_encoding_and_config() {
    assert_prefix(&Proof::from_bytes(&[0, 0]).unwrap_err(), "proof encoding: truncated wire count");
    assert_prefix(&Proof::from_json("{").unwrap_err(), "proof encoding: json decode failed");

    let err = GkrConfig::from_pairs([("GKR_SUMCHECK_JOB_SIZE", "0")]).unwrap_err();
    assert_prefix(&err, "config: GKR_SUMCHECK_JOB_SIZE: value below min 1");
    let err = GkrConfig::from_pairs([("GKR_SUMCHECK_PARALLEL", "maybe")]).unwrap_err();
    assert_prefix(&err, "config: GKR_SUMCHECK_PARALLEL: invalid bool");
}

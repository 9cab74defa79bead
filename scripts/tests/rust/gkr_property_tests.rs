use ark_ff::UniformRand;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use glyph_gkr::multilin::eval_eq;
use glyph_gkr::{
    proof_size, prove, verify, Circuit, Fr, Gate, GkrConfig, GkrOptions, MultiLin, MultiLinPool, Proof,
    TranscriptSettings, Wire, WireAssignment,
};
use proptest::prelude::*;
use proptest::sample::Index;

fn options() -> GkrOptions<'static> {
    GkrOptions::default().with_config(GkrConfig { job_size: 2, ..GkrConfig::default() })
}

fn gate_for(kind: u8) -> Gate {
    match kind % 4 {
        0 => Gate::Identity,
        1 => Gate::Mul,
        2 => Gate::Add,
        _ => Gate::mimc(),
    }
}

/// Inputs first, then each gate reads one or two earlier wires.
fn random_circuit(num_inputs: usize, gates: &[(u8, Index, Index)]) -> Circuit {
    let mut wires: Vec<Wire> = (0..num_inputs).map(|_| Wire::input()).collect();
    for (kind, a, b) in gates {
        let len = wires.len();
        let gate = gate_for(*kind);
        let inputs = match gate.arity() {
            Some(1) => vec![a.index(len)],
            _ => vec![a.index(len), b.index(len)],
        };
        wires.push(Wire::new(gate, inputs));
    }
    match Circuit::new(wires) {
        Ok(c) => c,
        Err(err) => panic!("circuit: {err}"),
    }
}

fn random_assignment(circuit: &Circuit, log_instances: usize, seed: u64) -> WireAssignment {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = 1usize << log_instances;
    let inputs: Vec<(usize, Vec<Fr>)> = (0..circuit.len())
        .filter(|&w| circuit.is_input(w))
        .map(|w| (w, (0..n).map(|_| Fr::rand(&mut rng)).collect()))
        .collect();
    let mut assignment = WireAssignment::from_wires(circuit.len(), inputs);
    if let Err(err) = assignment.complete(circuit) {
        panic!("complete: {err}");
    }
    assignment
}

fn circuit_strategy() -> impl Strategy<Value = (usize, Vec<(u8, Index, Index)>)> {
    (1usize..4, prop::collection::vec((any::<u8>(), any::<Index>(), any::<Index>()), 1..5))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prove_then_verify_accepts((inputs, gates) in circuit_strategy(), log in 0usize..4, seed in any::<u64>(), s in any::<u8>()) {
        let circuit = random_circuit(inputs, &gates);
        let assignment = random_assignment(&circuit, log, seed);
        let proof = prove(&circuit, &assignment, TranscriptSettings::new(vec![vec![s]]), &options());
        prop_assert!(proof.is_ok(), "prove failed: {:?}", proof.as_ref().err());
        let proof = proof.unwrap_or_default();
        prop_assert_eq!(proof.element_count(), proof_size(&circuit, log));
        prop_assert_eq!(verify(&circuit, &assignment, &proof, TranscriptSettings::new(vec![vec![s]]), &options()), Ok(()));

        let decoded = Proof::from_bytes(&proof.to_bytes());
        prop_assert_eq!(decoded.as_ref(), Ok(&proof));
        prop_assert_eq!(proof.to_field_elements().len(), proof.element_count());
    }

    #[test]
    fn mutated_output_rejected((inputs, gates) in circuit_strategy(), log in 0usize..4, seed in any::<u64>(), at in any::<Index>()) {
        let circuit = random_circuit(inputs, &gates);
        let assignment = random_assignment(&circuit, log, seed);
        let proof = prove(&circuit, &assignment, TranscriptSettings::new(vec![vec![0]]), &options()).unwrap_or_default();

        let output = (0..circuit.len()).rev().find(|&w| circuit.is_output(w)).unwrap_or(0);
        let mut tampered = assignment.clone();
        if let Some(values) = tampered.get_mut(output) {
            let k = at.index(values.len());
            values[k] += Fr::from(1u64);
        }
        prop_assert!(verify(&circuit, &tampered, &proof, TranscriptSettings::new(vec![vec![0]]), &options()).is_err());
    }

    #[test]
    fn evaluate_matches_lagrange_basis(log in 1usize..5, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let table: Vec<Fr> = (0..1usize << log).map(|_| Fr::rand(&mut rng)).collect();
        let point: Vec<Fr> = (0..log).map(|_| Fr::rand(&mut rng)).collect();
        let pool = MultiLinPool::new(4, table.len());
        let direct: Fr = table
            .iter()
            .enumerate()
            .map(|(h, v)| {
                let bits: Vec<Fr> = (0..log).map(|i| Fr::from(((h >> (log - 1 - i)) & 1) as u64)).collect();
                *v * eval_eq(&bits, &point)
            })
            .sum();
        prop_assert_eq!(MultiLin::new(table).evaluate(&point, &pool), Ok(direct));
    }
}

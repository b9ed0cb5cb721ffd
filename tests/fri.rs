use ark_ff::{AdditiveGroup, One};
use ark_std::test_rng;
use sha2::Sha256;

use range_iop::domain::FieldSubset;
use range_iop::error::FriError;
use range_iop::field::Goldilocks;
use range_iop::fri::{FriConfig, FriProof, FriProver, FriVerifier};
use range_iop::poly::random_polynomial;

const DEGREE_BOUND: usize = 512;
const QUERIES: usize = 20;

fn make_config() -> (FieldSubset<Goldilocks>, FriConfig<Goldilocks>) {
    let domain = FieldSubset::multiplicative_coset(1 << 12, Goldilocks::from(4096u64)).unwrap();
    let config = FriConfig::new(&domain, DEGREE_BOUND, vec![1, 2, 2, 2, 2]).unwrap();
    (domain, config)
}

fn prove(
    evaluations: Vec<Goldilocks>,
    challenges: &[Goldilocks],
    positions: &[usize],
) -> FriProof<Sha256, Goldilocks> {
    let (_, config) = make_config();
    let mut prover = FriProver::<Sha256, _>::new(config, evaluations).unwrap();
    prover.prove(challenges, positions).unwrap()
}

#[test_log::test]
fn test_low_degree_codeword_is_accepted() {
    let mut rng = test_rng();
    let (domain, config) = make_config();
    let verifier = FriVerifier::new(config);

    for num_coefficients in [1, 100, DEGREE_BOUND] {
        let poly = random_polynomial::<Goldilocks, _>(num_coefficients, &mut rng);
        let evaluations = domain.forward_transform(&poly.coeffs);
        let challenges = verifier.sample_challenges(&mut rng);
        let positions = verifier.sample_positions(QUERIES, &mut rng);

        let proof = prove(evaluations, &challenges, &positions);
        assert!(proof.final_poly.len() <= 1);
        assert!(verifier.verify(&proof, &challenges, &positions));
    }
}

#[test_log::test]
fn test_single_corrupted_point_is_rejected() {
    let mut rng = test_rng();
    let (domain, config) = make_config();
    let verifier = FriVerifier::new(config);

    let poly = random_polynomial::<Goldilocks, _>(DEGREE_BOUND, &mut rng);
    let mut evaluations = domain.forward_transform(&poly.coeffs);
    evaluations[1234] += Goldilocks::one();

    let challenges = verifier.sample_challenges(&mut rng);
    let positions = verifier.sample_positions(QUERIES, &mut rng);
    let proof = prove(evaluations, &challenges, &positions);
    // the error spreads into the final polynomial
    assert!(proof.final_poly.len() > 1);
    assert!(!verifier.verify(&proof, &challenges, &positions));
}

#[test_log::test]
fn test_high_degree_codeword_is_rejected() {
    let mut rng = test_rng();
    let (domain, config) = make_config();
    let verifier = FriVerifier::new(config);

    let poly = random_polynomial::<Goldilocks, _>(4 * DEGREE_BOUND, &mut rng);
    let evaluations = domain.forward_transform(&poly.coeffs);
    let challenges = verifier.sample_challenges(&mut rng);
    let positions = verifier.sample_positions(QUERIES, &mut rng);
    let proof = prove(evaluations, &challenges, &positions);
    assert!(!verifier.verify(&proof, &challenges, &positions));
}

#[test_log::test]
fn test_tampered_proof_is_rejected() {
    let mut rng = test_rng();
    let (domain, config) = make_config();
    let verifier = FriVerifier::new(config);

    let poly = random_polynomial::<Goldilocks, _>(DEGREE_BOUND, &mut rng);
    let evaluations = domain.forward_transform(&poly.coeffs);
    let challenges = verifier.sample_challenges(&mut rng);
    let positions = verifier.sample_positions(QUERIES, &mut rng);
    let proof = prove(evaluations, &challenges, &positions);
    assert!(verifier.verify(&proof, &challenges, &positions));

    let mut tampered = proof.clone();
    tampered.layers[2].openings[0].values[0] += Goldilocks::one();
    assert!(!verifier.verify(&tampered, &challenges, &positions));

    let mut tampered = proof.clone();
    tampered.final_poly[0] = tampered.final_poly[0].double();
    assert!(!verifier.verify(&tampered, &challenges, &positions));

    let mut tampered = proof.clone();
    tampered.layers.swap(1, 2);
    assert!(!verifier.verify(&tampered, &challenges, &positions));

    let mut wrong_challenges = challenges.clone();
    wrong_challenges[3] += Goldilocks::one();
    assert!(!verifier.verify(&proof, &wrong_challenges, &positions));

    assert!(!verifier.verify(&proof, &challenges[..4], &positions));
}

#[test_log::test]
fn test_degree_bound_is_exact() {
    let mut rng = test_rng();
    let domain = FieldSubset::multiplicative_coset(1 << 12, Goldilocks::from(4096u64)).unwrap();
    assert!(matches!(
        FriConfig::new(&domain, 500, vec![3, 3]),
        Err(FriError::UnalignedDegreeBound {
            bound: 500,
            factor: 64
        })
    ));

    let config = FriConfig::new(&domain, 448, vec![3, 3]).unwrap();
    let verifier = FriVerifier::new(config.clone());
    for (num_coefficients, accepted) in [(448, true), (449, false), (512, false)] {
        let poly = random_polynomial::<Goldilocks, _>(num_coefficients, &mut rng);
        let evaluations = domain.forward_transform(&poly.coeffs);
        let challenges = verifier.sample_challenges(&mut rng);
        let positions = verifier.sample_positions(QUERIES, &mut rng);

        let mut prover = FriProver::<Sha256, _>::new(config.clone(), evaluations).unwrap();
        let proof = prover.prove(&challenges, &positions).unwrap();
        assert_eq!(
            verifier.verify(&proof, &challenges, &positions),
            accepted,
            "{num_coefficients} coefficients"
        );
    }
}

use ark_ff::{FftField, One, UniformRand};
use ark_poly::univariate::DensePolynomial;
use ark_poly::Polynomial;
use ark_std::test_rng;
use sha2::Sha256;

use range_iop::domain::FieldSubset;
use range_iop::field::Goldilocks;
use range_iop::inner_product::{
    run_interaction, InnerProductConfig, InnerProductProver, InnerProductVerifier, Interaction,
};
use range_iop::poly::random_polynomial;

const DEGREE_BOUND: usize = 512;
const SUMMATION_SIZE: usize = 128;
const PAIRS: usize = 100;
const QUERIES: usize = 10;

struct Instance {
    config: InnerProductConfig<Goldilocks>,
    public: Vec<DensePolynomial<Goldilocks>>,
    secret: Vec<DensePolynomial<Goldilocks>>,
    blinding: DensePolynomial<Goldilocks>,
    target: Goldilocks,
}

fn make_instance() -> Instance {
    let mut rng = test_rng();
    let summation =
        FieldSubset::multiplicative_coset(SUMMATION_SIZE, Goldilocks::rand(&mut rng)).unwrap();
    let codeword = FieldSubset::multiplicative_coset(1 << 11, Goldilocks::GENERATOR).unwrap();
    let config =
        InnerProductConfig::new(&summation, &codeword, DEGREE_BOUND, vec![2, 2, 2], 2).unwrap();

    let public: Vec<_> = (0..PAIRS)
        .map(|_| random_polynomial::<Goldilocks, _>(SUMMATION_SIZE + 1, &mut rng))
        .collect();
    let secret: Vec<_> = (0..PAIRS)
        .map(|_| random_polynomial::<Goldilocks, _>(DEGREE_BOUND - SUMMATION_SIZE - 10, &mut rng))
        .collect();
    let blinding = random_polynomial::<Goldilocks, _>(DEGREE_BOUND, &mut rng);

    let target = summation
        .all_elements()
        .map(|a| {
            public
                .iter()
                .zip(&secret)
                .map(|(p, s)| p.evaluate(&a) * s.evaluate(&a))
                .sum::<Goldilocks>()
        })
        .sum();

    Instance {
        config,
        public,
        secret,
        blinding,
        target,
    }
}

#[test_log::test]
fn test_inner_product_completeness() {
    let mut rng = test_rng();
    let instance = make_instance();
    let mut prover = InnerProductProver::<Sha256, _>::new(
        instance.config.clone(),
        instance.public.clone(),
        instance.secret,
        instance.blinding,
    )
    .unwrap();
    assert_eq!(prover.target(), instance.target);

    let verifier = InnerProductVerifier::new(instance.config, instance.public, instance.target);
    let Interaction {
        challenges,
        queries,
        proof,
    } = run_interaction(&mut prover, &verifier, QUERIES, &mut rng).unwrap();
    assert!(verifier.verify(&proof, &challenges, &queries));

    assert_eq!(proof.fri_proofs.len(), 2);
    assert!(proof.num_digests() > 0);
    assert!(proof.num_field_elements() > 2 * queries.len());
}

#[test_log::test]
fn test_wrong_target_is_rejected() {
    let mut rng = test_rng();
    let instance = make_instance();
    let mut prover = InnerProductProver::<Sha256, _>::new(
        instance.config.clone(),
        instance.public.clone(),
        instance.secret,
        instance.blinding,
    )
    .unwrap();

    let verifier = InnerProductVerifier::new(
        instance.config,
        instance.public,
        instance.target + Goldilocks::one(),
    );
    let run = run_interaction(&mut prover, &verifier, QUERIES, &mut rng).unwrap();
    assert!(!verifier.verify(&run.proof, &run.challenges, &run.queries));
}

use ark_ff::{FftField, Field, One, UniformRand, Zero};
use ark_poly::univariate::DensePolynomial;
use ark_poly::DenseUVPolynomial;
use ark_std::rand::Rng;
use ark_std::test_rng;
use log::info;
use sha2::Sha256;

use range_iop::domain::FieldSubset;
use range_iop::field::Goldilocks;
use range_iop::inner_product::{
    run_interaction, InnerProductConfig, InnerProductProver, InnerProductVerifier, Interaction,
};
use range_iop::poly::{multiply, random_polynomial};

const BITS: usize = 32;
const SUMMATION_SIZE: usize = 64;
const DEGREE_BOUND: usize = 256;
const QUERIES: usize = 24;

fn interpolate(
    domain: &FieldSubset<Goldilocks>,
    mut values: Vec<Goldilocks>,
) -> DensePolynomial<Goldilocks> {
    values.resize(domain.num_elements(), Goldilocks::zero());
    DensePolynomial::from_coefficients_vec(domain.inverse_transform(&values).unwrap())
}

// Proves that a committed value fits in 32 bits: the bits `b_j` are
// interpolated over H, `Σ 2^j b_j` recovers the value and `b(b - 1)` vanishes
// on H, checked against a random public polynomial.
fn main() {
    env_logger::init();
    let mut rng = test_rng();

    let summation = FieldSubset::<Goldilocks>::subgroup(SUMMATION_SIZE).unwrap();
    let codeword = FieldSubset::multiplicative_coset(1024, Goldilocks::GENERATOR).unwrap();
    let config =
        InnerProductConfig::new(&summation, &codeword, DEGREE_BOUND, vec![2, 2, 2], 2).unwrap();

    let value: u64 = rng.gen::<u32>().into();
    let bits: Vec<Goldilocks> = (0..BITS)
        .map(|j| Goldilocks::from((value >> j) & 1))
        .collect();
    info!("proving that {value} fits in {BITS} bits");

    let powers: Vec<Goldilocks> = (0..BITS)
        .map(|j| Goldilocks::from(2u64).pow([j as u64]))
        .collect();
    let weights = interpolate(&summation, powers);
    let check = random_polynomial::<Goldilocks, _>(SUMMATION_SIZE, &mut rng);

    let vanishing = summation.vanishing_polynomial();
    let bit_poly = vanishing.mask(
        &interpolate(&summation, bits),
        &random_polynomial(8, &mut rng),
    );
    let booleanity = multiply(
        &bit_poly,
        &(&bit_poly - &DensePolynomial::from_coefficients_vec(vec![Goldilocks::one()])),
    );

    let public = vec![weights, check];
    let secret = vec![bit_poly, booleanity];
    let blinding = random_polynomial::<Goldilocks, _>(DEGREE_BOUND, &mut rng);
    let mut prover =
        InnerProductProver::<Sha256, _>::new(config.clone(), public.clone(), secret, blinding)
            .unwrap();
    assert_eq!(prover.target(), Goldilocks::from(value));

    let verifier = InnerProductVerifier::new(config, public.clone(), Goldilocks::from(value));
    let Interaction {
        challenges,
        queries,
        proof,
    } = run_interaction(&mut prover, &verifier, QUERIES, &mut rng).unwrap();
    info!(
        "proof carries {} digests and {} field elements",
        proof.num_digests(),
        proof.num_field_elements()
    );
    assert!(verifier.verify(&proof, &challenges, &queries));

    let liar = InnerProductVerifier::new(
        verifier.config().clone(),
        public,
        Goldilocks::from(value) + Goldilocks::rand(&mut rng),
    );
    assert!(!liar.verify(&proof, &challenges, &queries));
    info!("range proof verified");
}

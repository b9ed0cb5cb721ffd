use super::{
    CombinationRule, DomainPoint, InnerProductChallenges, InnerProductConfig, InnerProductProof,
};
use crate::error::{DomainError, InnerProductError};
use crate::fri::FriVerifier;
use crate::util::bit_reverse_permutation;
use ark_ff::FftField;
use ark_poly::univariate::DensePolynomial;
use ark_std::rand::Rng;
use digest::Digest;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

pub struct InnerProductVerifier<F: FftField> {
    config: InnerProductConfig<F>,
    // bit-reversed evaluations on the codeword domain
    public_evaluations: Vec<Vec<F>>,
    target: F,
}

impl<F: FftField> InnerProductVerifier<F> {
    pub fn new(config: InnerProductConfig<F>, public: Vec<DensePolynomial<F>>, target: F) -> Self {
        let domain = *config.codeword_domain();
        let public_evaluations = public
            .into_par_iter()
            .map(|poly| {
                let mut evaluations = domain.fft(&poly.coeffs);
                bit_reverse_permutation(&mut evaluations);
                evaluations
            })
            .collect();
        Self {
            config,
            public_evaluations,
            target,
        }
    }

    /// Public polynomials given by their evaluations over the codeword domain,
    /// in its canonical order.
    pub fn from_evaluations(
        config: InnerProductConfig<F>,
        mut evaluations: Vec<Vec<F>>,
        target: F,
    ) -> Result<Self, InnerProductError> {
        let expected = config.codeword_length();
        for evaluation in evaluations.iter_mut() {
            if evaluation.len() != expected {
                return Err(DomainError::EvaluationLength {
                    expected,
                    found: evaluation.len(),
                }
                .into());
            }
            bit_reverse_permutation(evaluation);
        }
        Ok(Self {
            config,
            public_evaluations: evaluations,
            target,
        })
    }

    pub fn config(&self) -> &InnerProductConfig<F> {
        &self.config
    }

    pub fn target(&self) -> F {
        self.target
    }

    /// `ρ_r` for every repetition, sent after the first-round message.
    pub fn sample_batching<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<F> {
        (0..self.config.repetitions()).map(|_| F::rand(rng)).collect()
    }

    /// `a_r`, sent only once the quotient root is known.
    pub fn sample_combination<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<[F; 4]> {
        (0..self.config.repetitions())
            .map(|_| [F::rand(rng), F::rand(rng), F::rand(rng), F::rand(rng)])
            .collect()
    }

    /// One folding challenge per repetition for the next FRI round.
    pub fn sample_folding<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<F> {
        (0..self.config.repetitions()).map(|_| F::rand(rng)).collect()
    }

    /// Sorted, distinct positions of the codeword domain.
    pub fn sample_queries<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<usize> {
        FriVerifier::new(self.config.fri().clone()).sample_positions(count, rng)
    }

    pub fn verify<D: Digest>(
        &self,
        proof: &InnerProductProof<D, F>,
        challenges: &InnerProductChallenges<F>,
        queries: &[usize],
    ) -> bool {
        let repetitions = self.config.repetitions();
        if challenges.repetitions.len() != repetitions || proof.fri_proofs.len() != repetitions {
            debug!(
                "inner product: {} challenge sets and {} FRI proofs for {repetitions} repetitions",
                challenges.repetitions.len(),
                proof.fri_proofs.len()
            );
            return false;
        }
        let size = self.config.codeword_length();
        if queries.iter().any(|position| *position >= size) {
            debug!("inner product: query outside the codeword domain");
            return false;
        }

        let fri = self.config.fri();
        let coset_size = self.config.coset_size();
        let depth = fri.domain(0).dimension() - fri.localization()[0];
        let leaves = queries
            .iter()
            .map(|position| fri.leaf_index(0, *position))
            .sorted_unstable()
            .dedup()
            .collect::<Vec<_>>();

        let num_public = self.public_evaluations.len();
        let secret = &proof.secret_openings;
        if secret.queries() != leaves.as_slice()
            || !secret.verify_against(
                &proof.first_round.secret_root,
                (num_public + 1) * coset_size,
                depth,
            )
        {
            debug!("inner product: secret openings do not match the commitment");
            return false;
        }
        let quotient = &proof.quotient_openings;
        if quotient.queries() != leaves.as_slice()
            || !quotient.verify_against(&proof.quotient_root, repetitions * coset_size, depth)
        {
            debug!("inner product: quotient openings do not match the commitment");
            return false;
        }

        let positions: Vec<usize> = leaves
            .iter()
            .flat_map(|leaf| (0..coset_size).map(move |offset| leaf * coset_size + offset))
            .collect();
        let points = DomainPoint::batch(&self.config, &positions);
        // (Σ p_i s_i, γ) at every opened position
        let opened: Vec<(F, F)> = secret
            .openings()
            .iter()
            .zip(positions.chunks(coset_size))
            .flat_map(|(opening, chunk)| {
                chunk.iter().enumerate().map(move |(offset, position)| {
                    let inner = self
                        .public_evaluations
                        .iter()
                        .enumerate()
                        .map(|(i, public)| {
                            public[*position] * opening.values[i * coset_size + offset]
                        })
                        .sum::<F>();
                    (inner, opening.values[num_public * coset_size + offset])
                })
            })
            .collect();

        let fri_verifier = FriVerifier::new(fri.clone());
        challenges
            .repetitions
            .par_iter()
            .zip(proof.fri_proofs.par_iter())
            .enumerate()
            .all(|(repetition, (challenge, fri_proof))| {
                let rule = CombinationRule::new(
                    &self.config,
                    challenge.batching,
                    challenge.combination,
                    self.target,
                    proof.first_round.blinding_sum,
                );
                let cosets: Vec<Vec<F>> = quotient
                    .openings()
                    .iter()
                    .enumerate()
                    .map(|(slot, opening)| {
                        (0..coset_size)
                            .map(|offset| {
                                let index = slot * coset_size + offset;
                                let (inner, blinding) = opened[index];
                                let h = opening.values[repetition * coset_size + offset];
                                rule.evaluate(&points[index], inner, blinding, h)
                            })
                            .collect()
                    })
                    .collect();
                let initial_cosets: Vec<Vec<F>> = queries
                    .iter()
                    .map(|position| {
                        let leaf = fri.leaf_index(0, *position);
                        cosets[leaves.partition_point(|opened| *opened < leaf)].clone()
                    })
                    .collect();

                let accepted = fri_verifier.verify_with_initial_cosets(
                    fri_proof,
                    &challenge.folding,
                    queries,
                    &initial_cosets,
                );
                if !accepted {
                    debug!("inner product: FRI rejected repetition {repetition}");
                }
                accepted
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::FieldSubset;
    use crate::field::Goldilocks;
    use crate::inner_product::{run_interaction, InnerProductProver, Interaction};
    use crate::poly::random_polynomial;
    use ark_ff::One;
    use ark_std::test_rng;
    use sha2::Sha256;

    struct Instance {
        public: Vec<DensePolynomial<Goldilocks>>,
        prover: InnerProductProver<Sha256, Goldilocks>,
    }

    fn make_config() -> InnerProductConfig<Goldilocks> {
        let summation = FieldSubset::multiplicative_coset(16, Goldilocks::from(3u64)).unwrap();
        let codeword = FieldSubset::multiplicative_coset(256, Goldilocks::from(256u64)).unwrap();
        InnerProductConfig::new(&summation, &codeword, 64, vec![2, 2], 2).unwrap()
    }

    fn make_instance() -> Instance {
        let mut rng = test_rng();
        let public: Vec<_> = (0..3)
            .map(|_| random_polynomial::<Goldilocks, _>(17, &mut rng))
            .collect();
        let secret: Vec<_> = (0..3)
            .map(|_| random_polynomial::<Goldilocks, _>(40, &mut rng))
            .collect();
        let blinding = random_polynomial::<Goldilocks, _>(64, &mut rng);
        let prover =
            InnerProductProver::new(make_config(), public.clone(), secret, blinding).unwrap();
        Instance { public, prover }
    }

    #[test]
    fn test_honest_proof_verifies() {
        let mut rng = test_rng();
        let mut instance = make_instance();
        let target = instance.prover.target();
        let verifier = InnerProductVerifier::new(make_config(), instance.public.clone(), target);

        let run = run_interaction(&mut instance.prover, &verifier, 12, &mut rng).unwrap();
        assert!(verifier.verify(&run.proof, &run.challenges, &run.queries));
        assert_eq!(run.challenges.repetitions[0].folding.len(), 2);

        let evaluations = instance
            .public
            .iter()
            .map(|poly| make_config().codeword_domain().fft(&poly.coeffs))
            .collect();
        let verifier =
            InnerProductVerifier::from_evaluations(make_config(), evaluations, target).unwrap();
        assert!(verifier.verify(&run.proof, &run.challenges, &run.queries));
    }

    #[test]
    fn test_rejects_tampering() {
        let mut rng = test_rng();
        let mut instance = make_instance();
        let target = instance.prover.target();
        let verifier = InnerProductVerifier::new(make_config(), instance.public.clone(), target);
        let Interaction {
            challenges,
            queries,
            proof,
        } = run_interaction(&mut instance.prover, &verifier, 12, &mut rng).unwrap();

        let wrong =
            InnerProductVerifier::new(make_config(), instance.public, target + Goldilocks::one());
        assert!(!wrong.verify(&proof, &challenges, &queries));

        let mut tampered = proof.clone();
        tampered.first_round.blinding_sum += Goldilocks::one();
        assert!(!verifier.verify(&tampered, &challenges, &queries));

        let mut tampered = proof.clone();
        tampered.quotient_root = tampered.first_round.secret_root.clone();
        assert!(!verifier.verify(&tampered, &challenges, &queries));

        let mut tampered = proof.clone();
        tampered.fri_proofs.pop();
        assert!(!verifier.verify(&tampered, &challenges, &queries));

        let mut other = challenges.clone();
        other.repetitions[1].combination[2] += Goldilocks::one();
        assert!(!verifier.verify(&proof, &other, &queries));

        assert!(!verifier.verify(&proof, &challenges, &[256]));
    }
}

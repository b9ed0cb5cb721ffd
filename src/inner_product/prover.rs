use super::{
    coset_matrix, CombinationRule, DomainPoint, FirstRoundMessage, InnerProductConfig,
    InnerProductProof,
};
use crate::domain::FieldSubset;
use crate::error::{FriError, InnerProductError};
use crate::fri::{FriProver, FriRoundMessage};
use crate::merkle::{LeafLayout, MerkleRoot, MerkleTree, MerkleTreeParameter};
use crate::poly::{multiply, scale};
use crate::util::bit_reverse_permutation;
use ark_ff::{FftField, Zero};
use ark_poly::univariate::DensePolynomial;
use ark_poly::Polynomial;
use digest::Digest;
use itertools::{izip, Itertools};
use log::{debug, info};
use rayon::prelude::*;

struct QuotientRound<D: Digest, F: FftField> {
    batching: Vec<F>,
    // one bit-reversed codeword of h_r per repetition
    evaluations: Vec<Vec<F>>,
    tree: MerkleTree<D, F>,
}

/// Prover side of the inner-product argument. Rounds run in order:
/// `first_round_message`, `commit_quotients`, `combine`, one `fold_round` per
/// FRI round, then `query`.
pub struct InnerProductProver<D: Digest, F: FftField> {
    config: InnerProductConfig<F>,
    // bit-reversed evaluations on the codeword domain
    public_evaluations: Vec<Vec<F>>,
    // secret polynomials followed by the blinding polynomial
    secret_evaluations: Vec<Vec<F>>,
    inner_quotient: DensePolynomial<F>,
    blinding_quotient: DensePolynomial<F>,
    target: F,
    blinding_sum: F,
    secret_tree: MerkleTree<D, F>,
    quotients: Option<QuotientRound<D, F>>,
    fri_provers: Vec<FriProver<D, F>>,
}

fn check_degree(degree: usize, bound: usize) -> Result<(), InnerProductError> {
    if degree >= bound {
        return Err(InnerProductError::DegreeBoundExceeded { degree, bound });
    }
    Ok(())
}

impl<D: Digest, F: FftField> InnerProductProver<D, F> {
    /// Takes the `(public_i, secret_i)` pairs and the blinding polynomial `γ`,
    /// then commits to the secret side.
    pub fn new(
        config: InnerProductConfig<F>,
        public: Vec<DensePolynomial<F>>,
        secret: Vec<DensePolynomial<F>>,
        blinding: DensePolynomial<F>,
    ) -> Result<Self, InnerProductError> {
        if public.len() != secret.len() {
            return Err(InnerProductError::MismatchedPairs {
                public: public.len(),
                secret: secret.len(),
            });
        }
        let bound = config.degree_bound();
        for (p, s) in public.iter().zip(&secret) {
            if !p.is_zero() && !s.is_zero() {
                check_degree(p.degree() + s.degree(), bound)?;
            }
        }
        check_degree(blinding.degree(), bound)?;

        let domain = *config.codeword_domain();
        let evaluate = |poly: &DensePolynomial<F>| {
            let mut evaluations = domain.fft(&poly.coeffs);
            bit_reverse_permutation(&mut evaluations);
            evaluations
        };
        let public_evaluations: Vec<Vec<F>> = public.par_iter().map(evaluate).collect();
        let mut secret_evaluations: Vec<Vec<F>> = secret.par_iter().map(evaluate).collect();
        secret_evaluations.push(evaluate(&blinding));

        let inner = public
            .par_iter()
            .zip(secret.par_iter())
            .map(|(p, s)| multiply(p, s))
            .reduce(DensePolynomial::zero, |a, b| &a + &b);
        let summation = FieldSubset::Multiplicative(*config.summation_domain());
        let target = summation.sum_over_subset(&inner)?;
        let blinding_sum = summation.sum_over_subset(&blinding)?;

        let vanishing = config.vanishing_polynomial();
        let (inner_quotient, _) = vanishing.divide(&inner);
        let (blinding_quotient, _) = vanishing.divide(&blinding);

        let secret_tree = MerkleTree::commit(
            &coset_matrix(&secret_evaluations, config.coset_size()),
            LeafLayout::Columns,
        )?;
        info!(
            "inner product prover committed {} secret polynomials plus blinding",
            secret.len()
        );

        Ok(Self {
            config,
            public_evaluations,
            secret_evaluations,
            inner_quotient,
            blinding_quotient,
            target,
            blinding_sum,
            secret_tree,
            quotients: None,
            fri_provers: Vec::new(),
        })
    }

    pub fn config(&self) -> &InnerProductConfig<F> {
        &self.config
    }

    /// The sum the committed polynomials actually reach over the summation domain.
    pub fn target(&self) -> F {
        self.target
    }

    pub fn first_round_message(&self) -> FirstRoundMessage<D, F> {
        FirstRoundMessage {
            secret_root: self.secret_tree.root(),
            blinding_sum: self.blinding_sum,
        }
    }

    fn check_repetitions(&self, found: usize) -> Result<(), InnerProductError> {
        if found != self.config.repetitions() {
            return Err(InnerProductError::RepetitionChallenges {
                expected: self.config.repetitions(),
                found,
            });
        }
        Ok(())
    }

    /// Commits `h_r = ρ_r·h_f + h_γ` for every repetition. Answering a new
    /// batching vector restarts the later rounds.
    pub fn commit_quotients(&mut self, batching: &[F]) -> Result<MerkleRoot<D>, InnerProductError> {
        self.check_repetitions(batching.len())?;
        let domain = *self.config.codeword_domain();
        let evaluations: Vec<Vec<F>> = batching
            .par_iter()
            .map(|rho| {
                let quotient = &scale(&self.inner_quotient, *rho) + &self.blinding_quotient;
                let mut evaluations = domain.fft(&quotient.coeffs);
                bit_reverse_permutation(&mut evaluations);
                evaluations
            })
            .collect();
        let tree = MerkleTree::commit(
            &coset_matrix(&evaluations, self.config.coset_size()),
            LeafLayout::Columns,
        )?;
        let root = tree.root();
        debug!("inner product: committed {} quotient codewords", batching.len());

        self.quotients = Some(QuotientRound {
            batching: batching.to_vec(),
            evaluations,
            tree,
        });
        self.fri_provers.clear();
        Ok(root)
    }

    /// Builds the codeword `c_r` of every repetition from the committed
    /// quotients and hands it to FRI.
    pub fn combine(&mut self, combination: &[[F; 4]]) -> Result<(), InnerProductError> {
        let Some(quotients) = &self.quotients else {
            return Err(InnerProductError::QuotientsNotCommitted);
        };
        self.check_repetitions(combination.len())?;

        let codewords =
            self.combined_codewords(&quotients.batching, &quotients.evaluations, combination);
        let fri_provers = codewords
            .into_par_iter()
            .map(|codeword| FriProver::from_bit_reversed(self.config.fri().clone(), codeword))
            .collect::<Result<Vec<_>, FriError>>()?;
        self.fri_provers = fri_provers;
        Ok(())
    }

    /// Folds FRI round `round` of every repetition, `alphas[r]` for repetition `r`.
    pub fn fold_round(
        &mut self,
        round: usize,
        alphas: &[F],
    ) -> Result<Vec<FriRoundMessage<D, F>>, InnerProductError> {
        if self.fri_provers.is_empty() {
            return Err(InnerProductError::FriNotStarted);
        }
        self.check_repetitions(alphas.len())?;
        let messages = self
            .fri_provers
            .par_iter_mut()
            .zip(alphas.par_iter())
            .map(|(fri, alpha)| fri.fold_round(round, *alpha))
            .collect::<Result<Vec<_>, FriError>>()?;
        Ok(messages)
    }

    /// Opens the secret and quotient trees and every FRI layer at `queries`.
    pub fn query(&self, queries: &[usize]) -> Result<InnerProductProof<D, F>, InnerProductError> {
        let Some(quotients) = &self.quotients else {
            return Err(InnerProductError::QuotientsNotCommitted);
        };
        if self.fri_provers.is_empty() {
            return Err(InnerProductError::FriNotStarted);
        }
        let size = self.config.codeword_length();
        if let Some(position) = queries.iter().find(|position| **position >= size) {
            return Err(InnerProductError::QueryPosition {
                position: *position,
                size,
            });
        }

        let fri_proofs = self
            .fri_provers
            .par_iter()
            .map(|fri| fri.query(queries))
            .collect::<Result<Vec<_>, FriError>>()?;

        let leaves = queries
            .iter()
            .map(|position| self.config.fri().leaf_index(0, *position))
            .sorted_unstable()
            .dedup()
            .collect::<Vec<_>>();
        let secret_openings = MerkleTreeParameter::from_tree(&self.secret_tree, &leaves)?;
        let quotient_openings = MerkleTreeParameter::from_tree(&quotients.tree, &leaves)?;
        info!(
            "inner product proof: {} queries over {} leaves",
            queries.len(),
            leaves.len()
        );

        Ok(InnerProductProof {
            first_round: self.first_round_message(),
            quotient_root: quotients.tree.root(),
            secret_openings,
            quotient_openings,
            fri_proofs,
        })
    }

    // Σ p_i(x)·s_i(x) at every bit-reversed position
    fn inner_values(&self) -> Vec<F> {
        let secret = &self.secret_evaluations[..self.public_evaluations.len()];
        (0..self.config.codeword_length())
            .into_par_iter()
            .map(|position| {
                self.public_evaluations
                    .iter()
                    .zip(secret)
                    .map(|(p, s)| p[position] * s[position])
                    .sum()
            })
            .collect()
    }

    fn combined_codewords(
        &self,
        batching: &[F],
        quotients: &[Vec<F>],
        combination: &[[F; 4]],
    ) -> Vec<Vec<F>> {
        let positions: Vec<usize> = (0..self.config.codeword_length()).collect();
        let points = DomainPoint::batch(&self.config, &positions);
        let inner_values = self.inner_values();
        let blinding = &self.secret_evaluations[self.public_evaluations.len()];

        batching
            .par_iter()
            .zip(combination.par_iter())
            .zip(quotients.par_iter())
            .map(|((rho, coefficients), quotient)| {
                let rule = CombinationRule::new(
                    &self.config,
                    *rho,
                    *coefficients,
                    self.target,
                    self.blinding_sum,
                );
                izip!(&points, &inner_values, blinding, quotient)
                    .map(|(point, inner, gamma, h)| rule.evaluate(point, *inner, *gamma, *h))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::field::Goldilocks;
    use crate::inner_product::{InnerProductChallenges, InnerProductVerifier};
    use crate::poly::random_polynomial;
    use ark_ff::One;
    use ark_std::test_rng;
    use sha2::Sha256;

    fn make_config() -> InnerProductConfig<Goldilocks> {
        let summation = FieldSubset::multiplicative_coset(16, Goldilocks::from(3u64)).unwrap();
        let codeword = FieldSubset::multiplicative_coset(256, Goldilocks::from(256u64)).unwrap();
        InnerProductConfig::new(&summation, &codeword, 64, vec![2, 2], 2).unwrap()
    }

    #[test]
    fn test_rejects_bad_instances() {
        let mut rng = test_rng();
        let public = vec![random_polynomial::<Goldilocks, _>(20, &mut rng)];
        let blinding = random_polynomial::<Goldilocks, _>(64, &mut rng);

        let result = InnerProductProver::<Sha256, _>::new(
            make_config(),
            public.clone(),
            vec![],
            blinding.clone(),
        );
        assert!(matches!(
            result,
            Err(InnerProductError::MismatchedPairs {
                public: 1,
                secret: 0
            })
        ));

        let result = InnerProductProver::<Sha256, _>::new(
            make_config(),
            public.clone(),
            vec![random_polynomial::<Goldilocks, _>(46, &mut rng)],
            blinding.clone(),
        );
        assert!(matches!(
            result,
            Err(InnerProductError::DegreeBoundExceeded {
                degree: 64,
                bound: 64
            })
        ));

        let result = InnerProductProver::<Sha256, _>::new(
            make_config(),
            public,
            vec![random_polynomial::<Goldilocks, _>(10, &mut rng)],
            random_polynomial::<Goldilocks, _>(65, &mut rng),
        );
        assert!(matches!(
            result,
            Err(InnerProductError::DegreeBoundExceeded { degree: 64, .. })
        ));
    }

    #[test]
    fn test_first_round_and_target() {
        let mut rng = test_rng();
        let config = make_config();
        let public = vec![
            random_polynomial::<Goldilocks, _>(20, &mut rng),
            random_polynomial::<Goldilocks, _>(30, &mut rng),
        ];
        let secret = vec![
            random_polynomial::<Goldilocks, _>(40, &mut rng),
            random_polynomial::<Goldilocks, _>(30, &mut rng),
        ];
        let blinding = random_polynomial::<Goldilocks, _>(64, &mut rng);

        let summation = config.summation_domain().elements().collect::<Vec<_>>();
        let target: Goldilocks = summation
            .iter()
            .map(|a| {
                public
                    .iter()
                    .zip(&secret)
                    .map(|(p, s)| p.evaluate(a) * s.evaluate(a))
                    .sum::<Goldilocks>()
            })
            .sum();
        let blinding_sum: Goldilocks = summation.iter().map(|a| blinding.evaluate(a)).sum();

        let prover =
            InnerProductProver::<Sha256, _>::new(config, public, secret, blinding).unwrap();
        assert_eq!(prover.target(), target);
        let message = prover.first_round_message();
        assert_eq!(message.blinding_sum, blinding_sum);
        assert_eq!(message.secret_root, prover.secret_tree.root());
        // three codewords, four positions per leaf
        assert_eq!(prover.secret_tree.leaf_width(), 12);
        assert_eq!(prover.secret_tree.leaf_count(), 64);
    }

    type Prover = InnerProductProver<Sha256, Goldilocks>;

    fn make_prover() -> (Vec<DensePolynomial<Goldilocks>>, Prover) {
        let mut rng = test_rng();
        let public: Vec<_> = (0..2)
            .map(|_| random_polynomial::<Goldilocks, _>(17, &mut rng))
            .collect();
        let secret: Vec<_> = (0..2)
            .map(|_| random_polynomial::<Goldilocks, _>(40, &mut rng))
            .collect();
        let blinding = random_polynomial::<Goldilocks, _>(64, &mut rng);
        let prover =
            InnerProductProver::new(make_config(), public.clone(), secret, blinding).unwrap();
        (public, prover)
    }

    #[test]
    fn test_rounds_run_in_order() {
        let mut rng = test_rng();
        let (public, mut prover) = make_prover();
        let verifier = InnerProductVerifier::new(make_config(), public, prover.target());
        let combination = verifier.sample_combination(&mut rng);
        let alphas = verifier.sample_folding(&mut rng);

        assert!(matches!(
            prover.combine(&combination),
            Err(InnerProductError::QuotientsNotCommitted)
        ));
        assert!(matches!(
            prover.query(&[0]),
            Err(InnerProductError::QuotientsNotCommitted)
        ));
        assert!(matches!(
            prover.commit_quotients(&[Goldilocks::one()]),
            Err(InnerProductError::RepetitionChallenges {
                expected: 2,
                found: 1
            })
        ));

        let batching = verifier.sample_batching(&mut rng);
        let root = prover.commit_quotients(&batching).unwrap();
        assert_eq!(prover.quotients.as_ref().unwrap().tree.leaf_width(), 8);
        assert!(matches!(
            prover.fold_round(0, &alphas),
            Err(InnerProductError::FriNotStarted)
        ));

        prover.combine(&combination).unwrap();
        assert!(matches!(
            prover.fold_round(1, &alphas),
            Err(InnerProductError::RoundOrder { .. })
        ));
        assert!(matches!(
            prover.query(&[0]),
            Err(InnerProductError::RoundOrder { .. })
        ));
        assert_eq!(prover.fold_round(0, &alphas).unwrap().len(), 2);
        prover.fold_round(1, &alphas).unwrap();

        let proof = prover.query(&[0, 255]).unwrap();
        assert_eq!(proof.quotient_root, root);
        assert!(matches!(
            prover.query(&[256]),
            Err(InnerProductError::QueryPosition {
                position: 256,
                size: 256
            })
        ));

        // a new batching vector discards the FRI state built on the old one
        prover.commit_quotients(&batching).unwrap();
        assert!(matches!(
            prover.fold_round(0, &alphas),
            Err(InnerProductError::FriNotStarted)
        ));
    }

    #[test]
    fn test_quotient_is_bound_before_combination() {
        let mut rng = test_rng();
        let config = make_config();
        let (public, mut prover) = make_prover();
        let false_target = prover.target() + Goldilocks::one();
        prover.target = false_target;
        let verifier = InnerProductVerifier::new(config.clone(), public, false_target);

        let batching = verifier.sample_batching(&mut rng);
        // quotients chosen so the combined codeword vanishes under guessed coefficients
        let guess = verifier.sample_combination(&mut rng);
        let positions: Vec<usize> = (0..config.codeword_length()).collect();
        let points = DomainPoint::batch(&config, &positions);
        let inner_values = prover.inner_values();
        let blinding = prover.secret_evaluations[prover.public_evaluations.len()].clone();
        let forged: Vec<Vec<Goldilocks>> = batching
            .iter()
            .zip(&guess)
            .map(|(rho, coefficients)| {
                let rule = CombinationRule::new(
                    &config,
                    *rho,
                    *coefficients,
                    false_target,
                    prover.blinding_sum,
                );
                izip!(&points, &inner_values, &blinding)
                    .map(|(point, inner, gamma)| {
                        let at_zero = rule.evaluate(point, *inner, *gamma, Goldilocks::zero());
                        let at_one = rule.evaluate(point, *inner, *gamma, Goldilocks::one());
                        -at_zero / (at_one - at_zero)
                    })
                    .collect()
            })
            .collect();
        let zeroed = prover.combined_codewords(&batching, &forged, &guess);
        assert!(zeroed.iter().flatten().all(|value| value.is_zero()));

        let tree = MerkleTree::commit(
            &coset_matrix(&forged, config.coset_size()),
            LeafLayout::Columns,
        )
        .unwrap();
        prover.quotients = Some(QuotientRound {
            batching: batching.clone(),
            evaluations: forged,
            tree,
        });

        let combination = verifier.sample_combination(&mut rng);
        prover.combine(&combination).unwrap();
        let rounds = config.fri().num_rounds();
        let folding: Vec<Vec<Goldilocks>> = (0..rounds)
            .map(|_| verifier.sample_folding(&mut rng))
            .collect();
        for (round, alphas) in folding.iter().enumerate() {
            prover.fold_round(round, alphas).unwrap();
        }
        let queries = verifier.sample_queries(12, &mut rng);
        let challenges = InnerProductChallenges::from_rounds(
            batching.clone(),
            combination.clone(),
            &folding,
        );
        let proof = prover.query(&queries).unwrap();
        assert!(!verifier.verify(&proof, &challenges, &queries));

        // FRI on the codeword the guess would have produced
        prover.fri_provers = (0..config.repetitions())
            .map(|_| {
                let zero = vec![Goldilocks::zero(); config.codeword_length()];
                FriProver::from_bit_reversed(config.fri().clone(), zero).unwrap()
            })
            .collect();
        for (round, alphas) in folding.iter().enumerate() {
            prover.fold_round(round, alphas).unwrap();
        }
        let proof = prover.query(&queries).unwrap();
        assert!(!verifier.verify(&proof, &challenges, &queries));
    }
}

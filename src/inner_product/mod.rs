//! Zero-knowledge batched sumcheck for `Σ_{a ∈ H} Σ_i p_i(a)·s_i(a) = T`,
//! reduced to FRI on a virtual oracle.
//!
//! For each repetition the prover forms `f = ρ·Σ p_i s_i + γ` and splits it as
//! `f = Z_H·h + r`. The sum over `H` is `|H|·r(0)`, so the claim holds iff
//! `g = (f - Z_H·h - (ρT + Γ)/|H|) / x` is a polynomial. FRI then tests
//! `a_0 h + a_1 x^{|H|} h + a_2 g + a_3 x^{D-|H|+1} g` against degree `D`,
//! which bounds `h` below `D - |H|` and `g` below `|H| - 1` at once.
pub mod prover;
pub mod verifier;

pub use prover::InnerProductProver;
pub use verifier::InnerProductVerifier;

use crate::domain::{FieldSubset, MultiplicativeCoset};
use crate::error::{FriError, InnerProductError};
use crate::fri::{FriConfig, FriProof, InitialOracle};
use crate::merkle::{MerkleRoot, MerkleTreeParameter};
use crate::poly::VanishingPolynomial;
use crate::util::bit_reverse;
use ark_ff::{batch_inversion, FftField};
use ark_std::rand::Rng;
use digest::Digest;
use log::info;
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct InnerProductConfig<F: FftField> {
    summation_domain: MultiplicativeCoset<F>,
    fri: FriConfig<F>,
    repetitions: usize,
    summation_size_inverse: F,
}

impl<F: FftField> InnerProductConfig<F> {
    pub fn new(
        summation_domain: &FieldSubset<F>,
        codeword_domain: &FieldSubset<F>,
        degree_bound: usize,
        localization: Vec<usize>,
        repetitions: usize,
    ) -> Result<Self, InnerProductError> {
        let summation = *summation_domain
            .as_multiplicative()
            .ok_or(FriError::AdditiveDomain)?;
        if repetitions == 0 {
            return Err(InnerProductError::NoRepetitions);
        }
        if summation.size() >= degree_bound {
            return Err(InnerProductError::SummationDomainTooLarge {
                size: summation.size(),
                bound: degree_bound,
            });
        }
        let summation_size_inverse = F::from(summation.size() as u64).inverse().ok_or(
            InnerProductError::SummationSizeNotInvertible {
                size: summation.size(),
            },
        )?;
        let fri = FriConfig::new(codeword_domain, degree_bound, localization)?
            .with_initial_oracle(InitialOracle::Virtual);

        info!(
            "inner product over {} points, codewords of {} points, {repetitions} repetitions",
            summation.size(),
            fri.codeword_length()
        );
        Ok(Self {
            summation_domain: summation,
            fri,
            repetitions,
            summation_size_inverse,
        })
    }

    pub fn summation_domain(&self) -> &MultiplicativeCoset<F> {
        &self.summation_domain
    }

    pub fn codeword_domain(&self) -> &MultiplicativeCoset<F> {
        self.fri.domain(0)
    }

    pub fn fri(&self) -> &FriConfig<F> {
        &self.fri
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn degree_bound(&self) -> usize {
        self.fri.degree_bound()
    }

    pub fn codeword_length(&self) -> usize {
        self.fri.codeword_length()
    }

    /// Number of codeword positions per committed leaf.
    pub fn coset_size(&self) -> usize {
        self.fri.coset_size(0)
    }

    pub(crate) fn vanishing_polynomial(&self) -> VanishingPolynomial<F> {
        self.summation_domain.vanishing_polynomial()
    }
}

/// Verifier randomness for one repetition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepetitionChallenges<F: FftField> {
    pub batching: F,
    pub combination: [F; 4],
    pub folding: Vec<F>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductChallenges<F: FftField> {
    pub repetitions: Vec<RepetitionChallenges<F>>,
}

impl<F: FftField> InnerProductChallenges<F> {
    /// Regroups challenges drawn round by round. `folding[i][r]` is the
    /// folding challenge of FRI round `i` in repetition `r`.
    pub fn from_rounds(batching: Vec<F>, combination: Vec<[F; 4]>, folding: &[Vec<F>]) -> Self {
        let repetitions = batching
            .into_iter()
            .zip(combination)
            .enumerate()
            .map(|(repetition, (batching, combination))| RepetitionChallenges {
                batching,
                combination,
                folding: folding
                    .iter()
                    .filter_map(|round| round.get(repetition).copied())
                    .collect(),
            })
            .collect();
        Self { repetitions }
    }
}

pub struct FirstRoundMessage<D: Digest, F: FftField> {
    pub secret_root: MerkleRoot<D>,
    /// `Σ_{a ∈ H} γ(a)`
    pub blinding_sum: F,
}

impl<D: Digest, F: FftField> Clone for FirstRoundMessage<D, F> {
    fn clone(&self) -> Self {
        Self {
            secret_root: self.secret_root.clone(),
            blinding_sum: self.blinding_sum,
        }
    }
}

pub struct InnerProductProof<D: Digest, F: FftField> {
    pub first_round: FirstRoundMessage<D, F>,
    pub quotient_root: MerkleRoot<D>,
    pub secret_openings: MerkleTreeParameter<D, F>,
    pub quotient_openings: MerkleTreeParameter<D, F>,
    pub fri_proofs: Vec<FriProof<D, F>>,
}

impl<D: Digest, F: FftField> Clone for InnerProductProof<D, F> {
    fn clone(&self) -> Self {
        Self {
            first_round: self.first_round.clone(),
            quotient_root: self.quotient_root.clone(),
            secret_openings: self.secret_openings.clone(),
            quotient_openings: self.quotient_openings.clone(),
            fri_proofs: self.fri_proofs.clone(),
        }
    }
}

impl<D: Digest, F: FftField> InnerProductProof<D, F> {
    pub fn num_digests(&self) -> usize {
        let fri: usize = self.fri_proofs.iter().map(FriProof::num_digests).sum();
        2 + self.secret_openings.path_length() + self.quotient_openings.path_length() + fri
    }

    pub fn num_field_elements(&self) -> usize {
        let fri: usize = self
            .fri_proofs
            .iter()
            .map(FriProof::num_field_elements)
            .sum();
        1 + self.secret_openings.num_field_elements()
            + self.quotient_openings.num_field_elements()
            + fri
    }
}

/// Everything a verifier checks after an interactive run.
pub struct Interaction<D: Digest, F: FftField> {
    pub challenges: InnerProductChallenges<F>,
    pub queries: Vec<usize>,
    pub proof: InnerProductProof<D, F>,
}

/// Runs the rounds in order, drawing each challenge from `rng` only after the
/// prover has committed the message it answers.
pub fn run_interaction<D: Digest, F: FftField, R: Rng + ?Sized>(
    prover: &mut InnerProductProver<D, F>,
    verifier: &InnerProductVerifier<F>,
    query_count: usize,
    rng: &mut R,
) -> Result<Interaction<D, F>, InnerProductError> {
    let batching = verifier.sample_batching(rng);
    prover.commit_quotients(&batching)?;

    let combination = verifier.sample_combination(rng);
    prover.combine(&combination)?;

    let rounds = verifier.config().fri().num_rounds();
    let mut folding = Vec::with_capacity(rounds);
    for round in 0..rounds {
        let alphas = verifier.sample_folding(rng);
        prover.fold_round(round, &alphas)?;
        folding.push(alphas);
    }

    let queries = verifier.sample_queries(query_count, rng);
    let proof = prover.query(&queries)?;
    Ok(Interaction {
        challenges: InnerProductChallenges::from_rounds(batching, combination, &folding),
        queries,
        proof,
    })
}

/// Codeword point together with the powers the combination rule needs.
pub(crate) struct DomainPoint<F> {
    inverse: F,
    summation_power: F,
    vanishing: F,
    degree_shift: F,
}

impl<F: FftField> DomainPoint<F> {
    /// Points behind bit-reversed codeword `positions`.
    pub(crate) fn batch(config: &InnerProductConfig<F>, positions: &[usize]) -> Vec<Self> {
        let domain = config.codeword_domain();
        let summation_size = config.summation_domain().size() as u64;
        let shift_exponent = (config.degree_bound() - config.summation_domain().size() + 1) as u64;
        let vanishing = config.vanishing_polynomial();

        let elements: Vec<F> = positions
            .par_iter()
            .map(|position| domain.element(bit_reverse(*position, domain.dimension())))
            .collect();
        let mut inverses = elements.clone();
        batch_inversion(&mut inverses);

        elements
            .par_iter()
            .zip(inverses.par_iter())
            .map(|(x, inverse)| DomainPoint {
                inverse: *inverse,
                summation_power: x.pow([summation_size]),
                vanishing: vanishing.evaluate(x),
                degree_shift: x.pow([shift_exponent]),
            })
            .collect()
    }
}

/// Pointwise rule turning oracle values into the codeword FRI tests. Prover
/// and verifier apply the same rule.
pub(crate) struct CombinationRule<F> {
    batching: F,
    combination: [F; 4],
    // (ρ·T + Γ) / |H|
    claimed_mean: F,
}

impl<F: FftField> CombinationRule<F> {
    pub(crate) fn new(
        config: &InnerProductConfig<F>,
        batching: F,
        combination: [F; 4],
        target: F,
        blinding_sum: F,
    ) -> Self {
        Self {
            batching,
            combination,
            claimed_mean: (batching * target + blinding_sum) * config.summation_size_inverse,
        }
    }

    /// `inner = Σ p_i(x) s_i(x)`, `blinding = γ(x)`, `quotient = h(x)`.
    pub(crate) fn evaluate(&self, point: &DomainPoint<F>, inner: F, blinding: F, quotient: F) -> F {
        let combined = self.batching * inner + blinding;
        let reduced =
            (combined - point.vanishing * quotient - self.claimed_mean) * point.inverse;
        let [a0, a1, a2, a3] = self.combination;
        a0 * quotient
            + a1 * point.summation_power * quotient
            + a2 * reduced
            + a3 * point.degree_shift * reduced
    }
}

/// Rearranges bit-reversed codewords so that column `k` holds leaf `k`:
/// row `i·m + j` carries position `k·m + j` of codeword `i`.
pub(crate) fn coset_matrix<F: FftField>(codewords: &[Vec<F>], coset_size: usize) -> Vec<Vec<F>> {
    codewords
        .iter()
        .flat_map(|codeword| {
            (0..coset_size).map(move |offset| {
                codeword
                    .iter()
                    .skip(offset)
                    .step_by(coset_size)
                    .copied()
                    .collect()
            })
        })
        .collect()
}

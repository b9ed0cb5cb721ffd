//! FRI low-degree test over multiplicative cosets.
//!
//! Codewords are kept in bit-reversed order, so the `2^η` points folded
//! together in a round form a contiguous block. That block is one Merkle leaf,
//! and a query position moves to the next round by dropping its low `η` bits.
pub mod prover;
pub mod verifier;

pub use prover::FriProver;
pub use verifier::FriVerifier;

use crate::domain::{FieldSubset, MultiplicativeCoset};
use crate::error::{DomainError, FriError};
use crate::merkle::{MerkleOpening, MerkleRoot};
use crate::util::{bit_reverse, bit_reverse_permutation};
use ark_ff::{batch_inversion, FftField};
use digest::Digest;
use log::info;
use rayon::prelude::*;

/// Whether round 0 is committed by the FRI prover itself or authenticated by
/// the caller (as when the codeword is a combination of other oracles).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialOracle {
    Committed,
    Virtual,
}

#[derive(Clone, Debug)]
pub struct FriConfig<F: FftField> {
    // domains[i] is the evaluation domain of round i, the last one holds the
    // final polynomial's codeword
    domains: Vec<MultiplicativeCoset<F>>,
    folding_subgroups: Vec<MultiplicativeCoset<F>>,
    localization: Vec<usize>,
    degree_bound: usize,
    initial_oracle: InitialOracle,
}

impl<F: FftField> FriConfig<F> {
    pub fn new(
        domain: &FieldSubset<F>,
        degree_bound: usize,
        localization: Vec<usize>,
    ) -> Result<Self, FriError> {
        let initial = *domain.as_multiplicative().ok_or(FriError::AdditiveDomain)?;
        if localization.is_empty() || localization.contains(&0) {
            return Err(FriError::InvalidLocalization);
        }
        let reduction: usize = localization.iter().sum();
        if reduction > initial.dimension() {
            return Err(FriError::LocalizationTooDeep {
                reduction,
                dimension: initial.dimension(),
            });
        }
        if degree_bound == 0 || degree_bound > initial.size() {
            return Err(FriError::InvalidDegreeBound {
                bound: degree_bound,
                size: initial.size(),
            });
        }
        // the final polynomial bounds the degree only up to a multiple of the
        // folding factor
        if degree_bound % (1 << reduction) != 0 {
            return Err(FriError::UnalignedDegreeBound {
                bound: degree_bound,
                factor: 1 << reduction,
            });
        }

        let mut domains = vec![initial];
        let mut folding_subgroups = Vec::with_capacity(localization.len());
        for log_factor in &localization {
            folding_subgroups.push(MultiplicativeCoset::subgroup(1 << *log_factor)?);
            let next = domains[domains.len() - 1].power(*log_factor)?;
            domains.push(next);
        }

        info!(
            "FRI over {} points, degree bound {degree_bound}, localization {localization:?}",
            initial.size()
        );
        Ok(Self {
            domains,
            folding_subgroups,
            localization,
            degree_bound,
            initial_oracle: InitialOracle::Committed,
        })
    }

    pub fn with_initial_oracle(mut self, initial_oracle: InitialOracle) -> Self {
        self.initial_oracle = initial_oracle;
        self
    }

    pub fn initial_oracle(&self) -> InitialOracle {
        self.initial_oracle
    }

    pub fn num_rounds(&self) -> usize {
        self.localization.len()
    }

    pub fn localization(&self) -> &[usize] {
        &self.localization
    }

    pub fn degree_bound(&self) -> usize {
        self.degree_bound
    }

    /// Number of coefficients the final polynomial may have.
    pub fn final_degree_bound(&self) -> usize {
        let reduction: usize = self.localization.iter().sum();
        self.degree_bound >> reduction
    }

    pub fn domain(&self, round: usize) -> &MultiplicativeCoset<F> {
        &self.domains[round]
    }

    pub fn final_domain(&self) -> &MultiplicativeCoset<F> {
        &self.domains[self.num_rounds()]
    }

    pub fn codeword_length(&self) -> usize {
        self.domains[0].size()
    }

    pub fn coset_size(&self, round: usize) -> usize {
        1 << self.localization[round]
    }

    /// Leaf of round `round` that holds `position` of the initial codeword.
    pub fn leaf_index(&self, round: usize, position: usize) -> usize {
        let shift: usize = self.localization[..=round].iter().sum();
        position >> shift
    }

    /// First point of the coset stored in `leaf` of round `round`.
    pub fn coset_base(&self, round: usize, leaf: usize) -> F {
        let domain = &self.domains[round];
        domain.element(bit_reverse(
            leaf << self.localization[round],
            domain.dimension(),
        ))
    }

    pub(crate) fn folding_subgroup(&self, round: usize) -> &MultiplicativeCoset<F> {
        &self.folding_subgroups[round]
    }
}

/// Message sent by the prover after folding a round.
pub enum FriRoundMessage<D: Digest, F: FftField> {
    Commitment(MerkleRoot<D>),
    FinalPolynomial(Vec<F>),
}

pub struct FriLayerProof<D: Digest, F: FftField> {
    pub round: usize,
    pub root: MerkleRoot<D>,
    /// openings sorted by leaf index, one per distinct queried leaf
    pub openings: Vec<MerkleOpening<D, F>>,
}

impl<D: Digest, F: FftField> Clone for FriLayerProof<D, F> {
    fn clone(&self) -> Self {
        Self {
            round: self.round,
            root: self.root.clone(),
            openings: self.openings.clone(),
        }
    }
}

impl<D: Digest, F: FftField> FriLayerProof<D, F> {
    pub(crate) fn leaf(&self, index: usize) -> Option<&[F]> {
        self.openings
            .binary_search_by_key(&index, |opening| opening.index)
            .ok()
            .map(|i| self.openings[i].values.as_slice())
    }
}

pub struct FriProof<D: Digest, F: FftField> {
    pub layers: Vec<FriLayerProof<D, F>>,
    pub final_poly: Vec<F>,
}

impl<D: Digest, F: FftField> Clone for FriProof<D, F> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
            final_poly: self.final_poly.clone(),
        }
    }
}

impl<D: Digest, F: FftField> FriProof<D, F> {
    /// Roots plus authentication path digests.
    pub fn num_digests(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| {
                1 + layer
                    .openings
                    .iter()
                    .map(|opening| opening.path.len())
                    .sum::<usize>()
            })
            .sum()
    }

    pub fn num_field_elements(&self) -> usize {
        let opened: usize = self
            .layers
            .iter()
            .flat_map(|layer| layer.openings.iter())
            .map(|opening| opening.values.len())
            .sum();
        opened + self.final_poly.len()
    }
}

pub(crate) fn evaluate_polynomial<F: FftField>(coeffs: &[F], point: F) -> F {
    coeffs
        .iter()
        .rev()
        .fold(F::zero(), |acc, coeff| acc * point + coeff)
}

/// Interpolates a bit-reversed coset `{x_0 · μ}` and evaluates the interpolant
/// at `α`, where `point = α / x_0`.
pub(crate) fn fold_coset<F: FftField>(
    coset: &[F],
    point: F,
    subgroup: &MultiplicativeCoset<F>,
) -> Result<F, DomainError> {
    let mut natural = coset.to_vec();
    bit_reverse_permutation(&mut natural);
    let interpolant = subgroup.ifft(&natural)?;
    Ok(evaluate_polynomial(&interpolant, point))
}

/// Folds a whole bit-reversed codeword of round `round` with challenge `alpha`.
pub(crate) fn fold_codeword<F: FftField>(
    config: &FriConfig<F>,
    round: usize,
    codeword: &[F],
    alpha: F,
) -> Result<Vec<F>, FriError> {
    let coset_size = config.coset_size(round);
    let mut base_inverses: Vec<F> = (0..codeword.len() / coset_size)
        .into_par_iter()
        .map(|leaf| config.coset_base(round, leaf))
        .collect();
    batch_inversion(&mut base_inverses);

    let subgroup = config.folding_subgroup(round);
    let folded = codeword
        .par_chunks(coset_size)
        .zip(base_inverses.par_iter())
        .map(|(coset, base_inverse)| fold_coset(coset, alpha * base_inverse, subgroup))
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(folded)
}

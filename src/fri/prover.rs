use super::{fold_codeword, FriConfig, FriLayerProof, FriProof, FriRoundMessage, InitialOracle};
use crate::error::{DomainError, FriError, MerkleError};
use crate::merkle::{MerkleRoot, MerkleTree};
use crate::util::bit_reverse_permutation;
use ark_ff::FftField;
use ark_poly::univariate::DensePolynomial;
use ark_poly::DenseUVPolynomial;
use digest::Digest;
use itertools::Itertools;
use log::{debug, info};

struct FriLayer<D: Digest, F: FftField> {
    // bit-reversed evaluations on the round domain
    codeword: Vec<F>,
    tree: Option<MerkleTree<D, F>>,
}

pub struct FriProver<D: Digest, F: FftField> {
    config: FriConfig<F>,
    layers: Vec<FriLayer<D, F>>,
    final_poly: Option<Vec<F>>,
}

fn commit_layer<D: Digest, F: FftField>(
    codeword: &[F],
    coset_size: usize,
) -> Result<MerkleTree<D, F>, MerkleError> {
    MerkleTree::from_leaves(codeword.chunks(coset_size).map(<[F]>::to_vec).collect())
}

impl<D: Digest, F: FftField> FriProver<D, F> {
    /// Starts from evaluations in the canonical order of the initial domain.
    pub fn new(config: FriConfig<F>, mut evaluations: Vec<F>) -> Result<Self, FriError> {
        if evaluations.len() != config.codeword_length() {
            return Err(DomainError::EvaluationLength {
                expected: config.codeword_length(),
                found: evaluations.len(),
            }
            .into());
        }
        bit_reverse_permutation(&mut evaluations);
        Self::from_bit_reversed(config, evaluations)
    }

    /// Starts from evaluations already laid out in bit-reversed order.
    pub fn from_bit_reversed(config: FriConfig<F>, codeword: Vec<F>) -> Result<Self, FriError> {
        if codeword.len() != config.codeword_length() {
            return Err(DomainError::EvaluationLength {
                expected: config.codeword_length(),
                found: codeword.len(),
            }
            .into());
        }

        let tree = match config.initial_oracle() {
            InitialOracle::Committed => Some(commit_layer(&codeword, config.coset_size(0))?),
            InitialOracle::Virtual => None,
        };
        info!(
            "FRI prover ready with {} rounds, initial oracle {:?}",
            config.num_rounds(),
            config.initial_oracle()
        );

        Ok(Self {
            config,
            layers: vec![FriLayer { codeword, tree }],
            final_poly: None,
        })
    }

    pub fn config(&self) -> &FriConfig<F> {
        &self.config
    }

    pub fn initial_commitment(&self) -> Option<MerkleRoot<D>> {
        self.layers[0].tree.as_ref().map(MerkleTree::root)
    }

    fn pending_round(&self) -> usize {
        match self.final_poly {
            Some(_) => self.config.num_rounds(),
            None => self.layers.len() - 1,
        }
    }

    /// Folds round `round` with the verifier's challenge. Rounds must be folded
    /// in order; the last one yields the final polynomial.
    pub fn fold_round(
        &mut self,
        round: usize,
        alpha: F,
    ) -> Result<FriRoundMessage<D, F>, FriError> {
        let expected = self.pending_round();
        if round != expected || round >= self.config.num_rounds() {
            return Err(FriError::RoundOrder {
                requested: round,
                expected,
            });
        }

        let folded = fold_codeword(&self.config, round, &self.layers[round].codeword, alpha)?;
        let next = round + 1;
        if next < self.config.num_rounds() {
            let tree = commit_layer::<D, F>(&folded, self.config.coset_size(next))?;
            let root = tree.root();
            debug!("FRI round {round}: committed {} folded points", folded.len());
            self.layers.push(FriLayer {
                codeword: folded,
                tree: Some(tree),
            });
            return Ok(FriRoundMessage::Commitment(root));
        }

        let mut natural = folded;
        bit_reverse_permutation(&mut natural);
        let coeffs = self.config.final_domain().ifft(&natural)?;
        let final_poly = DensePolynomial::from_coefficients_vec(coeffs).coeffs;
        debug!(
            "FRI round {round}: final polynomial with {} coefficients",
            final_poly.len()
        );
        self.final_poly = Some(final_poly.clone());
        Ok(FriRoundMessage::FinalPolynomial(final_poly))
    }

    /// Opens every committed layer at the leaves touched by `positions`, given
    /// in the initial domain.
    pub fn query(&self, positions: &[usize]) -> Result<FriProof<D, F>, FriError> {
        let Some(final_poly) = &self.final_poly else {
            return Err(FriError::RoundOrder {
                requested: self.config.num_rounds(),
                expected: self.pending_round(),
            });
        };
        let size = self.config.codeword_length();
        if let Some(position) = positions.iter().find(|position| **position >= size) {
            return Err(FriError::QueryPosition {
                position: *position,
                size,
            });
        }

        let layers = self
            .layers
            .iter()
            .enumerate()
            .filter_map(|(round, layer)| layer.tree.as_ref().map(|tree| (round, tree)))
            .map(|(round, tree)| -> Result<FriLayerProof<D, F>, FriError> {
                let leaves = positions
                    .iter()
                    .map(|position| self.config.leaf_index(round, *position))
                    .sorted_unstable()
                    .dedup()
                    .collect::<Vec<_>>();
                Ok(FriLayerProof {
                    round,
                    root: tree.root(),
                    openings: tree.open_many(&leaves)?,
                })
            })
            .collect::<Result<Vec<_>, FriError>>()?;

        Ok(FriProof {
            layers,
            final_poly: final_poly.clone(),
        })
    }

    /// Runs every folding round and answers the queries. The challenges must
    /// not be known to whoever chose the evaluations; an interactive verifier
    /// sends each `α_i` through `fold_round` after the previous commitment.
    pub fn prove(
        &mut self,
        challenges: &[F],
        positions: &[usize],
    ) -> Result<FriProof<D, F>, FriError> {
        if challenges.len() != self.config.num_rounds() {
            return Err(FriError::FoldingChallenges {
                expected: self.config.num_rounds(),
                found: challenges.len(),
            });
        }
        for (round, alpha) in challenges.iter().enumerate() {
            self.fold_round(round, *alpha)?;
        }
        self.query(positions)
    }
}

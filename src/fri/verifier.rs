use super::{evaluate_polynomial, fold_coset, FriConfig, FriProof, InitialOracle};
use crate::util::bit_reverse;
use ark_ff::FftField;
use ark_std::rand::Rng;
use digest::Digest;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

pub struct FriVerifier<F: FftField> {
    config: FriConfig<F>,
}

impl<F: FftField> FriVerifier<F> {
    pub fn new(config: FriConfig<F>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FriConfig<F> {
        &self.config
    }

    /// One folding challenge per round.
    pub fn sample_challenges<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<F> {
        (0..self.config.num_rounds()).map(|_| F::rand(rng)).collect()
    }

    /// Sorted, distinct query positions in the initial domain.
    pub fn sample_positions<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<usize> {
        let size = self.config.codeword_length();
        (0..count)
            .map(|_| rng.gen_range(0..size))
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Verifies a proof whose round 0 was committed by the FRI prover.
    pub fn verify<D: Digest>(
        &self,
        proof: &FriProof<D, F>,
        challenges: &[F],
        positions: &[usize],
    ) -> bool {
        if self.config.initial_oracle() != InitialOracle::Committed {
            debug!("FRI: initial oracle is virtual, round 0 cosets are required");
            return false;
        }
        self.check(proof, challenges, positions, None)
    }

    /// Verifies a proof whose round 0 is virtual. `initial_cosets[q]` is the
    /// already authenticated round-0 coset holding `positions[q]`, in
    /// bit-reversed order.
    pub fn verify_with_initial_cosets<D: Digest>(
        &self,
        proof: &FriProof<D, F>,
        challenges: &[F],
        positions: &[usize],
        initial_cosets: &[Vec<F>],
    ) -> bool {
        if self.config.initial_oracle() != InitialOracle::Virtual {
            debug!("FRI: round 0 is committed, cosets must come from the proof");
            return false;
        }
        if initial_cosets.len() != positions.len() {
            debug!(
                "FRI: {} initial cosets for {} positions",
                initial_cosets.len(),
                positions.len()
            );
            return false;
        }
        self.check(proof, challenges, positions, Some(initial_cosets))
    }

    fn check<D: Digest>(
        &self,
        proof: &FriProof<D, F>,
        challenges: &[F],
        positions: &[usize],
        initial_cosets: Option<&[Vec<F>]>,
    ) -> bool {
        let rounds = self.config.num_rounds();
        if challenges.len() != rounds {
            debug!("FRI: expected {rounds} challenges, found {}", challenges.len());
            return false;
        }
        let first_committed = usize::from(initial_cosets.is_some());
        if proof.layers.len() != rounds - first_committed {
            debug!("FRI: proof carries {} layers", proof.layers.len());
            return false;
        }

        for (offset, layer) in proof.layers.iter().enumerate() {
            let round = first_committed + offset;
            if layer.round != round {
                debug!("FRI: layer {offset} claims round {}", layer.round);
                return false;
            }
            if !layer.openings.windows(2).all(|pair| pair[0].index < pair[1].index) {
                debug!("FRI round {round}: openings are not sorted");
                return false;
            }
            let coset_size = self.config.coset_size(round);
            let depth = self.config.domain(round).dimension() - self.config.localization()[round];
            let authenticated = layer
                .openings
                .par_iter()
                .all(|opening| layer.root.verify(opening, coset_size, depth));
            if !authenticated {
                debug!("FRI round {round}: opening does not match the commitment");
                return false;
            }
        }

        if proof.final_poly.len() > self.config.final_degree_bound() {
            debug!(
                "FRI: final polynomial has {} coefficients, bound is {}",
                proof.final_poly.len(),
                self.config.final_degree_bound()
            );
            return false;
        }

        let size = self.config.codeword_length();
        positions.par_iter().enumerate().all(|(query, position)| {
            if *position >= size {
                debug!("FRI: position {position} outside the domain");
                return false;
            }
            let initial = initial_cosets.map(|cosets| cosets[query].as_slice());
            self.check_query(proof, challenges, *position, initial)
        })
    }

    fn check_query<D: Digest>(
        &self,
        proof: &FriProof<D, F>,
        challenges: &[F],
        mut position: usize,
        initial_coset: Option<&[F]>,
    ) -> bool {
        let first_committed = usize::from(initial_coset.is_some());
        let mut folded: Option<F> = None;

        for (round, alpha) in challenges.iter().enumerate() {
            let log_factor = self.config.localization()[round];
            let coset_size = 1 << log_factor;
            let leaf = position >> log_factor;

            let coset = match initial_coset {
                Some(coset) if round == 0 => Some(coset),
                _ => proof.layers[round - first_committed].leaf(leaf),
            };
            let Some(coset) = coset else {
                debug!("FRI round {round}: leaf {leaf} was not opened");
                return false;
            };
            if coset.len() != coset_size {
                debug!("FRI round {round}: coset of size {}", coset.len());
                return false;
            }
            if let Some(expected) = folded {
                if coset[position & (coset_size - 1)] != expected {
                    debug!("FRI round {round}: folding mismatch at leaf {leaf}");
                    return false;
                }
            }

            let Some(base_inverse) = self.config.coset_base(round, leaf).inverse() else {
                return false;
            };
            let subgroup = self.config.folding_subgroup(round);
            match fold_coset(coset, *alpha * base_inverse, subgroup) {
                Ok(value) => folded = Some(value),
                Err(_) => return false,
            }
            position = leaf;
        }

        let final_domain = self.config.final_domain();
        let point = final_domain.element(bit_reverse(position, final_domain.dimension()));
        let matches = folded == Some(evaluate_polynomial(&proof.final_poly, point));
        if !matches {
            debug!("FRI: final polynomial disagrees at position {position}");
        }
        matches
    }
}

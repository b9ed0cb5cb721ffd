//! Evaluation domains: multiplicative cosets of two-adic subgroups and affine
//! subspaces of binary fields.
mod coset;
mod subspace;

pub use coset::MultiplicativeCoset;
pub use subspace::AffineSubspace;

use crate::error::DomainError;
use crate::poly::VanishingPolynomial;
use ark_ff::FftField;
use ark_poly::univariate::DensePolynomial;
use itertools::Either;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSubset<F: FftField> {
    Multiplicative(MultiplicativeCoset<F>),
    Affine(AffineSubspace<F>),
}

impl<F: FftField> FieldSubset<F> {
    pub fn multiplicative_coset(size: usize, shift: F) -> Result<Self, DomainError> {
        MultiplicativeCoset::new(size, shift).map(Self::Multiplicative)
    }

    pub fn subgroup(size: usize) -> Result<Self, DomainError> {
        MultiplicativeCoset::subgroup(size).map(Self::Multiplicative)
    }

    pub fn affine_subspace(basis: Vec<F>, shift: F) -> Result<Self, DomainError> {
        AffineSubspace::new(basis, shift).map(Self::Affine)
    }

    pub fn num_elements(&self) -> usize {
        match self {
            Self::Multiplicative(coset) => coset.size(),
            Self::Affine(subspace) => subspace.num_elements(),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::Multiplicative(coset) => coset.dimension(),
            Self::Affine(subspace) => subspace.dimension(),
        }
    }

    pub fn shift(&self) -> F {
        match self {
            Self::Multiplicative(coset) => coset.shift(),
            Self::Affine(subspace) => subspace.shift(),
        }
    }

    pub fn element(&self, index: usize) -> F {
        match self {
            Self::Multiplicative(coset) => coset.element(index),
            Self::Affine(subspace) => subspace.element(index),
        }
    }

    /// Lazily enumerates the domain in canonical order.
    pub fn all_elements(&self) -> impl Iterator<Item = F> + '_ {
        match self {
            Self::Multiplicative(coset) => Either::Left(coset.elements()),
            Self::Affine(subspace) => Either::Right(subspace.elements()),
        }
    }

    pub fn forward_transform(&self, coeffs: &[F]) -> Vec<F> {
        match self {
            Self::Multiplicative(coset) => coset.fft(coeffs),
            Self::Affine(subspace) => subspace.fft(coeffs),
        }
    }

    pub fn inverse_transform(&self, evaluations: &[F]) -> Result<Vec<F>, DomainError> {
        match self {
            Self::Multiplicative(coset) => coset.ifft(evaluations),
            Self::Affine(subspace) => subspace.ifft(evaluations),
        }
    }

    /// Maps `index` so that the first `2^subset_dim` positions cover a
    /// sub-domain. Affine subspaces already list their sub-spans first.
    pub fn reindex_by_subset(&self, subset_dim: usize, index: usize) -> usize {
        match self {
            Self::Multiplicative(coset) => coset.reindex_by_subset(subset_dim, index),
            Self::Affine(subspace) => {
                assert!(subset_dim <= subspace.dimension());
                index
            }
        }
    }

    pub fn vanishing_polynomial(&self) -> VanishingPolynomial<F> {
        match self {
            Self::Multiplicative(coset) => coset.vanishing_polynomial(),
            Self::Affine(subspace) => subspace.vanishing_polynomial(),
        }
    }

    pub fn as_multiplicative(&self) -> Option<&MultiplicativeCoset<F>> {
        match self {
            Self::Multiplicative(coset) => Some(coset),
            Self::Affine(_) => None,
        }
    }

    /// `Σ_{a ∈ self} poly(a)`. Over a coset the polynomial is evaluated on an
    /// extension with the same shift, large enough to hold it, and the
    /// positions of this coset are picked out with `reindex_by_subset`.
    pub fn sum_over_subset(&self, poly: &DensePolynomial<F>) -> Result<F, DomainError> {
        let coset = match self {
            Self::Multiplicative(coset) => coset,
            Self::Affine(subspace) => return Ok(subspace.fft(&poly.coeffs).into_iter().sum()),
        };

        let size = poly.coeffs.len().next_power_of_two().max(coset.size());
        let extended = MultiplicativeCoset::new(size, coset.shift())?;
        let evaluations = extended.fft(&poly.coeffs);
        Ok((0..coset.size())
            .map(|i| evaluations[extended.reindex_by_subset(coset.dimension(), i)])
            .sum())
    }
}

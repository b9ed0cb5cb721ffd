use crate::error::DomainError;
use crate::poly::VanishingPolynomial;
use crate::util::is_power_of_two;
use ark_ff::FftField;
use ark_poly::domain::Radix2EvaluationDomain;
use ark_poly::EvaluationDomain;

/// The coset `shift · <ω>` of a two-adic subgroup, in canonical order
/// `element(i) = shift · ω^i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultiplicativeCoset<F: FftField> {
    domain: Radix2EvaluationDomain<F>,
}

impl<F: FftField> MultiplicativeCoset<F> {
    pub fn new(size: usize, shift: F) -> Result<Self, DomainError> {
        if !is_power_of_two(size) {
            return Err(DomainError::InvalidDomain { size });
        }
        if shift.is_zero() {
            return Err(DomainError::ZeroShift);
        }
        let subgroup = Radix2EvaluationDomain::<F>::new(size)
            .ok_or(DomainError::UnsupportedDomainSize { size })?;
        if shift.is_one() {
            return Ok(Self { domain: subgroup });
        }
        let domain = subgroup
            .get_coset(shift)
            .ok_or(DomainError::UnsupportedDomainSize { size })?;
        Ok(Self { domain })
    }

    pub fn subgroup(size: usize) -> Result<Self, DomainError> {
        Self::new(size, F::one())
    }

    pub fn size(&self) -> usize {
        self.domain.size()
    }

    pub fn dimension(&self) -> usize {
        self.domain.log_size_of_group() as usize
    }

    pub fn shift(&self) -> F {
        self.domain.coset_offset()
    }

    pub fn generator(&self) -> F {
        self.domain.group_gen()
    }

    pub fn element(&self, index: usize) -> F {
        self.domain.element(index)
    }

    pub fn elements(&self) -> impl Iterator<Item = F> {
        self.domain.elements()
    }

    /// Evaluates a coefficient vector on the coset. Coefficients beyond the
    /// coset size wrap around through `x^n = shift^n`.
    pub fn fft(&self, coeffs: &[F]) -> Vec<F> {
        let size = self.size();
        if coeffs.is_empty() {
            return vec![F::zero(); size];
        }
        if coeffs.len() <= size {
            return self.domain.fft(coeffs);
        }

        let wrap = self.domain.coset_offset_pow_size();
        let mut folded = vec![F::zero(); size];
        let mut factor = F::one();
        for chunk in coeffs.chunks(size) {
            for (slot, coeff) in folded.iter_mut().zip(chunk) {
                *slot += *coeff * factor;
            }
            factor *= wrap;
        }
        self.domain.fft(&folded)
    }

    pub fn ifft(&self, evaluations: &[F]) -> Result<Vec<F>, DomainError> {
        if evaluations.len() != self.size() {
            return Err(DomainError::EvaluationLength {
                expected: self.size(),
                found: evaluations.len(),
            });
        }
        Ok(self.domain.ifft(evaluations))
    }

    /// Permutes indices so that the first `2^subset_dim` positions enumerate
    /// the sub-coset `shift · <ω^{n / 2^subset_dim}>` in its canonical order.
    pub fn reindex_by_subset(&self, subset_dim: usize, index: usize) -> usize {
        assert!(
            subset_dim <= self.dimension(),
            "subset of dimension {subset_dim} in a domain of dimension {}",
            self.dimension()
        );
        let subset_size = 1 << subset_dim;
        let ratio = self.size() >> subset_dim;
        (index % subset_size) * ratio + index / subset_size
    }

    /// The sub-coset with the same shift and `2^subset_dim` elements.
    pub fn subset(&self, subset_dim: usize) -> Result<Self, DomainError> {
        Self::new(1 << subset_dim, self.shift())
    }

    /// The image of the coset under `x ↦ x^{2^log_factor}`.
    pub fn power(&self, log_factor: usize) -> Result<Self, DomainError> {
        Self::new(
            self.size() >> log_factor,
            self.shift().pow([1u64 << log_factor]),
        )
    }

    pub fn vanishing_polynomial(&self) -> VanishingPolynomial<F> {
        VanishingPolynomial::Multiplicative {
            degree: self.size(),
            constant: self.domain.coset_offset_pow_size(),
        }
    }
}

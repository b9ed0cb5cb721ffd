use crate::error::DomainError;
use crate::poly::{sparse_divide, sparse_multiply, LinearizedPolynomial, VanishingPolynomial};
use ark_ff::Field;

pub(crate) fn is_characteristic_two<F: Field>() -> bool {
    let limbs = F::characteristic();
    limbs.first() == Some(&2) && limbs[1..].iter().all(|limb| *limb == 0)
}

/// The affine subspace `shift + span(basis)` of a binary field, in canonical
/// order `element(i) = shift + Σ_{bit j of i} basis[j]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffineSubspace<F: Field> {
    basis: Vec<F>,
    shift: F,
    // span_vanishing[t] vanishes exactly on span(basis[..t])
    span_vanishing: Vec<LinearizedPolynomial<F>>,
    // span_vanishing[t] evaluated at basis[t], and its inverse
    basis_images: Vec<(F, F)>,
}

impl<F: Field> AffineSubspace<F> {
    pub fn new(basis: Vec<F>, shift: F) -> Result<Self, DomainError> {
        if !is_characteristic_two::<F>() {
            return Err(DomainError::NotBinaryField);
        }

        let mut span_vanishing = vec![LinearizedPolynomial::identity()];
        let mut basis_images = Vec::with_capacity(basis.len());
        for (index, basis_element) in basis.iter().enumerate() {
            let current = &span_vanishing[index];
            let image = current.evaluate(basis_element);
            let Some(image_inverse) = image.inverse() else {
                return Err(DomainError::DependentBasis { index });
            };
            // Z_{t+1}(x) = Z_t(x) · (Z_t(x) - Z_t(b_t))
            let next = &current.square() - &current.scale(image);
            basis_images.push((image, image_inverse));
            span_vanishing.push(next);
        }

        Ok(Self {
            basis,
            shift,
            span_vanishing,
            basis_images,
        })
    }

    pub fn num_elements(&self) -> usize {
        1 << self.basis.len()
    }

    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    pub fn shift(&self) -> F {
        self.shift
    }

    pub fn basis(&self) -> &[F] {
        &self.basis
    }

    pub fn element(&self, index: usize) -> F {
        self.basis
            .iter()
            .enumerate()
            .filter(|(bit, _)| (index >> bit) & 1 == 1)
            .fold(self.shift, |acc, (_, basis_element)| acc + basis_element)
    }

    pub fn elements(&self) -> impl Iterator<Item = F> + '_ {
        (0..self.num_elements()).map(|index| self.element(index))
    }

    pub fn vanishing_polynomial(&self) -> VanishingPolynomial<F> {
        let span = &self.span_vanishing[self.dimension()];
        let offset = span.evaluate(&self.shift);
        VanishingPolynomial::Affine(span.clone().with_constant(-offset))
    }

    /// Evaluates a coefficient vector over the subspace. Higher coefficients
    /// are reduced modulo the vanishing polynomial first.
    ///
    /// arkworks ships no characteristic-two field, so only construction and
    /// its `NotBinaryField` rejection are covered by tests.
    pub fn fft(&self, coeffs: &[F]) -> Vec<F> {
        let size = self.num_elements();
        let mut reduced = if coeffs.len() > size {
            let terms = self.split_divisor(self.dimension(), self.shift);
            sparse_divide(coeffs, &terms).1
        } else {
            coeffs.to_vec()
        };
        reduced.resize(size, F::zero());
        self.fft_recursive(&reduced, self.dimension(), self.shift)
    }

    /// Inverse of [`Self::fft`], untested for the same reason.
    pub fn ifft(&self, evaluations: &[F]) -> Result<Vec<F>, DomainError> {
        if evaluations.len() != self.num_elements() {
            return Err(DomainError::EvaluationLength {
                expected: self.num_elements(),
                found: evaluations.len(),
            });
        }
        Ok(self.ifft_recursive(evaluations, self.dimension(), self.shift))
    }

    /// `Z_t(x) - Z_t(shift)`. It vanishes on `shift + span(basis[..t])` and
    /// equals `Z_t(basis[t])` on the translate by `basis[t]`.
    fn split_divisor(&self, level: usize, shift: F) -> Vec<(usize, F)> {
        let span = &self.span_vanishing[level];
        span.clone()
            .with_constant(-span.evaluate(&shift))
            .terms()
    }

    // coeffs holds at most 2^dimension entries
    fn fft_recursive(&self, coeffs: &[F], dimension: usize, shift: F) -> Vec<F> {
        if dimension == 0 {
            return vec![coeffs.first().copied().unwrap_or_default()];
        }
        let half = 1 << (dimension - 1);
        let divisor = self.split_divisor(dimension - 1, shift);
        let (quotient, mut lower) = sparse_divide(coeffs, &divisor);
        lower.resize(half, F::zero());

        let (image, _) = self.basis_images[dimension - 1];
        let mut upper = lower.clone();
        for (slot, q) in upper.iter_mut().zip(&quotient) {
            *slot += image * q;
        }

        let upper_shift = shift + self.basis[dimension - 1];
        let (mut evaluations, upper_evaluations) = rayon::join(
            || self.fft_recursive(&lower, dimension - 1, shift),
            || self.fft_recursive(&upper, dimension - 1, upper_shift),
        );
        evaluations.extend(upper_evaluations);
        evaluations
    }

    fn ifft_recursive(&self, evaluations: &[F], dimension: usize, shift: F) -> Vec<F> {
        if dimension == 0 {
            return vec![evaluations[0]];
        }
        let half = 1 << (dimension - 1);
        let upper_shift = shift + self.basis[dimension - 1];
        let (lower, upper) = rayon::join(
            || self.ifft_recursive(&evaluations[..half], dimension - 1, shift),
            || self.ifft_recursive(&evaluations[half..], dimension - 1, upper_shift),
        );

        let (_, image_inverse) = self.basis_images[dimension - 1];
        let quotient: Vec<F> = upper
            .iter()
            .zip(&lower)
            .map(|(u, l)| (*u - l) * image_inverse)
            .collect();

        let mut coeffs = sparse_multiply(&quotient, &self.split_divisor(dimension - 1, shift));
        coeffs.resize(2 * half, F::zero());
        for (slot, l) in coeffs.iter_mut().zip(&lower) {
            *slot += l;
        }
        coeffs
    }
}

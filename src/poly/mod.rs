//! Dense polynomial helpers on top of `ark_poly`, plus the sparse vanishing
//! and linearized polynomials used by evaluation domains.
pub mod linearized;
pub mod vanishing;

pub use linearized::LinearizedPolynomial;
pub use vanishing::VanishingPolynomial;

use ark_ff::{FftField, Field, Zero};
use ark_poly::univariate::DensePolynomial;
use ark_poly::{DenseUVPolynomial, EvaluationDomain, Radix2EvaluationDomain};
use ark_std::rand::Rng;

/// Below this many coefficients in the smaller operand, schoolbook
/// multiplication is used.
pub const FFT_MULTIPLICATION_THRESHOLD: usize = 64;

pub fn multiply<F: FftField>(a: &DensePolynomial<F>, b: &DensePolynomial<F>) -> DensePolynomial<F> {
    if a.is_zero() || b.is_zero() {
        return DensePolynomial::zero();
    }
    if a.coeffs.len().min(b.coeffs.len()) < FFT_MULTIPLICATION_THRESHOLD {
        return a.naive_mul(b);
    }

    let product_length = a.coeffs.len() + b.coeffs.len() - 1;
    match Radix2EvaluationDomain::<F>::new(product_length) {
        Some(domain) => {
            let mut evaluations = domain.fft(&a.coeffs);
            let other = domain.fft(&b.coeffs);
            evaluations
                .iter_mut()
                .zip(other)
                .for_each(|(left, right)| *left *= right);
            DensePolynomial::from_coefficients_vec(domain.ifft(&evaluations))
        }
        // product does not fit any two-adic subgroup
        None => a.naive_mul(b),
    }
}

pub fn scale<F: Field>(poly: &DensePolynomial<F>, scalar: F) -> DensePolynomial<F> {
    DensePolynomial::from_coefficients_vec(poly.coeffs.iter().map(|c| *c * scalar).collect())
}

/// Uniformly random polynomial with `num_coefficients` coefficients.
pub fn random_polynomial<F: Field, R: Rng + ?Sized>(
    num_coefficients: usize,
    rng: &mut R,
) -> DensePolynomial<F> {
    DensePolynomial::from_coefficients_vec((0..num_coefficients).map(|_| F::rand(rng)).collect())
}

/// `poly · Σ c·x^d` for a sparse polynomial given as `(d, c)` terms.
pub(crate) fn sparse_multiply<F: Field>(poly: &[F], terms: &[(usize, F)]) -> Vec<F> {
    let Some(&(degree, _)) = terms.last() else {
        return Vec::new();
    };
    if poly.is_empty() {
        return Vec::new();
    }

    let mut product = vec![F::zero(); poly.len() + degree];
    for &(shift, coefficient) in terms {
        for (i, value) in poly.iter().enumerate() {
            product[i + shift] += *value * coefficient;
        }
    }
    product
}

/// Long division by a sparse polynomial whose terms are sorted by degree with
/// non-zero coefficients. Returns `(quotient, remainder)`.
pub(crate) fn sparse_divide<F: Field>(dividend: &[F], terms: &[(usize, F)]) -> (Vec<F>, Vec<F>) {
    assert!(!terms.is_empty(), "division by the zero polynomial");
    let (degree, leading) = terms[terms.len() - 1];
    if dividend.len() <= degree {
        return (Vec::new(), dividend.to_vec());
    }
    let leading_inverse = leading
        .inverse()
        .expect("sparse terms have non-zero coefficients");

    let mut remainder = dividend.to_vec();
    let mut quotient = vec![F::zero(); dividend.len() - degree];
    for top in (degree..dividend.len()).rev() {
        let factor = remainder[top] * leading_inverse;
        if factor.is_zero() {
            continue;
        }
        quotient[top - degree] = factor;
        for &(shift, coefficient) in terms {
            remainder[top - degree + shift] -= factor * coefficient;
        }
    }
    remainder.truncate(degree);
    (quotient, remainder)
}

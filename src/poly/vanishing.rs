use super::{sparse_divide, sparse_multiply, LinearizedPolynomial};
use ark_ff::Field;
use ark_poly::univariate::DensePolynomial;
use ark_poly::DenseUVPolynomial;

/// The polynomial vanishing exactly on an evaluation domain, kept sparse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VanishingPolynomial<F: Field> {
    /// `x^degree - constant`, vanishing on a multiplicative coset
    Multiplicative { degree: usize, constant: F },
    /// vanishing on an affine subspace
    Affine(LinearizedPolynomial<F>),
}

impl<F: Field> VanishingPolynomial<F> {
    pub fn degree(&self) -> usize {
        match self {
            Self::Multiplicative { degree, .. } => *degree,
            Self::Affine(poly) => poly.degree(),
        }
    }

    pub fn evaluate(&self, point: &F) -> F {
        match self {
            Self::Multiplicative { degree, constant } => point.pow([*degree as u64]) - constant,
            Self::Affine(poly) => poly.evaluate(point),
        }
    }

    fn terms(&self) -> Vec<(usize, F)> {
        match self {
            Self::Multiplicative { degree, constant } => {
                let mut terms = Vec::with_capacity(2);
                if !constant.is_zero() {
                    terms.push((0, -*constant));
                }
                terms.push((*degree, F::one()));
                terms
            }
            Self::Affine(poly) => poly.terms(),
        }
    }

    pub fn as_polynomial(&self) -> DensePolynomial<F> {
        let mut coefficients = vec![F::zero(); self.degree() + 1];
        for (exponent, coefficient) in self.terms() {
            coefficients[exponent] += coefficient;
        }
        DensePolynomial::from_coefficients_vec(coefficients)
    }

    /// `self · poly`
    pub fn multiply(&self, poly: &DensePolynomial<F>) -> DensePolynomial<F> {
        DensePolynomial::from_coefficients_vec(sparse_multiply(&poly.coeffs, &self.terms()))
    }

    /// Returns `(q, r)` with `poly = self·q + r`.
    pub fn divide(&self, poly: &DensePolynomial<F>) -> (DensePolynomial<F>, DensePolynomial<F>) {
        let (quotient, remainder) = sparse_divide(&poly.coeffs, &self.terms());
        (
            DensePolynomial::from_coefficients_vec(quotient),
            DensePolynomial::from_coefficients_vec(remainder),
        )
    }

    /// `poly + self · mask`: same values on the domain, randomised elsewhere.
    pub fn mask(&self, poly: &DensePolynomial<F>, mask: &DensePolynomial<F>) -> DensePolynomial<F> {
        poly + &self.multiply(mask)
    }

    pub fn is_monic(&self) -> bool {
        self.terms().last().is_some_and(|(_, c)| c.is_one())
    }
}

use super::{sparse_divide, sparse_multiply};
use crate::domain::AffineSubspace;
use ark_ff::Field;
use ark_poly::univariate::DensePolynomial;
use ark_poly::DenseUVPolynomial;
use core::ops::{Add, Sub};

/// A polynomial `c + Σ a_i x^{2^i}`. Over a field of characteristic two the
/// non-constant part is additive, which is what subspace vanishing polynomials
/// rely on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearizedPolynomial<F: Field> {
    constant: F,
    // coefficient of x^{2^i} at position i
    coefficients: Vec<F>,
}

impl<F: Field> LinearizedPolynomial<F> {
    pub fn new(constant: F, mut coefficients: Vec<F>) -> Self {
        while coefficients.last().is_some_and(|c| c.is_zero()) {
            coefficients.pop();
        }
        Self {
            constant,
            coefficients,
        }
    }

    /// Builds from `[c, a_0, a_1, …]`.
    pub fn from_coefficients_vec(mut coefficients: Vec<F>) -> Self {
        if coefficients.is_empty() {
            return Self::new(F::zero(), Vec::new());
        }
        let constant = coefficients.remove(0);
        Self::new(constant, coefficients)
    }

    /// The polynomial `x`.
    pub fn identity() -> Self {
        Self::new(F::zero(), vec![F::one()])
    }

    pub fn constant_coefficient(&self) -> F {
        self.constant
    }

    pub fn linear_coefficients(&self) -> &[F] {
        &self.coefficients
    }

    pub fn with_constant(mut self, constant: F) -> Self {
        self.constant = constant;
        self
    }

    pub fn degree(&self) -> usize {
        match self.coefficients.len() {
            0 => 0,
            len => 1 << (len - 1),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.constant.is_zero() && self.coefficients.is_empty()
    }

    pub fn evaluate(&self, point: &F) -> F {
        let mut result = self.constant;
        let mut power = *point;
        for coefficient in &self.coefficients {
            result += *coefficient * power;
            power.square_in_place();
        }
        result
    }

    /// Squares with characteristic-two semantics: every exponent doubles and
    /// the cross terms vanish.
    pub fn square(&self) -> Self {
        let mut squared = self.clone();
        squared.square_in_place();
        squared
    }

    pub fn square_in_place(&mut self) {
        self.constant.square_in_place();
        if self.coefficients.is_empty() {
            return;
        }
        self.coefficients.iter_mut().for_each(|c| {
            c.square_in_place();
        });
        self.coefficients.insert(0, F::zero());
    }

    pub fn scale(&self, scalar: F) -> Self {
        Self::new(
            self.constant * scalar,
            self.coefficients.iter().map(|c| *c * scalar).collect(),
        )
    }

    /// Non-zero `(exponent, coefficient)` pairs sorted by exponent.
    pub fn terms(&self) -> Vec<(usize, F)> {
        let constant = (!self.constant.is_zero()).then_some((0, self.constant));
        constant
            .into_iter()
            .chain(
                self.coefficients
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_zero())
                    .map(|(i, c)| (1 << i, *c)),
            )
            .collect()
    }

    pub fn expand_as_polynomial(&self) -> DensePolynomial<F> {
        let mut coefficients = vec![F::zero(); self.degree() + 1];
        for (exponent, coefficient) in self.terms() {
            coefficients[exponent] += coefficient;
        }
        DensePolynomial::from_coefficients_vec(coefficients)
    }

    pub fn mul_polynomial(&self, poly: &DensePolynomial<F>) -> DensePolynomial<F> {
        DensePolynomial::from_coefficients_vec(sparse_multiply(&poly.coeffs, &self.terms()))
    }

    /// Returns `(q, r)` with `poly = q·self + r` and `deg r < deg self`.
    pub fn divide(&self, poly: &DensePolynomial<F>) -> (DensePolynomial<F>, DensePolynomial<F>) {
        let (quotient, remainder) = sparse_divide(&poly.coeffs, &self.terms());
        (
            DensePolynomial::from_coefficients_vec(quotient),
            DensePolynomial::from_coefficients_vec(remainder),
        )
    }

    /// Evaluates over every element of an affine subspace in canonical order,
    /// spending one addition per element. Only meaningful in characteristic two,
    /// which no arkworks field provides, so tests stop at the coefficient-level
    /// operations.
    pub fn evaluations_over_subspace(&self, subspace: &AffineSubspace<F>) -> Vec<F> {
        let mut evaluations = Vec::with_capacity(subspace.num_elements());
        evaluations.push(self.evaluate(&subspace.shift()));
        for basis_element in subspace.basis() {
            let delta = self.evaluate(basis_element) - self.constant;
            let filled = evaluations.len();
            for i in 0..filled {
                let value = evaluations[i] + delta;
                evaluations.push(value);
            }
        }
        evaluations
    }

    fn combine(&self, other: &Self, op: impl Fn(F, F) -> F) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..len)
            .map(|i| {
                let left = self.coefficients.get(i).copied().unwrap_or_default();
                let right = other.coefficients.get(i).copied().unwrap_or_default();
                op(left, right)
            })
            .collect();
        Self::new(op(self.constant, other.constant), coefficients)
    }
}

impl<F: Field> Add<&LinearizedPolynomial<F>> for &LinearizedPolynomial<F> {
    type Output = LinearizedPolynomial<F>;

    fn add(self, other: &LinearizedPolynomial<F>) -> LinearizedPolynomial<F> {
        self.combine(other, |a, b| a + b)
    }
}

impl<F: Field> Sub<&LinearizedPolynomial<F>> for &LinearizedPolynomial<F> {
    type Output = LinearizedPolynomial<F>;

    fn sub(self, other: &LinearizedPolynomial<F>) -> LinearizedPolynomial<F> {
        self.combine(other, |a, b| a - b)
    }
}

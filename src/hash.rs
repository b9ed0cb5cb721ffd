//! Stateless hashing of field elements and digests.
use crate::Hash;
use ark_ff::{BigInteger, Field, PrimeField};
use digest::Digest;

fn absorb<D: Digest, F: Field>(hasher: &mut D, element: &F) {
    for limb in element.to_base_prime_field_elements() {
        hasher.update(limb.into_bigint().to_bytes_le());
    }
}

/// Hashes a sequence of field elements into a single digest.
pub fn hash_one<D: Digest, F: Field>(values: &[F]) -> Hash<D> {
    let mut hasher = D::new();
    for value in values {
        absorb(&mut hasher, value);
    }
    hasher.finalize()
}

/// Hash of a single element, identical to [`hash_one`] over a singleton.
pub fn hash_one_element<D: Digest, F: Field>(value: &F) -> Hash<D> {
    hash_one::<D, F>(core::slice::from_ref(value))
}

pub fn hash_two<D: Digest>(left: &Hash<D>, right: &Hash<D>) -> Hash<D> {
    let mut hasher = D::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize()
}

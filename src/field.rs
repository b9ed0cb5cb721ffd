use ark_ff::fields::{MontBackend, MontConfig};
use ark_ff::{Field, Fp, PrimeField};

#[derive(MontConfig)]
#[modulus = "2013265921"]
#[generator = "31"]
pub struct BabyBearConfig;
pub type BabyBear = Fp<MontBackend<BabyBearConfig, 1>, 1>;

#[derive(MontConfig)]
#[modulus = "18446744069414584321"]
#[generator = "7"]
pub struct GoldilocksConfig;
pub type Goldilocks = Fp<MontBackend<GoldilocksConfig, 1>, 1>;

/// Number of bits needed to represent an element of `F`.
pub fn field_size_bits<F: Field>() -> usize {
    <F::BasePrimeField as PrimeField>::MODULUS_BIT_SIZE as usize * F::extension_degree() as usize
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_ff::{FftField, One};

    #[test]
    fn test_field_size_bits() {
        assert_eq!(field_size_bits::<Goldilocks>(), 64);
        assert_eq!(field_size_bits::<BabyBear>(), 31);
    }

    #[test]
    fn test_two_adic_roots_have_full_order() {
        let root = Goldilocks::TWO_ADIC_ROOT_OF_UNITY;
        assert_eq!(Goldilocks::TWO_ADICITY, 32);
        assert!(root.pow([1u64 << 32]).is_one());
        assert!(!root.pow([1u64 << 31]).is_one());

        let root = BabyBear::TWO_ADIC_ROOT_OF_UNITY;
        assert_eq!(BabyBear::TWO_ADICITY, 27);
        assert!(root.pow([1u64 << 27]).is_one());
        assert!(!root.pow([1u64 << 26]).is_one());
    }
}

use core::ops::{BitAnd, Sub};
use num_traits::{One, Zero};

pub fn is_power_of_two<T>(number: T) -> bool
where
    T: BitAnd<Output = T> + Sub<Output = T> + PartialOrd + Copy + One + Zero,
{
    if number.gt(&T::zero()) {
        return number & (number - T::one()) == T::zero();
    }
    false
}

/// Exact base-2 logarithm, `None` unless `number` is a power of two.
pub fn log2_exact(number: usize) -> Option<usize> {
    is_power_of_two(number).then(|| number.trailing_zeros() as usize)
}

/// Reverses the lowest `log_size` bits of `index`.
pub fn bit_reverse(index: usize, log_size: usize) -> usize {
    if log_size == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS as usize - log_size)
}

/// In-place bit-reversal permutation of a slice whose length is a power of two.
pub fn bit_reverse_permutation<T>(values: &mut [T]) {
    let n = values.len();
    if n <= 1 {
        return;
    }
    assert!(is_power_of_two(n), "length {n} is not a power of two");
    let log_n = n.trailing_zeros() as usize;
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            values.swap(i, j);
        }
    }
}

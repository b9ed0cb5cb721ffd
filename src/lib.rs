pub mod domain;
pub mod error;
pub mod field;
pub mod fri;
pub mod hash;
pub mod inner_product;
pub mod merkle;
pub mod poly;
pub mod util;

use digest::generic_array::GenericArray;
use digest::OutputSizeUser;

pub type Hash<D> = GenericArray<u8, <D as OutputSizeUser>::OutputSize>;

//! The field stack: Fp and its towered extensions Fp2, Fp6 and Fp12,
//! plus the scalar field Fr of the prime-order subgroup.
//!
//! Extensions are built strictly one level at a time: Fp2 = Fp[u]/(u²+1),
//! Fp6 = Fp2[v]/(v³-(u+1)), Fp12 = Fp6[w]/(w²-v). Every element handed out
//! by a public operation is the canonical representative of its class.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::biginteger::BitIterator;

pub mod fq;
pub mod fq12;
pub mod fq2;
pub mod fq6;
pub mod fr;

pub use self::fq::Fq;
pub use self::fq12::Fq12;
pub use self::fq2::Fq2;
pub use self::fq6::Fq6;
pub use self::fr::Fr;

/// The ring interface shared by every level of the tower.
pub trait Field:
    'static
    + Copy
    + Clone
    + Debug
    + Eq
    + Sized
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    fn zero() -> Self;

    fn one() -> Self;

    fn is_zero(&self) -> bool;

    fn double(&self) -> Self {
        *self + *self
    }

    fn square(&self) -> Self;

    /// Multiplicative inverse; `None` for zero.
    fn inverse(&self) -> Option<Self>;

    /// Exponentiation by a non-negative limb-slice exponent,
    /// left-to-right square-and-multiply.
    fn pow<S: AsRef<[u64]>>(&self, exp: S) -> Self {
        let mut res = Self::one();
        for i in BitIterator::new(exp) {
            res = res.square();
            if i {
                res *= *self;
            }
        }
        res
    }
}

/// Outcome of the Euler criterion in a prime-order field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendreSymbol {
    Zero,
    QuadraticResidue,
    QuadraticNonResidue,
}

impl LegendreSymbol {
    /// Zero counts as a square.
    pub fn is_qr(&self) -> bool {
        !matches!(self, LegendreSymbol::QuadraticNonResidue)
    }
}

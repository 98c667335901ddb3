//! The scalar field of the prime-order subgroup, q = z^4 - z^2 + 1.
//!
//! Same Montgomery machinery as the base field, over four limbs. The
//! extra entry point here is `from_be_bytes_reduced`, the normalization
//! front door: byte strings of any width reduce into [0, q).

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use unroll::unroll_for_loops;

use crate::biginteger::{
    adc, const_mont_inv, const_pow2k_mod, const_sub_u64, mac_with_carry, BigInteger256,
};
use crate::fields::Field;

/// MODULUS = q =
/// 52435875175126190479447740508185965837690552500527637822603658699938581184513
pub const MODULUS: BigInteger256 = BigInteger256([
    0xffffffff00000001,
    0x53bda402fffe5bfe,
    0x3339d80809a1d805,
    0x73eda753299d7d48,
]);

pub const MODULUS_BITS: u32 = 255;

pub(crate) const R: BigInteger256 = BigInteger256(const_pow2k_mod(MODULUS.0, 256));

pub(crate) const R2: BigInteger256 = BigInteger256(const_pow2k_mod(MODULUS.0, 512));

pub(crate) const INV: u64 = const_mont_inv(MODULUS.0[0]);

const MODULUS_MINUS_TWO: [u64; 4] = const_sub_u64(MODULUS.0, 2);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fr(BigInteger256);

impl Fr {
    /// Interpret a canonical representative; `None` if it is not below q.
    pub fn from_repr(repr: BigInteger256) -> Option<Fr> {
        if repr < MODULUS {
            Some(Fr(BigInteger256(mul_limbs(&repr.0, &R2.0))))
        } else {
            None
        }
    }

    /// The canonical representative in [0, q).
    pub fn into_repr(&self) -> BigInteger256 {
        let mut wide = [0u64; 8];
        wide[..4].copy_from_slice(&(self.0).0);
        BigInteger256(mont_reduce(&mut wide))
    }

    /// Reduce a big-endian byte string of arbitrary width mod q.
    pub fn from_be_bytes_reduced(bytes: &[u8]) -> Fr {
        let mut acc = Fr::zero();
        for &byte in bytes {
            for _ in 0..8 {
                acc = acc.double();
            }
            acc += Fr::from(byte as u64);
        }
        acc
    }
}

#[unroll_for_loops]
fn mul_limbs(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let mut r = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0;
        for j in 0..4 {
            let (lo, c) = mac_with_carry(r[i + j], a[i], b[j], carry);
            r[i + j] = lo;
            carry = c;
        }
        r[i + 4] = carry;
    }
    mont_reduce(&mut r)
}

#[unroll_for_loops]
fn mont_reduce(r: &mut [u64; 8]) -> [u64; 4] {
    let mut carry2 = 0;
    for i in 0..4 {
        let k = r[i].wrapping_mul(INV);
        let (_, mut carry) = mac_with_carry(r[i], k, MODULUS.0[0], 0);
        for j in 1..4 {
            let (lo, c) = mac_with_carry(r[i + j], k, MODULUS.0[j], carry);
            r[i + j] = lo;
            carry = c;
        }
        let (lo, c) = adc(r[i + 4], carry2, carry);
        r[i + 4] = lo;
        carry2 = c;
    }
    let mut out = BigInteger256([r[4], r[5], r[6], r[7]]);
    if out >= MODULUS {
        out.sub_noborrow(&MODULUS);
    }
    out.0
}

impl Field for Fr {
    fn zero() -> Self {
        Fr(BigInteger256([0; 4]))
    }

    fn one() -> Self {
        Fr(R)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn double(&self) -> Self {
        let mut r = self.0;
        r.mul2();
        if r >= MODULUS {
            r.sub_noborrow(&MODULUS);
        }
        Fr(r)
    }

    fn square(&self) -> Self {
        *self * *self
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.pow(MODULUS_MINUS_TWO))
        }
    }
}

impl Add for Fr {
    type Output = Fr;

    fn add(self, other: Fr) -> Fr {
        let mut r = self.0;
        r.add_nocarry(&other.0);
        if r >= MODULUS {
            r.sub_noborrow(&MODULUS);
        }
        Fr(r)
    }
}

impl Sub for Fr {
    type Output = Fr;

    fn sub(self, other: Fr) -> Fr {
        let mut r = self.0;
        if other.0 > r {
            r.add_nocarry(&MODULUS);
        }
        r.sub_noborrow(&other.0);
        Fr(r)
    }
}

impl Mul for Fr {
    type Output = Fr;

    fn mul(self, other: Fr) -> Fr {
        Fr(BigInteger256(mul_limbs(&(self.0).0, &(other.0).0)))
    }
}

impl Neg for Fr {
    type Output = Fr;

    fn neg(self) -> Fr {
        if self.is_zero() {
            self
        } else {
            let mut r = MODULUS;
            r.sub_noborrow(&self.0);
            Fr(r)
        }
    }
}

impl AddAssign for Fr {
    fn add_assign(&mut self, other: Fr) {
        *self = *self + other;
    }
}

impl SubAssign for Fr {
    fn sub_assign(&mut self, other: Fr) {
        *self = *self - other;
    }
}

impl MulAssign for Fr {
    fn mul_assign(&mut self, other: Fr) {
        *self = *self * other;
    }
}

impl From<u64> for Fr {
    fn from(value: u64) -> Fr {
        Fr(BigInteger256(mul_limbs(
            &BigInteger256::from(value).0,
            &R2.0,
        )))
    }
}

impl Distribution<Fr> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fr {
        loop {
            let mut limbs = [0u64; 4];
            for l in limbs.iter_mut() {
                *l = rng.gen();
            }
            limbs[3] &= (1 << 63) - 1;
            let repr = BigInteger256(limbs);
            if repr < MODULUS {
                return Fr(repr);
            }
        }
    }
}

impl fmt::Debug for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fr({:?})", self.into_repr())
    }
}

impl fmt::Display for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

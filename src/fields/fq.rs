//! The 381 bit base field of BLS12-381.
//!
//! Elements are kept in Montgomery form (six 64 bit limbs); the constants
//! R, R2 and INV are derived from the modulus at compile time rather than
//! transcribed, so they cannot drift out of sync with it.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use unroll::unroll_for_loops;

use crate::biginteger::{
    adc, const_add_u64, const_div_small, const_mont_inv, const_pow2k_mod, const_shr,
    const_sub_u64, mac_with_carry, BigInteger384,
};
use crate::fields::{Field, LegendreSymbol};

/// MODULUS = p =
/// 4002409555221667393417789825735904156556882819939007885332058136124031\
/// 650490837864442687629129015664037894272559787
pub const MODULUS: BigInteger384 = BigInteger384([
    0xb9feffffffffaaab,
    0x1eabfffeb153ffff,
    0x6730d2a0f6b0f624,
    0x64774b84f38512bf,
    0x4b1ba7b6434bacd7,
    0x1a0111ea397fe69a,
]);

pub const MODULUS_BITS: u32 = 381;

/// Montgomery constant 2^384 mod p.
pub(crate) const R: BigInteger384 = BigInteger384(const_pow2k_mod(MODULUS.0, 384));

/// 2^768 mod p, the to-Montgomery factor.
pub(crate) const R2: BigInteger384 = BigInteger384(const_pow2k_mod(MODULUS.0, 768));

/// -p^{-1} mod 2^64.
pub(crate) const INV: u64 = const_mont_inv(MODULUS.0[0]);

const MODULUS_MINUS_TWO: [u64; 6] = const_sub_u64(MODULUS.0, 2);

/// (p - 1) / 2, the Euler criterion exponent and the lexicographic midpoint.
pub(crate) const MODULUS_MINUS_ONE_DIV_TWO: [u64; 6] = const_shr(const_sub_u64(MODULUS.0, 1), 1);

/// (p + 1) / 4; p = 3 mod 4, so x^((p+1)/4) is a square root of any QR x.
const MODULUS_PLUS_ONE_DIV_FOUR: [u64; 6] = const_shr(const_add_u64(MODULUS.0, 1), 2);

/// (p - 3) / 4, used by the Fp2 square root.
pub(crate) const MODULUS_MINUS_THREE_DIV_FOUR: [u64; 6] =
    const_shr(const_sub_u64(MODULUS.0, 3), 2);

/// (p - 1) / 6, the Frobenius twist exponent of the tower.
pub(crate) const MODULUS_MINUS_ONE_DIV_SIX: [u64; 6] =
    const_div_small(const_sub_u64(MODULUS.0, 1), 6);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fq(BigInteger384);

impl Fq {
    /// Interpret a canonical representative; `None` if it is not below p.
    pub fn from_repr(repr: BigInteger384) -> Option<Fq> {
        if repr < MODULUS {
            Some(Fq(BigInteger384(mul_limbs(&repr.0, &R2.0))))
        } else {
            None
        }
    }

    /// The canonical representative in [0, p).
    pub fn into_repr(&self) -> BigInteger384 {
        let mut wide = [0u64; 12];
        wide[..6].copy_from_slice(&(self.0).0);
        BigInteger384(mont_reduce(&mut wide))
    }

    pub(crate) fn legendre(&self) -> LegendreSymbol {
        if self.is_zero() {
            return LegendreSymbol::Zero;
        }
        if self.pow(MODULUS_MINUS_ONE_DIV_TWO) == Fq::one() {
            LegendreSymbol::QuadraticResidue
        } else {
            LegendreSymbol::QuadraticNonResidue
        }
    }

    /// Square root for p = 3 mod 4; `None` if self is a non-residue.
    pub fn sqrt(&self) -> Option<Fq> {
        if self.is_zero() {
            return Some(*self);
        }
        let s = self.pow(MODULUS_PLUS_ONE_DIV_FOUR);
        if s.square() == *self {
            Some(s)
        } else {
            None
        }
    }

    /// Whether self is the greater of {self, -self} as canonical integers.
    pub fn lexicographically_largest(&self) -> bool {
        self.into_repr() > BigInteger384(MODULUS_MINUS_ONE_DIV_TWO)
    }

    pub fn is_odd(&self) -> bool {
        self.into_repr().is_odd()
    }
}

/// Schoolbook 6x6 limb product followed by Montgomery reduction.
#[unroll_for_loops]
fn mul_limbs(a: &[u64; 6], b: &[u64; 6]) -> [u64; 6] {
    let mut r = [0u64; 12];
    for i in 0..6 {
        let mut carry = 0;
        for j in 0..6 {
            let (lo, c) = mac_with_carry(r[i + j], a[i], b[j], carry);
            r[i + j] = lo;
            carry = c;
        }
        r[i + 6] = carry;
    }
    mont_reduce(&mut r)
}

/// SOS Montgomery reduction of a 12 limb product.
#[unroll_for_loops]
fn mont_reduce(r: &mut [u64; 12]) -> [u64; 6] {
    let mut carry2 = 0;
    for i in 0..6 {
        let k = r[i].wrapping_mul(INV);
        let (_, mut carry) = mac_with_carry(r[i], k, MODULUS.0[0], 0);
        for j in 1..6 {
            let (lo, c) = mac_with_carry(r[i + j], k, MODULUS.0[j], carry);
            r[i + j] = lo;
            carry = c;
        }
        let (lo, c) = adc(r[i + 6], carry2, carry);
        r[i + 6] = lo;
        carry2 = c;
    }
    let mut out = BigInteger384([r[6], r[7], r[8], r[9], r[10], r[11]]);
    if out >= MODULUS {
        out.sub_noborrow(&MODULUS);
    }
    out.0
}

impl Field for Fq {
    fn zero() -> Self {
        Fq(BigInteger384([0; 6]))
    }

    fn one() -> Self {
        Fq(R)
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
        Fq(r)
    }

    fn square(&self) -> Self {
        *self * *self
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            // Fermat: x^(p-2).
            Some(self.pow(MODULUS_MINUS_TWO))
        }
    }
}

impl Add for Fq {
    type Output = Fq;

    fn add(self, other: Fq) -> Fq {
        let mut r = self.0;
        r.add_nocarry(&other.0);
        if r >= MODULUS {
            r.sub_noborrow(&MODULUS);
        }
        Fq(r)
    }
}

impl Sub for Fq {
    type Output = Fq;

    fn sub(self, other: Fq) -> Fq {
        let mut r = self.0;
        if other.0 > r {
            r.add_nocarry(&MODULUS);
        }
        r.sub_noborrow(&other.0);
        Fq(r)
    }
}

impl Mul for Fq {
    type Output = Fq;

    fn mul(self, other: Fq) -> Fq {
        Fq(BigInteger384(mul_limbs(&(self.0).0, &(other.0).0)))
    }
}

impl Neg for Fq {
    type Output = Fq;

    fn neg(self) -> Fq {
        if self.is_zero() {
            self
        } else {
            let mut r = MODULUS;
            r.sub_noborrow(&self.0);
            Fq(r)
        }
    }
}

impl AddAssign for Fq {
    fn add_assign(&mut self, other: Fq) {
        *self = *self + other;
    }
}

impl SubAssign for Fq {
    fn sub_assign(&mut self, other: Fq) {
        *self = *self - other;
    }
}

impl MulAssign for Fq {
    fn mul_assign(&mut self, other: Fq) {
        *self = *self * other;
    }
}

impl From<u64> for Fq {
    fn from(value: u64) -> Fq {
        // Any u64 is already below p.
        Fq(BigInteger384(mul_limbs(
            &BigInteger384::from(value).0,
            &R2.0,
        )))
    }
}

impl Distribution<Fq> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fq {
        loop {
            let mut limbs = [0u64; 6];
            for l in limbs.iter_mut() {
                *l = rng.gen();
            }
            // Trim to the bit length of p before the rejection test.
            limbs[5] &= (1 << 61) - 1;
            let repr = BigInteger384(limbs);
            if repr < MODULUS {
                return Fq(repr);
            }
        }
    }
}

impl fmt::Debug for Fq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fq({:?})", self.into_repr())
    }
}

impl fmt::Display for Fq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn montgomery_constants_are_consistent() {
        // INV * p = -1 mod 2^64.
        assert_eq!(MODULUS.0[0].wrapping_mul(INV.wrapping_neg()), 1);
        // R is p-reduced and nonzero.
        assert!(R < MODULUS && !R.is_zero());
        assert!(R2 < MODULUS);
        // one maps back to the canonical 1.
        assert_eq!(Fq::one().into_repr(), BigInteger384::from(1));
    }

    #[test]
    fn repr_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(17);
        for _ in 0..100 {
            let a: Fq = rng.gen();
            assert_eq!(Fq::from_repr(a.into_repr()), Some(a));
        }
        assert_eq!(Fq::from_repr(MODULUS), None);
    }

    #[test]
    fn field_axioms() {
        let mut rng = XorShiftRng::seed_from_u64(18);
        for _ in 0..100 {
            let a: Fq = rng.gen();
            let b: Fq = rng.gen();
            let c: Fq = rng.gen();
            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a + (-a), Fq::zero());
            assert_eq!(a - b, a + (-b));
            assert_eq!(a.double(), a + a);
            assert_eq!(a.square(), a * a);
            assert_eq!(a * Fq::one(), a);
        }
    }

    #[test]
    fn inversion() {
        let mut rng = XorShiftRng::seed_from_u64(19);
        assert_eq!(Fq::zero().inverse(), None);
        for _ in 0..50 {
            let a: Fq = rng.gen();
            if a.is_zero() {
                continue;
            }
            let a_inv = a.inverse().unwrap();
            assert_eq!(a * a_inv, Fq::one());
        }
    }

    #[test]
    fn pow_small_exponents() {
        let mut rng = XorShiftRng::seed_from_u64(20);
        let a: Fq = rng.gen();
        assert_eq!(a.pow([0u64]), Fq::one());
        assert_eq!(a.pow([1u64]), a);
        assert_eq!(a.pow([5u64]), a * a * a * a * a);
    }

    #[test]
    fn sqrt_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(21);
        for _ in 0..50 {
            let a: Fq = rng.gen();
            let sq = a.square();
            let root = sq.sqrt().unwrap();
            assert!(root == a || root == -a);
            assert_eq!(sq.legendre(), LegendreSymbol::QuadraticResidue);
        }
        assert_eq!(Fq::zero().sqrt(), Some(Fq::zero()));
    }

    #[test]
    fn nonresidues_have_no_root() {
        let mut rng = XorShiftRng::seed_from_u64(22);
        let mut seen = 0;
        while seen < 20 {
            let a: Fq = rng.gen();
            if a.legendre() == LegendreSymbol::QuadraticNonResidue {
                assert_eq!(a.sqrt(), None);
                seen += 1;
            }
        }
    }

    #[test]
    fn lexicographic_sign_is_antisymmetric() {
        let mut rng = XorShiftRng::seed_from_u64(23);
        for _ in 0..50 {
            let a: Fq = rng.gen();
            if a.is_zero() {
                continue;
            }
            assert_ne!(a.lexicographically_largest(), (-a).lexicographically_largest());
        }
        assert!(!Fq::zero().lexicographically_largest());
    }
}

//! Embedding field Fp12 = Fp6[w]/(w² - v), the target of the pairing.
//!
//! Pairing outputs live in the cyclotomic subgroup of Fp12*, which is
//! what makes the compressed (Granger–Scott) squaring below legal inside
//! the final exponentiation.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::biginteger::BitIterator;
use crate::fields::fq6::frobenius_gamma;
use crate::fields::{Field, Fq2, Fq6};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fq12 {
    pub c0: Fq6,
    pub c1: Fq6,
}

impl Fq12 {
    pub fn new(c0: Fq6, c1: Fq6) -> Self {
        Fq12 { c0, c1 }
    }

    /// The w-conjugate; inversion on the unitary subgroup.
    pub fn conjugate(&mut self) {
        self.c1 = -self.c1;
    }

    pub fn frobenius_map(&mut self, power: usize) {
        for _ in 0..power {
            let (g, _, _) = *frobenius_gamma();
            self.c0.frobenius_map(1);
            self.c1.frobenius_map(1);
            self.c1.c0 *= g;
            self.c1.c1 *= g;
            self.c1.c2 *= g;
        }
    }

    /// Sparse product with an element whose only nonzero Fp2 slots are
    /// c0.c0, c0.c1 and c1.c1 — the shape of an M-twist line evaluation.
    pub fn mul_by_014(&mut self, c0: &Fq2, c1: &Fq2, c4: &Fq2) {
        let aa = self.c0.mul_by_01(c0, c1);
        let bb = self.c1.mul_by_1(c4);
        let o = *c1 + *c4;
        let mut new_c1 = self.c1 + self.c0;
        new_c1 = new_c1.mul_by_01(c0, &o);
        new_c1 = new_c1 - aa - bb;
        self.c0 = bb.mul_by_nonresidue() + aa;
        self.c1 = new_c1;
    }

    /// Squaring restricted to the cyclotomic subgroup
    /// (Granger–Scott compressed squaring over three Fp4 pieces).
    pub fn cyclotomic_square(&self) -> Fq12 {
        let r0 = self.c0.c0;
        let r4 = self.c0.c1;
        let r3 = self.c0.c2;
        let r2 = self.c1.c0;
        let r1 = self.c1.c1;
        let r5 = self.c1.c2;

        // (t0, t1) = (z0 + z1·s)², s² = ξ, via a² + ξb² and 2ab.
        let mut tmp = r0 * r1;
        let t0 = (r0 + r1) * (r1.mul_by_nonresidue() + r0) - tmp - tmp.mul_by_nonresidue();
        let t1 = tmp + tmp;

        tmp = r2 * r3;
        let t2 = (r2 + r3) * (r3.mul_by_nonresidue() + r2) - tmp - tmp.mul_by_nonresidue();
        let t3 = tmp + tmp;

        tmp = r4 * r5;
        let t4 = (r4 + r5) * (r5.mul_by_nonresidue() + r4) - tmp - tmp.mul_by_nonresidue();
        let t5 = tmp + tmp;

        // z' = 3·t ± 2·z, signs per the unitary relations.
        let z0 = (t0 - r0).double() + t0;
        let z1 = (t1 + r1).double() + t1;

        tmp = t5.mul_by_nonresidue();
        let z2 = (tmp + r2).double() + tmp;
        let z3 = (t4 - r3).double() + t4;

        let z4 = (t2 - r4).double() + t2;
        let z5 = (t3 + r5).double() + t3;

        Fq12::new(Fq6::new(z0, z4, z3), Fq6::new(z2, z1, z5))
    }

    /// Exponentiation inside the cyclotomic subgroup, reusing the
    /// compressed squaring.
    pub fn cyclotomic_exp<S: AsRef<[u64]>>(&self, exp: S) -> Fq12 {
        let mut res = Fq12::one();
        let mut found_one = false;
        for bit in BitIterator::new(exp) {
            if found_one {
                res = res.cyclotomic_square();
            } else {
                found_one = bit;
            }
            if bit {
                res *= *self;
            }
        }
        res
    }
}

impl Field for Fq12 {
    fn zero() -> Self {
        Fq12::new(Fq6::zero(), Fq6::zero())
    }

    fn one() -> Self {
        Fq12::new(Fq6::one(), Fq6::zero())
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    fn square(&self) -> Self {
        // Complex squaring with w² = v.
        let ab = self.c0 * self.c1;
        Fq12::new(
            (self.c0 + self.c1) * (self.c0 + self.c1.mul_by_nonresidue())
                - ab
                - ab.mul_by_nonresidue(),
            ab + ab,
        )
    }

    fn inverse(&self) -> Option<Self> {
        // 1/(c0 + c1·w) = (c0 - c1·w)/(c0² - v·c1²)
        (self.c0.square() - self.c1.square().mul_by_nonresidue())
            .inverse()
            .map(|t| Fq12::new(self.c0 * t, -(self.c1 * t)))
    }
}

impl Add for Fq12 {
    type Output = Fq12;

    fn add(self, other: Fq12) -> Fq12 {
        Fq12::new(self.c0 + other.c0, self.c1 + other.c1)
    }
}

impl Sub for Fq12 {
    type Output = Fq12;

    fn sub(self, other: Fq12) -> Fq12 {
        Fq12::new(self.c0 - other.c0, self.c1 - other.c1)
    }
}

impl Mul for Fq12 {
    type Output = Fq12;

    fn mul(self, other: Fq12) -> Fq12 {
        // Karatsuba with w² = v.
        let aa = self.c0 * other.c0;
        let bb = self.c1 * other.c1;
        Fq12::new(
            aa + bb.mul_by_nonresidue(),
            (self.c0 + self.c1) * (other.c0 + other.c1) - aa - bb,
        )
    }
}

impl Neg for Fq12 {
    type Output = Fq12;

    fn neg(self) -> Fq12 {
        Fq12::new(-self.c0, -self.c1)
    }
}

impl AddAssign for Fq12 {
    fn add_assign(&mut self, other: Fq12) {
        *self = *self + other;
    }
}

impl SubAssign for Fq12 {
    fn sub_assign(&mut self, other: Fq12) {
        *self = *self - other;
    }
}

impl MulAssign for Fq12 {
    fn mul_assign(&mut self, other: Fq12) {
        *self = *self * other;
    }
}

impl Distribution<Fq12> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fq12 {
        Fq12::new(rng.gen(), rng.gen())
    }
}

impl fmt::Debug for Fq12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fq12({:?} + {:?}*w)", self.c0, self.c1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fq;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    /// Push an arbitrary nonzero element into the cyclotomic subgroup by
    /// exponentiating with (p^6 - 1)(p^2 + 1).
    fn cyclotomic_element(a: Fq12) -> Fq12 {
        let mut f1 = a;
        f1.conjugate();
        let mut r = f1 * a.inverse().unwrap();
        let mut f2 = r;
        f2.frobenius_map(2);
        r *= f2;
        r
    }

    #[test]
    fn field_axioms() {
        let mut rng = XorShiftRng::seed_from_u64(53);
        for _ in 0..30 {
            let a: Fq12 = rng.gen();
            let b: Fq12 = rng.gen();
            let c: Fq12 = rng.gen();
            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * b, b * a);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a.square(), a * a);
        }
    }

    #[test]
    fn inversion() {
        let mut rng = XorShiftRng::seed_from_u64(54);
        assert_eq!(Fq12::zero().inverse(), None);
        for _ in 0..10 {
            let a: Fq12 = rng.gen();
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.inverse().unwrap(), Fq12::one());
        }
    }

    #[test]
    fn w_squares_to_v() {
        let w = Fq12::new(Fq6::zero(), Fq6::one());
        let v = Fq12::new(Fq6::new(Fq2::zero(), Fq2::one(), Fq2::zero()), Fq6::zero());
        assert_eq!(w * w, v);
    }

    #[test]
    fn frobenius_is_pow_p() {
        let mut rng = XorShiftRng::seed_from_u64(55);
        for _ in 0..3 {
            let a: Fq12 = rng.gen();
            let mut b = a;
            b.frobenius_map(1);
            assert_eq!(b, a.pow(fq::MODULUS.0));
            let mut c = a;
            c.frobenius_map(12);
            assert_eq!(c, a);
        }
    }

    #[test]
    fn sparse_line_product_agrees_with_full_product() {
        let mut rng = XorShiftRng::seed_from_u64(56);
        for _ in 0..20 {
            let a: Fq12 = rng.gen();
            let c0: Fq2 = rng.gen();
            let c1: Fq2 = rng.gen();
            let c4: Fq2 = rng.gen();
            let sparse = Fq12::new(
                Fq6::new(c0, c1, Fq2::zero()),
                Fq6::new(Fq2::zero(), c4, Fq2::zero()),
            );
            let mut b = a;
            b.mul_by_014(&c0, &c1, &c4);
            assert_eq!(b, a * sparse);
        }
    }

    #[test]
    fn cyclotomic_square_agrees_on_the_cyclotomic_subgroup() {
        let mut rng = XorShiftRng::seed_from_u64(57);
        for _ in 0..10 {
            let a: Fq12 = rng.gen();
            if a.is_zero() {
                continue;
            }
            let g = cyclotomic_element(a);
            assert_eq!(g.cyclotomic_square(), g.square());
            assert_eq!(g.cyclotomic_exp([0x1234_5678u64]), g.pow([0x1234_5678u64]));
        }
    }

    #[test]
    fn conjugate_inverts_unitary_elements() {
        let mut rng = XorShiftRng::seed_from_u64(58);
        let a: Fq12 = rng.gen();
        let g = cyclotomic_element(a);
        let mut gc = g;
        gc.conjugate();
        assert_eq!(g * gc, Fq12::one());
    }

    #[test]
    fn pow_small_exponents() {
        let mut rng = XorShiftRng::seed_from_u64(59);
        let a: Fq12 = rng.gen();
        assert_eq!(a.pow([0u64]), Fq12::one());
        assert_eq!(a.pow([3u64]), a * a * a);
    }
}

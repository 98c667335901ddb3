//! Cubic extension Fp6 = Fp2[v]/(v³ - ξ), ξ = u + 1.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use crate::fields::fq::MODULUS_MINUS_ONE_DIV_SIX;
use crate::fields::{Field, Fq2};

/// Frobenius scale factors of the tower: (γ, γ², γ⁴) for
/// γ = ξ^((p-1)/6). v picks up γ² per power of π, v² picks up γ⁴, and
/// the w of Fp12 picks up γ itself.
pub(crate) fn frobenius_gamma() -> &'static (Fq2, Fq2, Fq2) {
    static GAMMA: OnceLock<(Fq2, Fq2, Fq2)> = OnceLock::new();
    GAMMA.get_or_init(|| {
        let g = Fq2::nonresidue().pow(MODULUS_MINUS_ONE_DIV_SIX);
        let g2 = g.square();
        (g, g2, g2.square())
    })
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fq6 {
    pub c0: Fq2,
    pub c1: Fq2,
    pub c2: Fq2,
}

impl Fq6 {
    pub fn new(c0: Fq2, c1: Fq2, c2: Fq2) -> Self {
        Fq6 { c0, c1, c2 }
    }

    /// Multiplication by v: (c0, c1, c2) -> (ξ·c2, c0, c1).
    pub fn mul_by_nonresidue(&self) -> Self {
        Fq6::new(self.c2.mul_by_nonresidue(), self.c0, self.c1)
    }

    /// Sparse product with c0' + c1'·v.
    pub fn mul_by_01(&self, c0: &Fq2, c1: &Fq2) -> Fq6 {
        let a_a = self.c0 * *c0;
        let b_b = self.c1 * *c1;
        Fq6::new(
            ((self.c1 + self.c2) * *c1 - b_b).mul_by_nonresidue() + a_a,
            (*c0 + *c1) * (self.c0 + self.c1) - a_a - b_b,
            (self.c0 + self.c2) * *c0 - a_a + b_b,
        )
    }

    /// Sparse product with c1'·v.
    pub fn mul_by_1(&self, c1: &Fq2) -> Fq6 {
        Fq6::new(
            (self.c2 * *c1).mul_by_nonresidue(),
            self.c0 * *c1,
            self.c1 * *c1,
        )
    }

    pub fn frobenius_map(&mut self, power: usize) {
        for _ in 0..power {
            let (_, g2, g4) = *frobenius_gamma();
            self.c0.frobenius_map(1);
            self.c1.frobenius_map(1);
            self.c2.frobenius_map(1);
            self.c1 *= g2;
            self.c2 *= g4;
        }
    }
}

impl Field for Fq6 {
    fn zero() -> Self {
        Fq6::new(Fq2::zero(), Fq2::zero(), Fq2::zero())
    }

    fn one() -> Self {
        Fq6::new(Fq2::one(), Fq2::zero(), Fq2::zero())
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero() && self.c2.is_zero()
    }

    fn square(&self) -> Self {
        // CH-SQR2 over the cubic extension.
        let s0 = self.c0.square();
        let ab = self.c0 * self.c1;
        let s1 = ab + ab;
        let s2 = (self.c0 - self.c1 + self.c2).square();
        let bc = self.c1 * self.c2;
        let s3 = bc + bc;
        let s4 = self.c2.square();
        Fq6::new(
            s0 + s3.mul_by_nonresidue(),
            s1 + s4.mul_by_nonresidue(),
            s1 + s2 + s3 - s0 - s4,
        )
    }

    fn inverse(&self) -> Option<Self> {
        // Norm-based inversion over the cubic extension.
        let c0 = self.c0.square() - (self.c1 * self.c2).mul_by_nonresidue();
        let c1 = self.c2.square().mul_by_nonresidue() - self.c0 * self.c1;
        let c2 = self.c1.square() - self.c0 * self.c2;
        let t = (self.c1 * c2 + self.c2 * c1).mul_by_nonresidue() + self.c0 * c0;
        t.inverse()
            .map(|t| Fq6::new(t * c0, t * c1, t * c2))
    }
}

impl Add for Fq6 {
    type Output = Fq6;

    fn add(self, other: Fq6) -> Fq6 {
        Fq6::new(self.c0 + other.c0, self.c1 + other.c1, self.c2 + other.c2)
    }
}

impl Sub for Fq6 {
    type Output = Fq6;

    fn sub(self, other: Fq6) -> Fq6 {
        Fq6::new(self.c0 - other.c0, self.c1 - other.c1, self.c2 - other.c2)
    }
}

impl Mul for Fq6 {
    type Output = Fq6;

    fn mul(self, other: Fq6) -> Fq6 {
        // Toom-style interpolation with v³ = ξ.
        let v0 = self.c0 * other.c0;
        let v1 = self.c1 * other.c1;
        let v2 = self.c2 * other.c2;
        Fq6::new(
            v0 + ((self.c1 + self.c2) * (other.c1 + other.c2) - v1 - v2).mul_by_nonresidue(),
            (self.c0 + self.c1) * (other.c0 + other.c1) - v0 - v1 + v2.mul_by_nonresidue(),
            (self.c0 + self.c2) * (other.c0 + other.c2) - v0 - v2 + v1,
        )
    }
}

impl Neg for Fq6 {
    type Output = Fq6;

    fn neg(self) -> Fq6 {
        Fq6::new(-self.c0, -self.c1, -self.c2)
    }
}

impl AddAssign for Fq6 {
    fn add_assign(&mut self, other: Fq6) {
        *self = *self + other;
    }
}

impl SubAssign for Fq6 {
    fn sub_assign(&mut self, other: Fq6) {
        *self = *self - other;
    }
}

impl MulAssign for Fq6 {
    fn mul_assign(&mut self, other: Fq6) {
        *self = *self * other;
    }
}

impl Distribution<Fq6> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fq6 {
        Fq6::new(rng.gen(), rng.gen(), rng.gen())
    }
}

impl fmt::Debug for Fq6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fq6({:?}, {:?}, {:?})", self.c0, self.c1, self.c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fq;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn field_axioms() {
        let mut rng = XorShiftRng::seed_from_u64(43);
        for _ in 0..50 {
            let a: Fq6 = rng.gen();
            let b: Fq6 = rng.gen();
            let c: Fq6 = rng.gen();
            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * b, b * a);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a.square(), a * a);
        }
    }

    #[test]
    fn inversion() {
        let mut rng = XorShiftRng::seed_from_u64(44);
        assert_eq!(Fq6::zero().inverse(), None);
        for _ in 0..20 {
            let a: Fq6 = rng.gen();
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.inverse().unwrap(), Fq6::one());
        }
    }

    #[test]
    fn v_cubes_to_xi() {
        let v = Fq6::new(Fq2::zero(), Fq2::one(), Fq2::zero());
        let xi = Fq6::new(Fq2::nonresidue(), Fq2::zero(), Fq2::zero());
        assert_eq!(v * v * v, xi);
    }

    #[test]
    fn nonresidue_shift_agrees_with_mul_by_v() {
        let mut rng = XorShiftRng::seed_from_u64(45);
        let v = Fq6::new(Fq2::zero(), Fq2::one(), Fq2::zero());
        for _ in 0..20 {
            let a: Fq6 = rng.gen();
            assert_eq!(a.mul_by_nonresidue(), a * v);
        }
    }

    #[test]
    fn sparse_products_agree_with_full_products() {
        let mut rng = XorShiftRng::seed_from_u64(46);
        for _ in 0..20 {
            let a: Fq6 = rng.gen();
            let c0: Fq2 = rng.gen();
            let c1: Fq2 = rng.gen();
            assert_eq!(
                a.mul_by_01(&c0, &c1),
                a * Fq6::new(c0, c1, Fq2::zero())
            );
            assert_eq!(a.mul_by_1(&c1), a * Fq6::new(Fq2::zero(), c1, Fq2::zero()));
        }
    }

    #[test]
    fn frobenius_is_pow_p() {
        let mut rng = XorShiftRng::seed_from_u64(47);
        for _ in 0..5 {
            let a: Fq6 = rng.gen();
            let mut b = a;
            b.frobenius_map(1);
            assert_eq!(b, a.pow(fq::MODULUS.0));
            let mut c = a;
            c.frobenius_map(6);
            assert_eq!(c, a);
        }
    }
}

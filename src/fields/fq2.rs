//! Quadratic extension Fp2 = Fp[u]/(u² + 1).
//!
//! -1 is a non-residue since p = 3 mod 4. The tower's sextic twist lives
//! over this field, so Fp2 also carries the square root, squareness test
//! and sign conventions that point decompression and hashing need.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::fields::fq::{MODULUS_MINUS_ONE_DIV_TWO, MODULUS_MINUS_THREE_DIV_FOUR};
use crate::fields::{Field, Fq};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fq2 {
    pub c0: Fq,
    pub c1: Fq,
}

impl Fq2 {
    pub fn new(c0: Fq, c1: Fq) -> Self {
        Fq2 { c0, c1 }
    }

    /// The cubic-and-sextic non-residue ξ = u + 1 the rest of the tower
    /// is built on.
    pub fn nonresidue() -> Self {
        Fq2::new(Fq::one(), Fq::one())
    }

    /// Multiplication by ξ = u + 1:
    /// (c0 + c1·u)(1 + u) = (c0 - c1) + (c0 + c1)·u.
    pub fn mul_by_nonresidue(&self) -> Self {
        Fq2::new(self.c0 - self.c1, self.c0 + self.c1)
    }

    /// Scale both coefficients by a base field element.
    pub fn mul_by_fp(&mut self, other: &Fq) {
        self.c0 *= *other;
        self.c1 *= *other;
    }

    pub fn conjugate(&mut self) {
        self.c1 = -self.c1;
    }

    /// π^power; π is conjugation since u^p = -u.
    pub fn frobenius_map(&mut self, power: usize) {
        if power % 2 == 1 {
            self.conjugate();
        }
    }

    /// Norm to the base field: c0² + c1².
    pub fn norm(&self) -> Fq {
        self.c0.square() + self.c1.square()
    }

    /// Squareness via the norm: a is a square in Fp2 iff its norm is a
    /// square in Fp.
    pub fn is_square(&self) -> bool {
        self.norm().legendre().is_qr()
    }

    /// Square root for p = 3 mod 4 (Adj–Rodríguez-Henríquez);
    /// `None` for non-residues.
    pub fn sqrt(&self) -> Option<Fq2> {
        if self.is_zero() {
            return Some(*self);
        }
        let a1 = self.pow(MODULUS_MINUS_THREE_DIV_FOUR);
        let x0 = a1 * *self;
        let alpha = a1 * x0;
        let x = if alpha == -Fq2::one() {
            // x0 * u
            Fq2::new(-x0.c1, x0.c0)
        } else {
            let b = (alpha + Fq2::one()).pow(MODULUS_MINUS_ONE_DIV_TWO);
            b * x0
        };
        if x.square() == *self {
            Some(x)
        } else {
            None
        }
    }

    /// Lexicographic order of {self, -self}: compare c1 first, fall back
    /// to c0 when c1 = 0.
    pub fn lexicographically_largest(&self) -> bool {
        if self.c1.is_zero() {
            self.c0.lexicographically_largest()
        } else {
            self.c1.lexicographically_largest()
        }
    }

    /// Parity-based sign: the parity of c0, or of c1 when c0 = 0.
    pub(crate) fn sgn0(&self) -> bool {
        if self.c0.is_zero() {
            self.c1.is_odd()
        } else {
            self.c0.is_odd()
        }
    }
}

impl Field for Fq2 {
    fn zero() -> Self {
        Fq2::new(Fq::zero(), Fq::zero())
    }

    fn one() -> Self {
        Fq2::new(Fq::one(), Fq::zero())
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    fn square(&self) -> Self {
        // (c0 + c1·u)² = (c0+c1)(c0-c1) + 2·c0·c1·u
        let ab = self.c0 * self.c1;
        Fq2::new((self.c0 + self.c1) * (self.c0 - self.c1), ab + ab)
    }

    fn inverse(&self) -> Option<Self> {
        // 1/(c0 + c1·u) = (c0 - c1·u)/(c0² + c1²)
        self.norm().inverse().map(|norm_inv| {
            Fq2::new(self.c0 * norm_inv, -(self.c1 * norm_inv))
        })
    }
}

impl Add for Fq2 {
    type Output = Fq2;

    fn add(self, other: Fq2) -> Fq2 {
        Fq2::new(self.c0 + other.c0, self.c1 + other.c1)
    }
}

impl Sub for Fq2 {
    type Output = Fq2;

    fn sub(self, other: Fq2) -> Fq2 {
        Fq2::new(self.c0 - other.c0, self.c1 - other.c1)
    }
}

impl Mul for Fq2 {
    type Output = Fq2;

    fn mul(self, other: Fq2) -> Fq2 {
        // Karatsuba with u² = -1.
        let v0 = self.c0 * other.c0;
        let v1 = self.c1 * other.c1;
        Fq2::new(
            v0 - v1,
            (self.c0 + self.c1) * (other.c0 + other.c1) - v0 - v1,
        )
    }
}

impl Neg for Fq2 {
    type Output = Fq2;

    fn neg(self) -> Fq2 {
        Fq2::new(-self.c0, -self.c1)
    }
}

impl AddAssign for Fq2 {
    fn add_assign(&mut self, other: Fq2) {
        *self = *self + other;
    }
}

impl SubAssign for Fq2 {
    fn sub_assign(&mut self, other: Fq2) {
        *self = *self - other;
    }
}

impl MulAssign for Fq2 {
    fn mul_assign(&mut self, other: Fq2) {
        *self = *self * other;
    }
}

impl From<u64> for Fq2 {
    fn from(value: u64) -> Fq2 {
        Fq2::new(Fq::from(value), Fq::zero())
    }
}

impl Distribution<Fq2> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fq2 {
        Fq2::new(rng.gen(), rng.gen())
    }
}

impl fmt::Debug for Fq2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fq2({:?} + {:?}*u)", self.c0, self.c1)
    }
}

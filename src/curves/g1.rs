//! G1: the prime-order subgroup of E(Fp), E: y² = x³ + 4.
//!
//! Affine points carry an explicit infinity flag; arithmetic runs in
//! Jacobian coordinates (X/Z², Y/Z³) with Z = 0 at infinity.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use crate::biginteger::{BigInteger384, BitIterator};
use crate::curves::{FLAG_COMPRESSED, FLAG_INFINITY, FLAG_MASK, FLAG_SIGN, G1_COFACTOR};
use crate::error::Error;
use crate::fields::{fr, Field, Fq, Fr};

pub const G1_COMPRESSED_SIZE: usize = 48;
pub const G1_UNCOMPRESSED_SIZE: usize = 96;

const GENERATOR_X: &str =
    "17f1d3a73197d7942695638c4fa9ac0fc3688c4f9774b905a14e3a3f171bac586c55e83ff97a1aeffb3af00adb22c6bb";
const GENERATOR_Y: &str =
    "08b3f481e3aaa0f1a09e30ed741d8ae4fcf5e095d5d00af600db18cb2c04b3edd03cc744a2888ae40caa232946c5e7e1";

fn fq_from_hex(s: &str) -> Fq {
    BigInteger384::from_be_hex(s)
        .and_then(Fq::from_repr)
        .expect("curve constant is a canonical field element")
}

/// B = 4.
pub(crate) fn coeff_b() -> Fq {
    Fq::from(4)
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct G1Affine {
    pub x: Fq,
    pub y: Fq,
    pub infinity: bool,
}

impl G1Affine {
    pub fn new(x: Fq, y: Fq, infinity: bool) -> Self {
        G1Affine { x, y, infinity }
    }

    pub fn zero() -> Self {
        G1Affine::new(Fq::zero(), Fq::one(), true)
    }

    pub fn is_zero(&self) -> bool {
        self.infinity
    }

    pub fn prime_subgroup_generator() -> Self {
        static GEN: OnceLock<G1Affine> = OnceLock::new();
        *GEN.get_or_init(|| {
            G1Affine::new(fq_from_hex(GENERATOR_X), fq_from_hex(GENERATOR_Y), false)
        })
    }

    pub fn is_on_curve(&self) -> bool {
        if self.is_zero() {
            true
        } else {
            self.y.square() == self.x.square() * self.x + coeff_b()
        }
    }

    /// Multiplication by q; the subgroup has prime order, so only its
    /// members (and infinity) land on zero.
    pub fn is_in_correct_subgroup(&self) -> bool {
        self.mul_bits(BitIterator::new(fr::MODULUS)).is_zero()
    }

    /// Fixed-schedule double-and-add over all bits of the given slice.
    pub fn mul_bits<S: AsRef<[u64]>>(&self, bits: BitIterator<S>) -> G1Projective {
        let mut res = G1Projective::zero();
        for b in bits {
            res.double_in_place();
            if b {
                res.add_assign_mixed(self);
            }
        }
        res
    }

    pub fn scale_by_cofactor(&self) -> G1Projective {
        self.mul_bits(BitIterator::new(G1_COFACTOR))
    }

    /// Construct the point with the given x-coordinate, picking the
    /// lexicographically greater y iff `greatest` is set. The result is
    /// on the curve but not necessarily in the subgroup.
    pub fn from_x_coordinate(x: Fq, greatest: bool) -> Option<Self> {
        let y2 = x.square() * x + coeff_b();
        y2.sqrt().map(|y| {
            let chosen = if y.lexicographically_largest() == greatest { y } else { -y };
            G1Affine::new(x, chosen, false)
        })
    }

    pub fn into_projective(self) -> G1Projective {
        self.into()
    }

    /// 48-byte compressed encoding with the C/I/S flag bits.
    pub fn to_compressed(&self) -> [u8; G1_COMPRESSED_SIZE] {
        let mut out = [0u8; G1_COMPRESSED_SIZE];
        if self.infinity {
            out[0] = FLAG_COMPRESSED | FLAG_INFINITY;
            return out;
        }
        out.copy_from_slice(&self.x.into_repr().to_bytes_be());
        out[0] |= FLAG_COMPRESSED;
        if self.y.lexicographically_largest() {
            out[0] |= FLAG_SIGN;
        }
        out
    }

    /// Decode and fully validate a compressed point: flag consistency,
    /// coordinate range, curve membership, subgroup membership.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G1_COMPRESSED_SIZE {
            return Err(Error::InvalidLength {
                expected: G1_COMPRESSED_SIZE,
                got: bytes.len(),
            });
        }
        if bytes[0] & FLAG_COMPRESSED == 0 {
            return Err(Error::InvalidEncoding);
        }
        if bytes[0] & FLAG_INFINITY != 0 {
            // Infinity carries no coordinate and no sign.
            if bytes[0] & !(FLAG_COMPRESSED | FLAG_INFINITY) != 0
                || bytes[1..].iter().any(|&b| b != 0)
            {
                return Err(Error::InvalidEncoding);
            }
            return Ok(G1Affine::zero());
        }
        let greatest = bytes[0] & FLAG_SIGN != 0;
        let mut coord = [0u8; G1_COMPRESSED_SIZE];
        coord.copy_from_slice(bytes);
        coord[0] &= !FLAG_MASK;
        let x = BigInteger384::from_be_slice(&coord)
            .and_then(Fq::from_repr)
            .ok_or(Error::InvalidEncoding)?;
        let p = G1Affine::from_x_coordinate(x, greatest).ok_or(Error::NotOnCurve)?;
        if !p.is_in_correct_subgroup() {
            return Err(Error::NotInSubgroup);
        }
        Ok(p)
    }

    /// 96-byte uncompressed encoding x ‖ y.
    pub fn to_uncompressed(&self) -> [u8; G1_UNCOMPRESSED_SIZE] {
        let mut out = [0u8; G1_UNCOMPRESSED_SIZE];
        if self.infinity {
            out[0] = FLAG_INFINITY;
            return out;
        }
        out[..48].copy_from_slice(&self.x.into_repr().to_bytes_be());
        out[48..].copy_from_slice(&self.y.into_repr().to_bytes_be());
        out
    }

    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G1_UNCOMPRESSED_SIZE {
            return Err(Error::InvalidLength {
                expected: G1_UNCOMPRESSED_SIZE,
                got: bytes.len(),
            });
        }
        if bytes[0] & (FLAG_COMPRESSED | FLAG_SIGN) != 0 {
            return Err(Error::InvalidEncoding);
        }
        if bytes[0] & FLAG_INFINITY != 0 {
            if bytes[0] & !FLAG_INFINITY != 0 || bytes[1..].iter().any(|&b| b != 0) {
                return Err(Error::InvalidEncoding);
            }
            return Ok(G1Affine::zero());
        }
        let x = BigInteger384::from_be_slice(&bytes[..48])
            .and_then(Fq::from_repr)
            .ok_or(Error::InvalidEncoding)?;
        let y = BigInteger384::from_be_slice(&bytes[48..])
            .and_then(Fq::from_repr)
            .ok_or(Error::InvalidEncoding)?;
        let p = G1Affine::new(x, y, false);
        if !p.is_on_curve() {
            return Err(Error::NotOnCurve);
        }
        if !p.is_in_correct_subgroup() {
            return Err(Error::NotInSubgroup);
        }
        Ok(p)
    }
}

impl Neg for G1Affine {
    type Output = G1Affine;

    fn neg(self) -> G1Affine {
        if self.is_zero() {
            self
        } else {
            G1Affine::new(self.x, -self.y, false)
        }
    }
}

impl Mul<Fr> for G1Affine {
    type Output = G1Projective;

    fn mul(self, other: Fr) -> G1Projective {
        self.mul_bits(BitIterator::new(other.into_repr()))
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct G1Projective {
    pub x: Fq,
    pub y: Fq,
    pub z: Fq,
}

impl G1Projective {
    pub fn new(x: Fq, y: Fq, z: Fq) -> Self {
        G1Projective { x, y, z }
    }

    // Z = 0 denotes infinity.
    pub fn zero() -> Self {
        G1Projective::new(Fq::zero(), Fq::one(), Fq::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.z.is_zero()
    }

    pub fn prime_subgroup_generator() -> Self {
        G1Affine::prime_subgroup_generator().into()
    }

    pub fn double(&self) -> Self {
        let mut tmp = *self;
        tmp.double_in_place();
        tmp
    }

    /// dbl-2009-l, specialized to a = 0.
    pub fn double_in_place(&mut self) {
        if self.is_zero() {
            return;
        }

        // A = X1^2
        let mut a = self.x.square();
        // B = Y1^2
        let b = self.y.square();
        // C = B^2
        let mut c = b.square();
        // D = 2*((X1+B)^2-A-C)
        let d = ((self.x + b).square() - a - c).double();
        // E = 3*A
        let old_a = a;
        a = a.double();
        let e = old_a + a;
        // F = E^2
        let f = e.square();
        // Z3 = 2*Y1*Z1
        self.z *= self.y;
        self.z = self.z.double();
        // X3 = F-2*D
        self.x = f - d - d;
        // Y3 = E*(D-X3)-8*C
        c = c.double();
        c = c.double();
        c = c.double();
        self.y = (d - self.x) * e - c;
    }

    /// madd-2007-bl mixed addition with an affine point.
    pub fn add_assign_mixed(&mut self, other: &G1Affine) {
        if other.is_zero() {
            return;
        }
        if self.is_zero() {
            self.x = other.x;
            self.y = other.y;
            self.z = Fq::one();
            return;
        }

        // Z1Z1 = Z1^2
        let z1z1 = self.z.square();
        // U2 = X2*Z1Z1
        let u2 = other.x * z1z1;
        // S2 = Y2*Z1*Z1Z1
        let s2 = (other.y * self.z) * z1z1;

        if self.x == u2 && self.y == s2 {
            self.double_in_place();
            return;
        }

        // Adding P and -P sends H and therefore Z to zero.
        // H = U2-X1
        let h = u2 - self.x;
        // HH = H^2
        let hh = h.square();
        // I = 4*HH
        let i = hh.double().double();
        // J = H*I
        let mut j = h * i;
        // r = 2*(S2-Y1)
        let r = (s2 - self.y).double();
        // V = X1*I
        let v = self.x * i;
        // X3 = r^2 - J - 2*V
        self.x = r.square() - j - v - v;
        // Y3 = r*(V-X3)-2*Y1*J
        j *= self.y;
        j = j.double();
        self.y = (v - self.x) * r - j;
        // Z3 = (Z1+H)^2-Z1Z1-HH
        self.z = (self.z + h).square() - z1z1 - hh;
    }

    pub fn into_affine(&self) -> G1Affine {
        (*self).into()
    }
}

impl PartialEq for G1Projective {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() {
            return other.is_zero();
        }
        if other.is_zero() {
            return false;
        }

        // (X, Y, Z) ~ (X', Y', Z') iff X*Z'^2 = X'*Z^2 and Y*Z'^3 = Y'*Z^3.
        let z1 = self.z.square();
        let z2 = other.z.square();
        self.x * z2 == other.x * z1 && self.y * (z2 * other.z) == other.y * (z1 * self.z)
    }
}

impl Eq for G1Projective {}

impl Neg for G1Projective {
    type Output = G1Projective;

    fn neg(self) -> G1Projective {
        if self.is_zero() {
            self
        } else {
            G1Projective::new(self.x, -self.y, self.z)
        }
    }
}

impl Add for G1Projective {
    type Output = G1Projective;

    fn add(self, other: G1Projective) -> G1Projective {
        let mut copy = self;
        copy += other;
        copy
    }
}

impl AddAssign for G1Projective {
    /// add-2007-bl, full Jacobian addition.
    fn add_assign(&mut self, other: G1Projective) {
        if self.is_zero() {
            *self = other;
            return;
        }
        if other.is_zero() {
            return;
        }

        // Z1Z1 = Z1^2
        let z1z1 = self.z.square();
        // Z2Z2 = Z2^2
        let z2z2 = other.z.square();
        // U1 = X1*Z2Z2
        let u1 = self.x * z2z2;
        // U2 = X2*Z1Z1
        let u2 = other.x * z1z1;
        // S1 = Y1*Z2*Z2Z2
        let s1 = self.y * other.z * z2z2;
        // S2 = Y2*Z1*Z1Z1
        let s2 = other.y * self.z * z1z1;

        if u1 == u2 && s1 == s2 {
            self.double_in_place();
            return;
        }

        // H = U2-U1
        let h = u2 - u1;
        // I = (2*H)^2
        let i = h.double().square();
        // J = H*I
        let j = h * i;
        // r = 2*(S2-S1)
        let r = (s2 - s1).double();
        // V = U1*I
        let v = u1 * i;
        // X3 = r^2 - J - 2*V
        self.x = r.square() - j - v.double();
        // Y3 = r*(V - X3) - 2*S1*J
        self.y = r * (v - self.x) - (s1 * j).double();
        // Z3 = ((Z1+Z2)^2 - Z1Z1 - Z2Z2)*H
        self.z = ((self.z + other.z).square() - z1z1 - z2z2) * h;
    }
}

impl Sub for G1Projective {
    type Output = G1Projective;

    fn sub(self, other: G1Projective) -> G1Projective {
        self + (-other)
    }
}

impl SubAssign for G1Projective {
    fn sub_assign(&mut self, other: G1Projective) {
        *self += -other;
    }
}

impl Mul<Fr> for G1Projective {
    type Output = G1Projective;

    /// Double-and-add over the full 256-bit schedule; no early exit and
    /// no leading-zero skip, so the shape is independent of the scalar.
    fn mul(self, other: Fr) -> G1Projective {
        let mut res = G1Projective::zero();
        for b in BitIterator::new(other.into_repr()) {
            res.double_in_place();
            if b {
                res += self;
            }
        }
        res
    }
}

impl From<G1Affine> for G1Projective {
    fn from(p: G1Affine) -> G1Projective {
        if p.is_zero() {
            G1Projective::zero()
        } else {
            G1Projective::new(p.x, p.y, Fq::one())
        }
    }
}

impl From<G1Projective> for G1Affine {
    fn from(p: G1Projective) -> G1Affine {
        if p.is_zero() {
            G1Affine::zero()
        } else if p.z == Fq::one() {
            G1Affine::new(p.x, p.y, false)
        } else {
            // Z is nonzero here, so it has an inverse.
            let zinv = p.z.inverse().unwrap();
            let zinv_squared = zinv.square();
            G1Affine::new(p.x * zinv_squared, p.y * (zinv_squared * zinv), false)
        }
    }
}

impl Distribution<G1Projective> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> G1Projective {
        G1Projective::prime_subgroup_generator() * rng.gen::<Fr>()
    }
}

impl fmt::Display for G1Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.infinity {
            write!(f, "G1Affine(infinity)")
        } else {
            write!(f, "G1Affine(x={}, y={})", self.x, self.y)
        }
    }
}

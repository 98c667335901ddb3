//! G2: the prime-order subgroup of the M-twist E'(Fp2),
//! E': y² = x³ + 4(u + 1).
//!
//! Besides the group law this module prepares points for pairing: the
//! Miller loop only ever consumes the line coefficients computed here,
//! in homogeneous projective coordinates.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use crate::biginteger::{BigInteger384, BitIterator};
use crate::curves::{FLAG_COMPRESSED, FLAG_INFINITY, FLAG_MASK, FLAG_SIGN, G2_COFACTOR, X};
use crate::error::Error;
use crate::fields::{fr, Field, Fq, Fq2, Fr};

pub const G2_COMPRESSED_SIZE: usize = 96;
pub const G2_UNCOMPRESSED_SIZE: usize = 192;

const GENERATOR_X_C0: &str =
    "024aa2b2f08f0a91260805272dc51051c6e47ad4fa403b02b4510b647ae3d1770bac0326a805bbefd48056c8c121bdb8";
const GENERATOR_X_C1: &str =
    "13e02b6052719f607dacd3a088274f65596bd0d09920b61ab5da61bbdc7f5049334cf11213945d57e5ac7d055d042b7e";
const GENERATOR_Y_C0: &str =
    "0ce5d527727d6e118cc9cdc6da2e351aadfd9baa8cbdd3a76d429a695160d12c923ac9cc3baca289e193548608b82801";
const GENERATOR_Y_C1: &str =
    "0606c4a02ea734cc32acd2b02bc28b99cb3e287e85a763af267492ab572e99ab3f370d275cec1da1aaa9075ff05f79be";

fn fq_from_hex(s: &str) -> Fq {
    BigInteger384::from_be_hex(s)
        .and_then(Fq::from_repr)
        .expect("curve constant is a canonical field element")
}

/// B' = 4(u + 1), the twisted curve coefficient.
pub(crate) fn coeff_b() -> Fq2 {
    Fq2::new(Fq::from(4), Fq::from(4))
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct G2Affine {
    pub x: Fq2,
    pub y: Fq2,
    pub infinity: bool,
}

impl G2Affine {
    pub fn new(x: Fq2, y: Fq2, infinity: bool) -> Self {
        G2Affine { x, y, infinity }
    }

    pub fn zero() -> Self {
        G2Affine::new(Fq2::zero(), Fq2::one(), true)
    }

    pub fn is_zero(&self) -> bool {
        self.infinity
    }

    pub fn prime_subgroup_generator() -> Self {
        static GEN: OnceLock<G2Affine> = OnceLock::new();
        *GEN.get_or_init(|| {
            G2Affine::new(
                Fq2::new(fq_from_hex(GENERATOR_X_C0), fq_from_hex(GENERATOR_X_C1)),
                Fq2::new(fq_from_hex(GENERATOR_Y_C0), fq_from_hex(GENERATOR_Y_C1)),
                false,
            )
        })
    }

    pub fn is_on_curve(&self) -> bool {
        if self.is_zero() {
            true
        } else {
            self.y.square() == self.x.square() * self.x + coeff_b()
        }
    }

    pub fn is_in_correct_subgroup(&self) -> bool {
        self.mul_bits(BitIterator::new(fr::MODULUS)).is_zero()
    }

    pub fn mul_bits<S: AsRef<[u64]>>(&self, bits: BitIterator<S>) -> G2Projective {
        let mut res = G2Projective::zero();
        for b in bits {
            res.double_in_place();
            if b {
                res.add_assign_mixed(self);
            }
        }
        res
    }

    pub fn scale_by_cofactor(&self) -> G2Projective {
        self.mul_bits(BitIterator::new(G2_COFACTOR))
    }

    pub fn from_x_coordinate(x: Fq2, greatest: bool) -> Option<Self> {
        let y2 = x.square() * x + coeff_b();
        y2.sqrt().map(|y| {
            let chosen = if y.lexicographically_largest() == greatest { y } else { -y };
            G2Affine::new(x, chosen, false)
        })
    }

    pub fn into_projective(self) -> G2Projective {
        self.into()
    }

    /// 96-byte compressed encoding, c1 ‖ c0, flags on the first byte.
    pub fn to_compressed(&self) -> [u8; G2_COMPRESSED_SIZE] {
        let mut out = [0u8; G2_COMPRESSED_SIZE];
        if self.infinity {
            out[0] = FLAG_COMPRESSED | FLAG_INFINITY;
            return out;
        }
        out[..48].copy_from_slice(&self.x.c1.into_repr().to_bytes_be());
        out[48..].copy_from_slice(&self.x.c0.into_repr().to_bytes_be());
        out[0] |= FLAG_COMPRESSED;
        if self.y.lexicographically_largest() {
            out[0] |= FLAG_SIGN;
        }
        out
    }

    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G2_COMPRESSED_SIZE {
            return Err(Error::InvalidLength {
                expected: G2_COMPRESSED_SIZE,
                got: bytes.len(),
            });
        }
        if bytes[0] & FLAG_COMPRESSED == 0 {
            return Err(Error::InvalidEncoding);
        }
        if bytes[0] & FLAG_INFINITY != 0 {
            if bytes[0] & !(FLAG_COMPRESSED | FLAG_INFINITY) != 0
                || bytes[1..].iter().any(|&b| b != 0)
            {
                return Err(Error::InvalidEncoding);
            }
            return Ok(G2Affine::zero());
        }
        let greatest = bytes[0] & FLAG_SIGN != 0;
        let mut c1_bytes = [0u8; 48];
        c1_bytes.copy_from_slice(&bytes[..48]);
        c1_bytes[0] &= !FLAG_MASK;
        let c1 = BigInteger384::from_be_slice(&c1_bytes)
            .and_then(Fq::from_repr)
            .ok_or(Error::InvalidEncoding)?;
        let c0 = BigInteger384::from_be_slice(&bytes[48..])
            .and_then(Fq::from_repr)
            .ok_or(Error::InvalidEncoding)?;
        let x = Fq2::new(c0, c1);
        let p = G2Affine::from_x_coordinate(x, greatest).ok_or(Error::NotOnCurve)?;
        if !p.is_in_correct_subgroup() {
            return Err(Error::NotInSubgroup);
        }
        Ok(p)
    }

    /// 192-byte uncompressed encoding x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0.
    pub fn to_uncompressed(&self) -> [u8; G2_UNCOMPRESSED_SIZE] {
        let mut out = [0u8; G2_UNCOMPRESSED_SIZE];
        if self.infinity {
            out[0] = FLAG_INFINITY;
            return out;
        }
        out[..48].copy_from_slice(&self.x.c1.into_repr().to_bytes_be());
        out[48..96].copy_from_slice(&self.x.c0.into_repr().to_bytes_be());
        out[96..144].copy_from_slice(&self.y.c1.into_repr().to_bytes_be());
        out[144..].copy_from_slice(&self.y.c0.into_repr().to_bytes_be());
        out
    }

    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G2_UNCOMPRESSED_SIZE {
            return Err(Error::InvalidLength {
                expected: G2_UNCOMPRESSED_SIZE,
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
            return Ok(G2Affine::zero());
        }
        let parse = |chunk: &[u8]| {
            BigInteger384::from_be_slice(chunk)
                .and_then(Fq::from_repr)
                .ok_or(Error::InvalidEncoding)
        };
        let x = Fq2::new(parse(&bytes[48..96])?, parse(&bytes[..48])?);
        let y = Fq2::new(parse(&bytes[144..])?, parse(&bytes[96..144])?);
        let p = G2Affine::new(x, y, false);
        if !p.is_on_curve() {
            return Err(Error::NotOnCurve);
        }
        if !p.is_in_correct_subgroup() {
            return Err(Error::NotInSubgroup);
        }
        Ok(p)
    }
}

impl Neg for G2Affine {
    type Output = G2Affine;

    fn neg(self) -> G2Affine {
        if self.is_zero() {
            self
        } else {
            G2Affine::new(self.x, -self.y, false)
        }
    }
}

impl Mul<Fr> for G2Affine {
    type Output = G2Projective;

    fn mul(self, other: Fr) -> G2Projective {
        self.mul_bits(BitIterator::new(other.into_repr()))
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct G2Projective {
    pub x: Fq2,
    pub y: Fq2,
    pub z: Fq2,
}

impl G2Projective {
    pub fn new(x: Fq2, y: Fq2, z: Fq2) -> Self {
        G2Projective { x, y, z }
    }

    pub fn zero() -> Self {
        G2Projective::new(Fq2::zero(), Fq2::one(), Fq2::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.z.is_zero()
    }

    pub fn prime_subgroup_generator() -> Self {
        G2Affine::prime_subgroup_generator().into()
    }

    pub fn double(&self) -> Self {
        let mut tmp = *self;
        tmp.double_in_place();
        tmp
    }

    pub fn double_in_place(&mut self) {
        if self.is_zero() {
            return;
        }

        let mut a = self.x.square();
        let b = self.y.square();
        let mut c = b.square();
        let d = ((self.x + b).square() - a - c).double();
        let old_a = a;
        a = a.double();
        let e = old_a + a;
        let f = e.square();
        self.z *= self.y;
        self.z = self.z.double();
        self.x = f - d - d;
        c = c.double();
        c = c.double();
        c = c.double();
        self.y = (d - self.x) * e - c;
    }

    pub fn add_assign_mixed(&mut self, other: &G2Affine) {
        if other.is_zero() {
            return;
        }
        if self.is_zero() {
            self.x = other.x;
            self.y = other.y;
            self.z = Fq2::one();
            return;
        }

        let z1z1 = self.z.square();
        let u2 = other.x * z1z1;
        let s2 = (other.y * self.z) * z1z1;

        if self.x == u2 && self.y == s2 {
            self.double_in_place();
            return;
        }

        let h = u2 - self.x;
        let hh = h.square();
        let i = hh.double().double();
        let mut j = h * i;
        let r = (s2 - self.y).double();
        let v = self.x * i;
        self.x = r.square() - j - v - v;
        j *= self.y;
        j = j.double();
        self.y = (v - self.x) * r - j;
        self.z = (self.z + h).square() - z1z1 - hh;
    }

    pub fn into_affine(&self) -> G2Affine {
        (*self).into()
    }
}

impl PartialEq for G2Projective {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() {
            return other.is_zero();
        }
        if other.is_zero() {
            return false;
        }
        let z1 = self.z.square();
        let z2 = other.z.square();
        self.x * z2 == other.x * z1 && self.y * (z2 * other.z) == other.y * (z1 * self.z)
    }
}

impl Eq for G2Projective {}

impl Neg for G2Projective {
    type Output = G2Projective;

    fn neg(self) -> G2Projective {
        if self.is_zero() {
            self
        } else {
            G2Projective::new(self.x, -self.y, self.z)
        }
    }
}

impl Add for G2Projective {
    type Output = G2Projective;

    fn add(self, other: G2Projective) -> G2Projective {
        let mut copy = self;
        copy += other;
        copy
    }
}

impl AddAssign for G2Projective {
    fn add_assign(&mut self, other: G2Projective) {
        if self.is_zero() {
            *self = other;
            return;
        }
        if other.is_zero() {
            return;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;

        if u1 == u2 && s1 == s2 {
            self.double_in_place();
            return;
        }

        let h = u2 - u1;
        let i = h.double().square();
        let j = h * i;
        let r = (s2 - s1).double();
        let v = u1 * i;
        self.x = r.square() - j - v.double();
        self.y = r * (v - self.x) - (s1 * j).double();
        self.z = ((self.z + other.z).square() - z1z1 - z2z2) * h;
    }
}

impl Sub for G2Projective {
    type Output = G2Projective;

    fn sub(self, other: G2Projective) -> G2Projective {
        self + (-other)
    }
}

impl SubAssign for G2Projective {
    fn sub_assign(&mut self, other: G2Projective) {
        *self += -other;
    }
}

impl Mul<Fr> for G2Projective {
    type Output = G2Projective;

    fn mul(self, other: Fr) -> G2Projective {
        let mut res = G2Projective::zero();
        for b in BitIterator::new(other.into_repr()) {
            res.double_in_place();
            if b {
                res += self;
            }
        }
        res
    }
}

impl From<G2Affine> for G2Projective {
    fn from(p: G2Affine) -> G2Projective {
        if p.is_zero() {
            G2Projective::zero()
        } else {
            G2Projective::new(p.x, p.y, Fq2::one())
        }
    }
}

impl From<G2Projective> for G2Affine {
    fn from(p: G2Projective) -> G2Affine {
        if p.is_zero() {
            G2Affine::zero()
        } else if p.z == Fq2::one() {
            G2Affine::new(p.x, p.y, false)
        } else {
            let zinv = p.z.inverse().unwrap();
            let zinv_squared = zinv.square();
            G2Affine::new(p.x * zinv_squared, p.y * (zinv_squared * zinv), false)
        }
    }
}

impl Distribution<G2Projective> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> G2Projective {
        G2Projective::prime_subgroup_generator() * rng.gen::<Fr>()
    }
}

impl fmt::Display for G2Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.infinity {
            write!(f, "G2Affine(infinity)")
        } else {
            write!(f, "G2Affine(x={:?}, y={:?})", self.x, self.y)
        }
    }
}

/// A G2 point with the line coefficients of every Miller-loop step
/// precomputed, one triple per doubling and one per addition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct G2Prepared {
    pub ell_coeffs: Vec<(Fq2, Fq2, Fq2)>,
    pub infinity: bool,
}

/// Homogeneous projective coordinates used only while accumulating line
/// coefficients.
struct G2HomProjective {
    x: Fq2,
    y: Fq2,
    z: Fq2,
}

impl G2Prepared {
    pub fn is_zero(&self) -> bool {
        self.infinity
    }

    pub fn from_affine(q: G2Affine) -> Self {
        if q.is_zero() {
            return G2Prepared {
                ell_coeffs: vec![],
                infinity: true,
            };
        }

        let two_inv = Fq::from(2).inverse().unwrap();
        let mut ell_coeffs = vec![];
        let mut r = G2HomProjective {
            x: q.x,
            y: q.y,
            z: Fq2::one(),
        };

        for i in BitIterator::new(X).skip(1) {
            ell_coeffs.push(doubling_step(&mut r, &two_inv));
            if i {
                ell_coeffs.push(addition_step(&mut r, &q));
            }
        }

        G2Prepared {
            ell_coeffs,
            infinity: false,
        }
    }
}

impl From<G2Affine> for G2Prepared {
    fn from(q: G2Affine) -> Self {
        G2Prepared::from_affine(q)
    }
}

fn doubling_step(r: &mut G2HomProjective, two_inv: &Fq) -> (Fq2, Fq2, Fq2) {
    // Line function for doubling in homogeneous projective coordinates,
    // M-twist coefficient order.
    let mut a = r.x * r.y;
    a.mul_by_fp(two_inv);
    let b = r.y.square();
    let c = r.z.square();
    let e = coeff_b() * (c.double() + c);
    let f = e.double() + e;
    let mut g = b + f;
    g.mul_by_fp(two_inv);
    let h = (r.y + r.z).square() - (b + c);
    let i = e - b;
    let j = r.x.square();
    let e_square = e.square();

    r.x = a * (b - f);
    r.y = g.square() - (e_square.double() + e_square);
    r.z = b * h;
    (i, j.double() + j, -h)
}

fn addition_step(r: &mut G2HomProjective, q: &G2Affine) -> (Fq2, Fq2, Fq2) {
    // Line function for mixed addition in homogeneous projective
    // coordinates, M-twist coefficient order.
    let theta = r.y - (q.y * r.z);
    let lambda = r.x - (q.x * r.z);
    let c = theta.square();
    let d = lambda.square();
    let e = lambda * d;
    let f = r.z * c;
    let g = r.x * d;
    let h = e + f - g.double();

    r.x = lambda * h;
    r.y = theta * (g - h) - (e * r.y);
    r.z *= e;
    let j = theta * q.x - (lambda * q.y);
    (j, -theta, lambda)
}

//! Deterministic hashing of (message, domain) into G2.
//!
//! The pipeline is expand → map → sum → clear cofactor: a Shake256 XOF
//! stretches the input into two Fp2 elements, each runs through the
//! Shallue–van de Woestijne map onto the twisted curve, the two points
//! are added and the G2 cofactor is cleared. Different domains expand to
//! independent field elements, which is what separates signature
//! contexts.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;
use std::sync::OnceLock;

use crate::curves::g2::coeff_b;
use crate::curves::{G2Affine, G2Projective};
use crate::fields::{Field, Fq, Fq2};

/// g(x) = x³ + 4(u+1), the twisted curve's right-hand side.
fn g(x: Fq2) -> Fq2 {
    x.square() * x + coeff_b()
}

fn inv0(x: Fq2) -> Fq2 {
    x.inverse().unwrap_or_else(Fq2::zero)
}

/// Reduce a 64-byte XOF block into Fp; the 131-bit surplus keeps the
/// result statistically uniform.
fn fq_from_wide_be(bytes: &[u8]) -> Fq {
    let mut acc = Fq::zero();
    for &byte in bytes {
        for _ in 0..8 {
            acc = acc.double();
        }
        acc += Fq::from(byte as u64);
    }
    acc
}

/// Expand message ‖ domain (8 bytes big-endian) into two Fp2 elements.
fn hash_to_field(message: &[u8], domain: u64) -> (Fq2, Fq2) {
    let mut xof = Shake256::default();
    xof.update(message);
    xof.update(&domain.to_be_bytes());
    let mut reader = xof.finalize_xof();

    let mut coords = [Fq::zero(); 4];
    for c in coords.iter_mut() {
        let mut chunk = [0u8; 64];
        reader.read(&mut chunk);
        *c = fq_from_wide_be(&chunk);
    }
    (
        Fq2::new(coords[0], coords[1]),
        Fq2::new(coords[2], coords[3]),
    )
}

/// Constants of the Shallue–van de Woestijne map for g.
struct SvdwParams {
    z: Fq2,
    c1: Fq2,
    c2: Fq2,
    c3: Fq2,
    c4: Fq2,
}

fn try_z(z: Fq2) -> Option<SvdwParams> {
    let gz = g(z);
    if gz.is_zero() {
        return None;
    }
    let z2 = z.square();
    let three_z2 = z2.double() + z2;
    if three_z2.is_zero() {
        return None;
    }
    // -(3z²)/(4·g(z)) must be a nonzero square.
    let ratio = -(three_z2 * gz.double().double().inverse()?);
    if ratio.is_zero() || !ratio.is_square() {
        return None;
    }
    // g(z) or g(-z/2) must be a square.
    let two_inv = Fq::from(2).inverse()?;
    let mut c2 = -z;
    c2.mul_by_fp(&two_inv);
    if !(gz.is_square() || g(c2).is_square()) {
        return None;
    }

    // c3 = sqrt(-g(z)·3z²), the root with sgn0 = 0; it exists because
    // its radicand differs from `ratio` by the square (2·g(z))².
    let mut c3 = (-(gz * three_z2)).sqrt()?;
    if c3.sgn0() {
        c3 = -c3;
    }
    let c4 = -(gz.double().double()) * three_z2.inverse()?;

    Some(SvdwParams { z, c1: gz, c2, c3, c4 })
}

/// The smallest working z in the order 1, -1, 2, -2, ...
fn svdw_params() -> &'static SvdwParams {
    static PARAMS: OnceLock<SvdwParams> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let mut ctr = 1u64;
        loop {
            let candidate = Fq2::from(ctr);
            for &z in &[candidate, -candidate] {
                if let Some(params) = try_z(z) {
                    return params;
                }
            }
            ctr += 1;
        }
    })
}

/// Map one field element onto the twisted curve. Never returns infinity;
/// subgroup membership is the caller's business.
fn map_to_curve(u: &Fq2) -> G2Affine {
    let params = svdw_params();

    let mut tv1 = u.square() * params.c1;
    let tv2 = Fq2::one() + tv1;
    tv1 = Fq2::one() - tv1;
    let tv3 = inv0(tv1 * tv2);
    let tv4 = (*u * tv1) * tv3 * params.c3;

    let x1 = params.c2 - tv4;
    let e1 = g(x1).is_square();
    let x2 = params.c2 + tv4;
    let e2 = g(x2).is_square() && !e1;
    let x3 = (tv2.square() * tv3).square() * params.c4 + params.z;

    let x = if e1 {
        x1
    } else if e2 {
        x2
    } else {
        x3
    };
    // g(x1)·g(x2)·g(x3) is always a square, so the fallback is covered.
    let mut y = g(x).sqrt().expect("one of the three SvdW candidates is a square");
    if y.sgn0() != u.sgn0() {
        y = -y;
    }
    G2Affine::new(x, y, false)
}

/// Hash arbitrary message bytes and an 8-byte domain tag into the
/// prime-order subgroup of G2.
pub fn hash_to_g2(message: &[u8], domain: u64) -> G2Projective {
    let (t0, t1) = hash_to_field(message, domain);
    let sum = map_to_curve(&t0).into_projective() + map_to_curve(&t1).into_projective();
    sum.into_affine().scale_by_cofactor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    #[test]
    fn svdw_constants_satisfy_their_defining_relations() {
        let p = svdw_params();
        let z2 = p.z.square();
        let three_z2 = z2.double() + z2;
        assert_eq!(p.c1, g(p.z));
        assert_eq!(p.c2.double(), -p.z);
        assert_eq!(p.c3.square(), -(g(p.z) * three_z2));
        assert!(!p.c3.sgn0());
        assert_eq!(p.c4 * three_z2, -(g(p.z).double().double()));
    }

    #[test]
    fn map_lands_on_the_twisted_curve() {
        let mut rng = XorShiftRng::seed_from_u64(67);
        for _ in 0..20 {
            let u: Fq2 = rng.gen();
            let p = map_to_curve(&u);
            assert!(!p.is_zero());
            assert!(p.is_on_curve());
        }
    }

    #[test]
    fn map_is_deterministic() {
        let mut rng = XorShiftRng::seed_from_u64(68);
        let u: Fq2 = rng.gen();
        assert_eq!(map_to_curve(&u), map_to_curve(&u));
    }

    #[test]
    fn hash_lands_in_the_subgroup() {
        for (msg, domain) in [(&b"abc"[..], 0u64), (&b""[..], 1), (&[0xffu8; 100][..], 42)] {
            let h = hash_to_g2(msg, domain).into_affine();
            assert!(h.is_on_curve());
            assert!(h.is_in_correct_subgroup());
        }
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_to_g2(b"msg", 7), hash_to_g2(b"msg", 7));
    }

    #[test]
    fn messages_and_domains_separate() {
        let base = hash_to_g2(b"msg", 7);
        assert_ne!(base, hash_to_g2(b"msg2", 7));
        assert_ne!(base, hash_to_g2(b"msg", 8));
        // The domain is length-framed apart from the message.
        assert_ne!(hash_to_g2(b"", 0x6162_6364_6566_6768), hash_to_g2(b"abcdefgh", 0));
    }

    #[test]
    fn wide_reduction_is_uniformish_over_small_inputs() {
        // 2^512 - 1 reduced by the Horner loop equals the field element
        // computed by repeated doubling, by construction; spot-check the
        // small end instead.
        assert_eq!(fq_from_wide_be(&[0u8; 64]), Fq::zero());
        assert_eq!(fq_from_wide_be(&[1]), Fq::one());
        assert_eq!(fq_from_wide_be(&[1, 0]), Fq::from(256));
    }
}

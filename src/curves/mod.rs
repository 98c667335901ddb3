//! The two pairing groups G1 ⊂ E(Fp) and G2 ⊂ E'(Fp2), their group law,
//! encodings, and the ate pairing between them.
//!
//! Everything about the curve family is polynomial in the BLS parameter
//! z = -0xd201000000010000; the cofactors are evaluated from those
//! polynomials at compile time, and the hardcoded field moduli are
//! checked against theirs.

use crate::biginteger::{
    const_add, const_add_u64, const_div_small, const_mul, const_mul_u64, const_sub,
};
use crate::fields::{fq, fr};

pub mod g1;
pub mod g2;
pub mod pairing;


pub use self::g1::{G1Affine, G1Projective};
pub use self::g2::{G2Affine, G2Prepared, G2Projective};
pub use self::pairing::{final_exponentiation, miller_loop, pairing, product_of_pairings, G1Prepared};

/// |z|, the ate loop count. z itself is negative.
pub const X: &[u64] = &[0xd201000000010000];
pub const X_IS_NEGATIVE: bool = true;

const C: u64 = 0xd201000000010000;

const fn wide(value: u64) -> [u64; 8] {
    let mut out = [0u64; 8];
    out[0] = value;
    out
}

const fn widen6(a: [u64; 6]) -> [u64; 8] {
    [a[0], a[1], a[2], a[3], a[4], a[5], 0, 0]
}

const fn widen4(a: [u64; 4]) -> [u64; 8] {
    [a[0], a[1], a[2], a[3], 0, 0, 0, 0]
}

const fn const_eq8(a: [u64; 8], b: [u64; 8]) -> bool {
    let mut i = 0;
    while i < 8 {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

// Powers of |z|.
const C1: [u64; 8] = wide(C);
const C2: [u64; 8] = const_mul(C1, C1);
const C3: [u64; 8] = const_mul(C2, C1);
const C4: [u64; 8] = const_mul(C2, C2);
const C6: [u64; 8] = const_mul(C3, C3);
const C7: [u64; 8] = const_mul(C6, C1);
const C8: [u64; 8] = const_mul(C4, C4);

/// q = z^4 - z^2 + 1.
const Q_WIDE: [u64; 8] = const_add_u64(const_sub(C4, C2), 1);

/// p = (z-1)^2 * q / 3 + z; with z = -|z| this is (|z|+1)^2 * q / 3 - |z|.
const P_WIDE: [u64; 8] = const_sub(
    const_div_small(const_mul(const_mul(const_add_u64(C1, 1), const_add_u64(C1, 1)), Q_WIDE), 3),
    C1,
);

const _: () = assert!(const_eq8(Q_WIDE, widen4(fr::MODULUS.0)));
const _: () = assert!(const_eq8(P_WIDE, widen6(fq::MODULUS.0)));

/// G1 cofactor h1 = (z-1)^2 / 3.
pub const G1_COFACTOR: [u64; 2] = {
    let sq = const_mul(
        [C + 1, 0],
        [C + 1, 0],
    );
    const_div_small(sq, 3)
};

/// G2 cofactor
/// h2 = (z^8 - 4z^7 + 5z^6 - 4z^4 + 6z^3 - 4z^2 - 4z + 13) / 9,
/// written out in |z| = -z.
pub const G2_COFACTOR: [u64; 8] = {
    let pos = const_add(
        const_add(C8, const_mul_u64(C7, 4)),
        const_add(const_mul_u64(C6, 5), const_add_u64(const_mul_u64(C1, 4), 13)),
    );
    let neg = const_add(
        const_mul_u64(C4, 4),
        const_add(const_mul_u64(C3, 6), const_mul_u64(C2, 4)),
    );
    const_div_small(const_sub(pos, neg), 9)
};

// Serialization flags, highest three bits of the leading byte.
pub(crate) const FLAG_COMPRESSED: u8 = 0x80;
pub(crate) const FLAG_INFINITY: u8 = 0x40;
pub(crate) const FLAG_SIGN: u8 = 0x20;
pub(crate) const FLAG_MASK: u8 = 0xe0;

//! BLS signatures over the BLS12-381 pairing-friendly curve.
//!
//! The crate is a self-contained pairing stack: prime field arithmetic
//! mod the 381 bit p, the towered extensions Fp2/Fp6/Fp12, the groups
//! G1 ⊂ E(Fp) and G2 on the sextic twist E'(Fp2), compressed and
//! uncompressed point encodings, hashing into G2, and the optimal ate
//! pairing. The signature layer on top is deliberately thin:
//!
//! - `get_public_key`: pk = sk·g1 (48 bytes),
//! - `sign`: σ = sk·H(m, d) (96 bytes),
//! - `verify`: one product pairing e(-g1, σ)·e(pk, H(m, d)) = 1,
//! - `aggregate_public_keys` / `aggregate_signatures`: group sums,
//! - `verify_multiple`: one shared Miller loop over all signers.
//!
//! Scalars and messages enter through tagged inputs (bytes, hex, limbs)
//! and are normalized once at the boundary; domains are 8-byte tags that
//! separate signature contexts inside hash-to-curve.
//!
//! Arithmetic here is not constant time; keep secret keys away from
//! adversarial timing if that matters for your deployment.

pub mod biginteger;
pub mod bls;
pub mod curves;
pub mod error;
pub mod fields;
pub mod hash_to_curve;

pub use crate::biginteger::{BigInteger256, BigInteger384};
pub use crate::bls::{
    aggregate_public_keys, aggregate_signatures, get_public_key, sign, verify, verify_multiple,
    MessageInput, ScalarInput, SecretKey,
};
pub use crate::curves::{
    pairing, G1Affine, G1Prepared, G1Projective, G2Affine, G2Prepared, G2Projective,
};
pub use crate::error::Error;
pub use crate::fields::{Field, Fq, Fq12, Fq2, Fq6, Fr};
pub use crate::hash_to_curve::hash_to_g2;

/// The base field modulus p, as limbs.
pub const BASE_FIELD_MODULUS: BigInteger384 = fields::fq::MODULUS;

/// The subgroup order q, as limbs.
pub const SUBGROUP_ORDER: BigInteger256 = fields::fr::MODULUS;

//! The BLS signature scheme: thin compositions of the pairing stack.
//!
//! Public keys are 48-byte compressed G1 points, signatures 96-byte
//! compressed G2 points. Verification is a single product pairing:
//! e(-g1, σ)·e(pk, H(m, d)) = 1. Aggregation is plain group addition on
//! either side; multi-message verification extends the product by one
//! pair per signer and insists on distinct messages, since repeats would
//! let colluding signers cancel each other out.

use std::collections::HashSet;

use crate::curves::g1::G1_COMPRESSED_SIZE;
use crate::curves::g2::G2_COMPRESSED_SIZE;
use crate::curves::{
    product_of_pairings, G1Affine, G1Prepared, G1Projective, G2Affine, G2Prepared, G2Projective,
};
use crate::error::Error;
use crate::fields::{Field, Fq12, Fr};
use crate::hash_to_curve::hash_to_g2;

/// A scalar in one of the accepted input shapes. Whatever the shape, it
/// passes through one normalization front door and comes out reduced
/// mod q.
#[derive(Clone, Copy, Debug)]
pub enum ScalarInput<'a> {
    /// Big-endian bytes of any width.
    Bytes(&'a [u8]),
    /// Big-endian hex string, `0x` prefix and odd length allowed.
    Hex(&'a str),
    /// Little-endian 64-bit limbs of any width.
    U64s(&'a [u64]),
}

impl<'a> From<&'a [u8]> for ScalarInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ScalarInput::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ScalarInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        ScalarInput::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for ScalarInput<'a> {
    fn from(hex_str: &'a str) -> Self {
        ScalarInput::Hex(hex_str)
    }
}

impl<'a> From<&'a [u64]> for ScalarInput<'a> {
    fn from(limbs: &'a [u64]) -> Self {
        ScalarInput::U64s(limbs)
    }
}

/// A message in one of the accepted input shapes.
#[derive(Clone, Copy, Debug)]
pub enum MessageInput<'a> {
    Bytes(&'a [u8]),
    Hex(&'a str),
}

impl<'a> From<&'a [u8]> for MessageInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        MessageInput::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for MessageInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        MessageInput::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for MessageInput<'a> {
    fn from(hex_str: &'a str) -> Self {
        MessageInput::Hex(hex_str)
    }
}

fn hex_to_bytes(s: &str) -> Result<Vec<u8>, Error> {
    let s = s.trim_start_matches("0x");
    if s.len() % 2 == 1 {
        let mut padded = String::with_capacity(s.len() + 1);
        padded.push('0');
        padded.push_str(s);
        Ok(hex::decode(&padded)?)
    } else {
        Ok(hex::decode(s)?)
    }
}

fn normalize_message(input: MessageInput<'_>) -> Result<Vec<u8>, Error> {
    match input {
        MessageInput::Bytes(bytes) => Ok(bytes.to_vec()),
        MessageInput::Hex(s) => hex_to_bytes(s),
    }
}

/// A private key: a scalar reduced into [0, q).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey(Fr);

impl SecretKey {
    pub fn new<'a, I: Into<ScalarInput<'a>>>(input: I) -> Result<SecretKey, Error> {
        let scalar = match input.into() {
            ScalarInput::Bytes(bytes) => Fr::from_be_bytes_reduced(bytes),
            ScalarInput::Hex(s) => Fr::from_be_bytes_reduced(&hex_to_bytes(s)?),
            ScalarInput::U64s(limbs) => {
                let mut bytes = Vec::with_capacity(limbs.len() * 8);
                for limb in limbs.iter().rev() {
                    bytes.extend_from_slice(&limb.to_be_bytes());
                }
                Fr::from_be_bytes_reduced(&bytes)
            }
        };
        Ok(SecretKey(scalar))
    }
}

/// pk = sk·g1, compressed.
pub fn get_public_key(secret_key: &SecretKey) -> [u8; G1_COMPRESSED_SIZE] {
    (G1Affine::prime_subgroup_generator() * secret_key.0)
        .into_affine()
        .to_compressed()
}

/// σ = sk·H(m, d), compressed.
pub fn sign<'a, M: Into<MessageInput<'a>>>(
    message: M,
    secret_key: &SecretKey,
    domain: u64,
) -> Result<[u8; G2_COMPRESSED_SIZE], Error> {
    let message = normalize_message(message.into())?;
    let h = hash_to_g2(&message, domain);
    Ok((h * secret_key.0).into_affine().to_compressed())
}

/// Check e(-g1, σ)·e(pk, H(m, d)) = 1.
///
/// Malformed inputs surface as typed errors; a well-formed but wrong
/// signature, or an infinity key or signature, is a clean `false`.
pub fn verify<'a, M: Into<MessageInput<'a>>>(
    message: M,
    public_key: &[u8],
    signature: &[u8],
    domain: u64,
) -> Result<bool, Error> {
    let pk = G1Affine::from_compressed(public_key)?;
    let sig = G2Affine::from_compressed(signature)?;
    if pk.is_zero() || sig.is_zero() {
        return Ok(false);
    }
    let message = normalize_message(message.into())?;
    let h = hash_to_g2(&message, domain).into_affine();

    let pairs = [
        (
            G1Prepared::from(-G1Affine::prime_subgroup_generator()),
            G2Prepared::from(sig),
        ),
        (G1Prepared::from(pk), G2Prepared::from(h)),
    ];
    let product = product_of_pairings(&pairs).ok_or(Error::FieldArithmetic)?;
    Ok(product == Fq12::one())
}

/// Sum of public keys in G1, compressed. The list must be non-empty.
pub fn aggregate_public_keys<B: AsRef<[u8]>>(
    public_keys: &[B],
) -> Result<[u8; G1_COMPRESSED_SIZE], Error> {
    if public_keys.is_empty() {
        return Err(Error::InvalidLength {
            expected: G1_COMPRESSED_SIZE,
            got: 0,
        });
    }
    let mut acc = G1Projective::zero();
    for pk in public_keys {
        let p = G1Affine::from_compressed(pk.as_ref())?;
        acc.add_assign_mixed(&p);
    }
    Ok(acc.into_affine().to_compressed())
}

/// Sum of signatures in G2, compressed. The list must be non-empty.
pub fn aggregate_signatures<B: AsRef<[u8]>>(
    signatures: &[B],
) -> Result<[u8; G2_COMPRESSED_SIZE], Error> {
    if signatures.is_empty() {
        return Err(Error::InvalidLength {
            expected: G2_COMPRESSED_SIZE,
            got: 0,
        });
    }
    let mut acc = G2Projective::zero();
    for sig in signatures {
        let p = G2Affine::from_compressed(sig.as_ref())?;
        acc.add_assign_mixed(&p);
    }
    Ok(acc.into_affine().to_compressed())
}

/// Check an aggregate signature over per-signer messages:
/// e(-g1, σ)·∏ e(pk_i, H(m_i, d)) = 1.
///
/// Counts must match and messages must be pairwise distinct.
pub fn verify_multiple<B: AsRef<[u8]>>(
    messages: &[MessageInput<'_>],
    public_keys: &[B],
    signature: &[u8],
    domain: u64,
) -> Result<bool, Error> {
    if messages.len() != public_keys.len() {
        return Err(Error::LengthMismatch {
            messages: messages.len(),
            keys: public_keys.len(),
        });
    }

    let mut normalized = Vec::with_capacity(messages.len());
    for message in messages {
        normalized.push(normalize_message(*message)?);
    }
    let mut seen = HashSet::new();
    for message in &normalized {
        if !seen.insert(message.as_slice()) {
            return Err(Error::DuplicateMessage);
        }
    }

    let sig = G2Affine::from_compressed(signature)?;
    if sig.is_zero() {
        return Ok(false);
    }

    let mut pairs = Vec::with_capacity(public_keys.len() + 1);
    pairs.push((
        G1Prepared::from(-G1Affine::prime_subgroup_generator()),
        G2Prepared::from(sig),
    ));
    for (pk_bytes, message) in public_keys.iter().zip(&normalized) {
        let pk = G1Affine::from_compressed(pk_bytes.as_ref())?;
        if pk.is_zero() {
            return Ok(false);
        }
        let h = hash_to_g2(message, domain).into_affine();
        pairs.push((G1Prepared::from(pk), G2Prepared::from(h)));
    }

    let product = product_of_pairings(&pairs).ok_or(Error::FieldArithmetic)?;
    Ok(product == Fq12::one())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: u64 = 2;

    fn keypair<'a, I: Into<ScalarInput<'a>>>(input: I) -> (SecretKey, [u8; 48]) {
        let sk = SecretKey::new(input).unwrap();
        let pk = get_public_key(&sk);
        (sk, pk)
    }

    #[test]
    fn sign_and_verify() {
        let (sk, pk) = keypair("a665a45920422f9d417e4867ef");
        let message = [0x63u8, 0x64, 0x65, 0x66, 0x67];
        let sig = sign(&message, &sk, DOMAIN).unwrap();
        assert!(verify(&message, &pk, &sig, DOMAIN).unwrap());
    }

    #[test]
    fn verification_is_domain_separated() {
        let (sk, pk) = keypair("a665a45920422f9d417e4867ef");
        let message = [0x63u8, 0x64, 0x65, 0x66, 0x67];
        let sig = sign(&message, &sk, DOMAIN).unwrap();
        assert!(!verify(&message, &pk, &sig, 3).unwrap());
    }

    #[test]
    fn wrong_message_fails() {
        let (sk, pk) = keypair("a665a45920422f9d417e4867ef");
        let sig = sign(&b"hello"[..], &sk, DOMAIN).unwrap();
        assert!(!verify(&b"hallo"[..], &pk, &sig, DOMAIN).unwrap());
    }

    #[test]
    fn wrong_key_fails() {
        let (sk, _) = keypair(&[81u64][..]);
        let (_, other_pk) = keypair(&[82u64][..]);
        let message = b"message";
        let sig = sign(message, &sk, DOMAIN).unwrap();
        assert!(!verify(message, &other_pk, &sig, DOMAIN).unwrap());
    }

    #[test]
    fn tampered_signature_fails_or_errors() {
        let (sk, pk) = keypair("a665a45920422f9d417e4867ef");
        let message = [0x63u8, 0x64, 0x65, 0x66, 0x67];
        let mut sig = sign(&message, &sk, DOMAIN).unwrap();
        sig[95] ^= 0x01;
        match verify(&message, &pk, &sig, DOMAIN) {
            Ok(accepted) => assert!(!accepted),
            Err(e) => assert!(matches!(
                e,
                Error::InvalidEncoding | Error::NotOnCurve | Error::NotInSubgroup
            )),
        }
    }

    #[test]
    fn tampered_public_key_fails_or_errors() {
        let (sk, mut pk) = keypair("a665a45920422f9d417e4867ef");
        let message = [0x63u8, 0x64, 0x65, 0x66, 0x67];
        let sig = sign(&message, &sk, DOMAIN).unwrap();
        pk[47] ^= 0x80;
        match verify(&message, &pk, &sig, DOMAIN) {
            Ok(accepted) => assert!(!accepted),
            Err(e) => assert!(matches!(
                e,
                Error::InvalidEncoding | Error::NotOnCurve | Error::NotInSubgroup
            )),
        }
    }

    #[test]
    fn scalar_front_door_shapes_agree() {
        let from_hex = SecretKey::new("51").unwrap();
        let from_bytes = SecretKey::new(&[0x51u8][..]).unwrap();
        let from_limbs = SecretKey::new(&[0x51u64][..]).unwrap();
        assert_eq!(from_hex, from_bytes);
        assert_eq!(from_hex, from_limbs);
    }

    #[test]
    fn aggregate_signature_over_common_message() {
        let message = [0x63u8, 0x64, 0x65, 0x66, 0x67];
        let mut pks = vec![];
        let mut sigs = vec![];
        for sk_val in [81u64, 455, 19] {
            let (sk, pk) = keypair(&[sk_val][..]);
            sigs.push(sign(&message, &sk, DOMAIN).unwrap());
            pks.push(pk);
        }
        let agg_pk = aggregate_public_keys(&pks).unwrap();
        let agg_sig = aggregate_signatures(&sigs).unwrap();
        assert!(verify(&message, &agg_pk, &agg_sig, DOMAIN).unwrap());

        // The aggregate does not verify under any single signer's key.
        assert!(!verify(&message, &pks[0], &agg_sig, DOMAIN).unwrap());
    }

    #[test]
    fn aggregation_is_the_group_sum() {
        let (_, pk_a) = keypair(&[81u64][..]);
        let (_, pk_b) = keypair(&[455u64][..]);
        let a = G1Affine::from_compressed(&pk_a).unwrap();
        let b = G1Affine::from_compressed(&pk_b).unwrap();
        let mut sum = G1Projective::from(a);
        sum.add_assign_mixed(&b);
        let agg = aggregate_public_keys(&[pk_a, pk_b]).unwrap();
        assert_eq!(agg, sum.into_affine().to_compressed());
    }

    #[test]
    fn verify_multiple_distinct_messages() {
        let messages = [
            MessageInput::from("deadbeaf"),
            MessageInput::from("111111"),
            MessageInput::from("aaaaaabbbbbb"),
        ];
        let mut pks = vec![];
        let mut sigs = vec![];
        for (message, sk_val) in messages.iter().zip([81u64, 455, 19]) {
            let (sk, pk) = keypair(&[sk_val][..]);
            sigs.push(sign(*message, &sk, DOMAIN).unwrap());
            pks.push(pk);
        }
        let agg_sig = aggregate_signatures(&sigs).unwrap();
        assert!(verify_multiple(&messages, &pks, &agg_sig, DOMAIN).unwrap());
        assert!(!verify_multiple(&messages, &pks, &agg_sig, 3).unwrap());
    }

    #[test]
    fn verify_multiple_rejects_duplicates() {
        let (sk, pk) = keypair(&[81u64][..]);
        let sig = sign("deadbeaf", &sk, DOMAIN).unwrap();
        let agg = aggregate_signatures(&[sig, sig]).unwrap();
        let messages = [MessageInput::from("deadbeaf"), MessageInput::from("deadbeaf")];
        assert_eq!(
            verify_multiple(&messages, &[pk, pk], &agg, DOMAIN),
            Err(Error::DuplicateMessage)
        );
        // The same bytes in different shapes are still the same message.
        let mixed = [
            MessageInput::from("deadbeaf"),
            MessageInput::from(&[0xdeu8, 0xad, 0xbe, 0xaf]),
        ];
        assert_eq!(
            verify_multiple(&mixed, &[pk, pk], &agg, DOMAIN),
            Err(Error::DuplicateMessage)
        );
    }

    #[test]
    fn verify_multiple_rejects_count_mismatch() {
        let (sk, pk) = keypair(&[81u64][..]);
        let sig = sign("deadbeaf", &sk, DOMAIN).unwrap();
        let messages = [MessageInput::from("deadbeaf")];
        assert_eq!(
            verify_multiple(&messages, &[pk, pk], &sig, DOMAIN),
            Err(Error::LengthMismatch { messages: 1, keys: 2 })
        );
    }

    #[test]
    fn decode_errors_are_typed() {
        let (sk, pk) = keypair(&[81u64][..]);
        let sig = sign(&b"m"[..], &sk, DOMAIN).unwrap();
        assert_eq!(
            verify(&b"m"[..], &pk[..47], &sig, DOMAIN),
            Err(Error::InvalidLength { expected: 48, got: 47 })
        );
        assert_eq!(
            verify(&b"m"[..], &pk, &sig[..95], DOMAIN),
            Err(Error::InvalidLength { expected: 96, got: 95 })
        );
        let mut bad_pk = pk;
        bad_pk[0] &= 0x7f; // clear the compression flag
        assert_eq!(verify(&b"m"[..], &bad_pk, &sig, DOMAIN), Err(Error::InvalidEncoding));
    }

    #[test]
    fn empty_aggregation_is_rejected() {
        let empty: &[[u8; 48]] = &[];
        assert!(aggregate_public_keys(empty).is_err());
        let empty_sigs: &[[u8; 96]] = &[];
        assert!(aggregate_signatures(empty_sigs).is_err());
    }

    #[test]
    fn infinity_key_and_signature_are_rejected_cleanly() {
        let zero_sk = SecretKey::new(&[0u64][..]).unwrap();
        let pk = get_public_key(&zero_sk);
        assert_eq!(pk[0], 0xc0);
        let sig = sign(&b"m"[..], &zero_sk, DOMAIN).unwrap();
        // Both sides decode fine but verification refuses identities.
        assert!(!verify(&b"m"[..], &pk, &sig, DOMAIN).unwrap());
    }

    #[test]
    fn hex_front_door_oddities() {
        assert!(SecretKey::new("0x51").is_ok());
        assert!(SecretKey::new("5").is_ok());
        assert!(SecretKey::new("zz").is_err());
        assert!(matches!(sign("xyz", &SecretKey::new("51").unwrap(), DOMAIN), Err(Error::InvalidEncoding)));
    }
}

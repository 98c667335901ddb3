//! Error types surfaced by decoding and by the signature layer.

use std::fmt;

/// Failure modes of point/scalar decoding and of the aggregate
/// verification entry points.
///
/// A successfully decoded but cryptographically wrong signature is *not*
/// an error: `verify`/`verify_multiple` report it as a clean `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Byte input is not of the required fixed width.
    InvalidLength { expected: usize, got: usize },
    /// Flag bits are inconsistent, a coordinate is not below the field
    /// modulus, or a hex string is malformed.
    InvalidEncoding,
    /// The decoded coordinates do not satisfy the curve equation.
    NotOnCurve,
    /// The decoded point is on the curve but not of prime order q.
    NotInSubgroup,
    /// Inversion of zero or division by a non-invertible element.
    FieldArithmetic,
    /// `verify_multiple` was given message and key lists of unequal length.
    LengthMismatch { messages: usize, keys: usize },
    /// `verify_multiple` was given the same message twice.
    DuplicateMessage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength { expected, got } => {
                write!(f, "invalid input length: expected {} bytes, got {}", expected, got)
            }
            Error::InvalidEncoding => write!(f, "malformed encoding"),
            Error::NotOnCurve => write!(f, "point is not on the curve"),
            Error::NotInSubgroup => write!(f, "point is not in the prime-order subgroup"),
            Error::FieldArithmetic => write!(f, "field arithmetic failure (inverse of zero)"),
            Error::LengthMismatch { messages, keys } => {
                write!(f, "count mismatch: {} messages against {} public keys", messages, keys)
            }
            Error::DuplicateMessage => write!(f, "duplicate message in aggregate verification"),
        }
    }
}

impl std::error::Error for Error {}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Error::InvalidEncoding
    }
}

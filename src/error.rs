#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Context, Error};

use crate::algorithm::Curve;
use crate::keys::KeyKind;

#[derive(Debug, thiserror::Error)]
pub enum JWTError {
    #[error("Internal error: [{0}]")]
    InternalError(String),
    #[error("Expecting a key of type [{expected}], but found [{found}]")]
    InvalidKeyType { expected: KeyKind, found: KeyKind },
    #[error("Key length of [{bits}] is less than the required key length of {required} bits")]
    InvalidKeyLength { bits: usize, required: usize },
    #[error("Expecting a key on curve [{expected}], but found [{found}]")]
    InvalidCurve { expected: Curve, found: Curve },
    #[error("The provided PEM encoded string did not contain a private key")]
    MissingPrivateKey,
    #[error("The provided PEM encoded string did not contain a public key")]
    MissingPublicKey,
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("An unexpected error occurred when attempting to sign the JWT")]
    SigningFault,
    #[error("An unexpected error occurred when attempting to verify the JWT")]
    VerificationFault,
    #[error("Malformed JWT: {0}")]
    MalformedJWT(&'static str),
    #[error("Unsupported algorithm [{algorithm}]")]
    UnsupportedAlgorithm {
        algorithm: String,
        key_id: Option<String>,
    },
    #[error("Signature didn't verify")]
    InvalidSignature,
    #[error("Token has expired")]
    TokenHasExpired,
    #[error("Token not valid yet")]
    TokenNotValidYet,
    #[error("JWT algorithm mismatch")]
    AlgorithmMismatch,
    #[error("Unsupported signature transform [{0}]")]
    UnsupportedTransform(String),
    #[error("Signature engine misuse: {0}")]
    EngineMisuse(&'static str),
}

impl JWTError {
    pub(crate) fn unsupported_algorithm(algorithm: impl ToString) -> Self {
        JWTError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
            key_id: None,
        }
    }

    /// The token could not be parsed (structure, base64url or JSON).
    pub fn is_malformed(&self) -> bool {
        matches!(self, JWTError::MalformedJWT(_))
    }

    /// The algorithm is unknown, or no verifier was registered for it.
    pub fn is_unsupported_algorithm(&self) -> bool {
        matches!(self, JWTError::UnsupportedAlgorithm { .. })
    }

    pub fn is_invalid_signature(&self) -> bool {
        matches!(self, JWTError::InvalidSignature)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, JWTError::TokenHasExpired)
    }

    pub fn is_not_yet_valid(&self) -> bool {
        matches!(self, JWTError::TokenNotValidYet)
    }

    /// The key handed to a signer or verifier was rejected at construction time.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            JWTError::InvalidKeyType { .. }
                | JWTError::InvalidKeyLength { .. }
                | JWTError::InvalidCurve { .. }
                | JWTError::MissingPrivateKey
                | JWTError::MissingPublicKey
                | JWTError::InvalidKey(_)
        )
    }
}

impl From<&str> for JWTError {
    fn from(e: &str) -> JWTError {
        JWTError::InternalError(e.into())
    }
}

/// Returns the `JWTError` carried by `err`, if any.
///
/// Errors wrapped as context (signing and verification faults) are found too.
pub fn jwt_error(err: &Error) -> Option<&JWTError> {
    err.downcast_ref::<JWTError>()
}

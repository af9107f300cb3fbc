//! Signature engines and the providers that supply them.
//!
//! Signers and verifiers never call a primitive directly: they ask a
//! [`CryptoProvider`] for an engine by transform name (`"SHA256withRSA"`,
//! `"RSASSA-PSS"`, ...), initialise it with a key and stream the signing
//! input through it. Supplying a different provider swaps the whole
//! primitive layer.

use std::fmt::Debug;

use once_cell::sync::Lazy;

use crate::algorithm::{Curve, DigestAlgorithm, PssParameters};
use crate::error::*;
use crate::keys::{Key, KeyKind};

/// A single-use signature computation, in the init / update / finalize style.
pub trait SignatureEngine<'k>: Send {
    /// Configure RSASSA-PSS. Only meaningful for the `RSASSA-PSS` transform.
    fn set_pss_parameters(&mut self, _params: PssParameters) -> Result<(), Error> {
        bail!(JWTError::EngineMisuse(
            "this transform does not take PSS parameters"
        ))
    }

    fn init_sign(&mut self, key: &'k Key) -> Result<(), Error>;

    fn init_verify(&mut self, key: &'k Key) -> Result<(), Error>;

    fn update(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Finish a signing operation.
    fn sign(&mut self) -> Result<Vec<u8>, Error>;

    /// Finish a verification operation. A signature that merely fails to
    /// verify is `Ok(false)`; errors are reserved for engine faults.
    fn verify(&mut self, signature: &[u8]) -> Result<bool, Error>;
}

/// Source of signature engines.
pub trait CryptoProvider: Send + Sync + Debug {
    /// Provider name, for diagnostics.
    fn name(&self) -> &str;

    /// Create a fresh engine for `transform`.
    fn signature_engine<'k>(
        &self,
        transform: &str,
    ) -> Result<Box<dyn SignatureEngine<'k> + 'k>, Error>;
}

static DEFAULT_PROVIDER: Lazy<DefaultCryptoProvider> = Lazy::new(DefaultCryptoProvider::default);

/// The process-wide provider used when a configuration doesn't name one.
pub fn default_provider() -> &'static dyn CryptoProvider {
    &*DEFAULT_PROVIDER
}

/// Provider backed by the RustCrypto `rsa`, `p256`, `p384` and `p521` crates,
/// and by `hmac-sha256`/`hmac-sha512`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCryptoProvider;

impl CryptoProvider for DefaultCryptoProvider {
    fn name(&self) -> &str {
        "default"
    }

    fn signature_engine<'k>(
        &self,
        transform: &str,
    ) -> Result<Box<dyn SignatureEngine<'k> + 'k>, Error> {
        let transform = Transform::from_name(transform)
            .ok_or_else(|| JWTError::UnsupportedTransform(transform.to_string()))?;
        Ok(Box::new(DefaultSignatureEngine {
            transform,
            pss: None,
            state: State::Uninitialized,
            buffer: Vec::new(),
        }))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Transform {
    Hmac(DigestAlgorithm),
    RsaPkcs1v15(DigestAlgorithm),
    RsaPss,
    Ecdsa(DigestAlgorithm),
}

impl Transform {
    fn from_name(name: &str) -> Option<Self> {
        use DigestAlgorithm::*;

        let transform = match name {
            "HmacSHA256" => Transform::Hmac(Sha256),
            "HmacSHA384" => Transform::Hmac(Sha384),
            "HmacSHA512" => Transform::Hmac(Sha512),
            "SHA256withRSA" => Transform::RsaPkcs1v15(Sha256),
            "SHA384withRSA" => Transform::RsaPkcs1v15(Sha384),
            "SHA512withRSA" => Transform::RsaPkcs1v15(Sha512),
            "RSASSA-PSS" => Transform::RsaPss,
            "SHA256withECDSA" => Transform::Ecdsa(Sha256),
            "SHA384withECDSA" => Transform::Ecdsa(Sha384),
            "SHA512withECDSA" => Transform::Ecdsa(Sha512),
            _ => return None,
        };
        Some(transform)
    }

    fn signing_key_kind(self) -> KeyKind {
        match self {
            Transform::Hmac(_) => KeyKind::Hmac,
            Transform::RsaPkcs1v15(_) | Transform::RsaPss => KeyKind::RsaPrivate,
            Transform::Ecdsa(_) => KeyKind::EcPrivate,
        }
    }

    fn verification_key_kind(self) -> KeyKind {
        match self {
            Transform::Hmac(_) => KeyKind::Hmac,
            Transform::RsaPkcs1v15(_) | Transform::RsaPss => KeyKind::RsaPublic,
            Transform::Ecdsa(_) => KeyKind::EcPublic,
        }
    }
}

// The NIST curve crates hash with the digest that matches the curve size.
fn curve_digest(curve: Curve) -> DigestAlgorithm {
    match curve {
        Curve::P256 => DigestAlgorithm::Sha256,
        Curve::P384 => DigestAlgorithm::Sha384,
        Curve::P521 => DigestAlgorithm::Sha512,
    }
}

enum State<'k> {
    Uninitialized,
    Signing(&'k Key),
    Verifying(&'k Key),
}

struct DefaultSignatureEngine<'k> {
    transform: Transform,
    pss: Option<PssParameters>,
    state: State<'k>,
    buffer: Vec<u8>,
}

impl<'k> DefaultSignatureEngine<'k> {
    fn check_key(&self, key: &Key, expected: KeyKind) -> Result<(), Error> {
        let found = key.kind();
        ensure!(
            found == expected,
            JWTError::InvalidKeyType { expected, found }
        );
        if let (Transform::Ecdsa(digest), Some(curve)) = (self.transform, key.curve()) {
            ensure!(
                curve_digest(curve) == digest,
                JWTError::EngineMisuse("digest does not match the key's curve")
            );
        }
        Ok(())
    }

    fn pss_parameters(&self) -> Result<Option<&PssParameters>, Error> {
        match (self.transform, &self.pss) {
            (Transform::RsaPss, None) => bail!(JWTError::EngineMisuse(
                "RSASSA-PSS requires PSS parameters"
            )),
            (Transform::RsaPss, Some(params)) => Ok(Some(params)),
            _ => Ok(None),
        }
    }
}

impl<'k> SignatureEngine<'k> for DefaultSignatureEngine<'k> {
    fn set_pss_parameters(&mut self, params: PssParameters) -> Result<(), Error> {
        ensure!(
            self.transform == Transform::RsaPss,
            JWTError::EngineMisuse("this transform does not take PSS parameters")
        );
        ensure!(
            params.mgf1_digest == params.digest,
            JWTError::EngineMisuse("MGF1 must use the message digest")
        );
        ensure!(
            params.trailer_field == 1,
            JWTError::EngineMisuse("unsupported PSS trailer field")
        );
        self.pss = Some(params);
        Ok(())
    }

    fn init_sign(&mut self, key: &'k Key) -> Result<(), Error> {
        self.check_key(key, self.transform.signing_key_kind())?;
        self.state = State::Signing(key);
        self.buffer.clear();
        Ok(())
    }

    fn init_verify(&mut self, key: &'k Key) -> Result<(), Error> {
        self.check_key(key, self.transform.verification_key_kind())?;
        self.state = State::Verifying(key);
        self.buffer.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        ensure!(
            !matches!(self.state, State::Uninitialized),
            JWTError::EngineMisuse("update before init")
        );
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, Error> {
        let key = match self.state {
            State::Signing(key) => key,
            _ => bail!(JWTError::EngineMisuse("engine is not initialized for signing")),
        };
        let pss = self.pss_parameters()?;
        let signature = match (self.transform, key) {
            (Transform::Hmac(digest), Key::Hmac(key)) => {
                key.authentication_tag(digest, &self.buffer)
            }
            (Transform::RsaPkcs1v15(digest), Key::RsaPrivate(key_pair)) => {
                key_pair.sign(digest, None, &self.buffer)?
            }
            (Transform::RsaPss, Key::RsaPrivate(key_pair)) => {
                let digest = pss.map(|params| params.digest).unwrap_or(DigestAlgorithm::Sha256);
                key_pair.sign(digest, pss, &self.buffer)?
            }
            (Transform::Ecdsa(_), Key::EcPrivate(key_pair)) => key_pair.sign(&self.buffer),
            _ => bail!(JWTError::EngineMisuse("key does not match the transform")),
        };
        self.buffer.clear();
        Ok(signature)
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, Error> {
        let key = match self.state {
            State::Verifying(key) => key,
            _ => bail!(JWTError::EngineMisuse(
                "engine is not initialized for verification"
            )),
        };
        let pss = self.pss_parameters()?;
        let valid = match (self.transform, key) {
            (Transform::Hmac(digest), Key::Hmac(key)) => {
                key.verify_tag(digest, &self.buffer, signature)
            }
            (Transform::RsaPkcs1v15(digest), Key::RsaPublic(pk)) => {
                pk.verify(digest, None, &self.buffer, signature)
            }
            (Transform::RsaPss, Key::RsaPublic(pk)) => {
                let digest = pss.map(|params| params.digest).unwrap_or(DigestAlgorithm::Sha256);
                pk.verify(digest, pss, &self.buffer, signature)
            }
            (Transform::Ecdsa(_), Key::EcPublic(pk)) => pk.verify(&self.buffer, signature),
            _ => bail!(JWTError::EngineMisuse("key does not match the transform")),
        };
        self.buffer.clear();
        Ok(valid)
    }
}

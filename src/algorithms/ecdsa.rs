use p256::ecdsa::signature::{RandomizedSigner as _, Verifier as _};
use p256::pkcs8::{DecodePrivateKey as _, DecodePublicKey as _};

use crate::algorithm::Curve;
use crate::error::*;

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

#[derive(Clone)]
enum VerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

/// An ECDSA public key over one of the NIST curves.
#[derive(Clone)]
pub struct ECPublicKey {
    curve: Curve,
    sec1: Vec<u8>,
    vk: VerifyingKey,
}

impl std::fmt::Debug for ECPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ECPublicKey")
            .field("curve", &self.curve)
            .field("sec1", &self.sec1)
            .finish()
    }
}

impl PartialEq for ECPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.sec1 == other.sec1
    }
}

impl Eq for ECPublicKey {}

impl ECPublicKey {
    /// Import a SEC1-encoded point (compressed or not).
    pub fn from_sec1_bytes(curve: Curve, raw: &[u8]) -> Result<Self, Error> {
        let invalid = |_| JWTError::InvalidKey(format!("not a valid {} point", curve));
        let vk = match curve {
            Curve::P256 => {
                VerifyingKey::P256(p256::ecdsa::VerifyingKey::from_sec1_bytes(raw).map_err(invalid)?)
            }
            Curve::P384 => {
                VerifyingKey::P384(p384::ecdsa::VerifyingKey::from_sec1_bytes(raw).map_err(invalid)?)
            }
            Curve::P521 => {
                VerifyingKey::P521(p521::ecdsa::VerifyingKey::from_sec1_bytes(raw).map_err(invalid)?)
            }
        };
        Ok(Self::from_verifying_key(curve, vk))
    }

    /// Parse a `PUBLIC KEY` (SPKI) PEM document, on any supported curve.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(pk) = p256::PublicKey::from_public_key_pem(pem) {
            return Self::from_sec1_bytes(Curve::P256, &pk.to_sec1_bytes());
        }
        if let Ok(pk) = p384::PublicKey::from_public_key_pem(pem) {
            return Self::from_sec1_bytes(Curve::P384, &pk.to_sec1_bytes());
        }
        if let Ok(pk) = p521::PublicKey::from_public_key_pem(pem) {
            return Self::from_sec1_bytes(Curve::P521, &pk.to_sec1_bytes());
        }
        bail!(JWTError::InvalidKey(
            "unsupported or invalid EC public key".to_string()
        ))
    }

    fn from_verifying_key(curve: Curve, vk: VerifyingKey) -> Self {
        let sec1 = match &vk {
            VerifyingKey::P256(vk) => vk.to_encoded_point(false).as_bytes().to_vec(),
            VerifyingKey::P384(vk) => vk.to_encoded_point(false).as_bytes().to_vec(),
            VerifyingKey::P521(vk) => vk.to_encoded_point(false).as_bytes().to_vec(),
        };
        ECPublicKey { curve, sec1, vk }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Uncompressed SEC1 encoding: `0x04 || x || y`.
    pub fn to_bytes_uncompressed(&self) -> &[u8] {
        &self.sec1
    }

    /// Affine coordinates, each left-padded to the field length.
    pub fn coordinates(&self) -> (&[u8], &[u8]) {
        let field_len = self.curve.field_len();
        let point = &self.sec1[1..];
        point.split_at(field_len)
    }

    pub(crate) fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        if signature.len() != 2 * self.curve.field_len() {
            return false;
        }
        match &self.vk {
            VerifyingKey::P256(vk) => p256::ecdsa::Signature::from_slice(signature)
                .map(|sig| vk.verify(message, &sig).is_ok())
                .unwrap_or(false),
            VerifyingKey::P384(vk) => p384::ecdsa::Signature::from_slice(signature)
                .map(|sig| vk.verify(message, &sig).is_ok())
                .unwrap_or(false),
            VerifyingKey::P521(vk) => p521::ecdsa::Signature::from_slice(signature)
                .map(|sig| vk.verify(message, &sig).is_ok())
                .unwrap_or(false),
        }
    }
}

/// An ECDSA private key, with its public counterpart.
#[derive(Clone)]
pub struct ECKeyPair {
    sk: SigningKey,
    public_key: ECPublicKey,
}

impl std::fmt::Debug for ECKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ECKeyPair")
            .field("curve", &self.public_key.curve)
            .finish_non_exhaustive()
    }
}

impl ECKeyPair {
    /// Import a raw secret scalar.
    pub fn from_bytes(curve: Curve, raw: &[u8]) -> Result<Self, Error> {
        let invalid = |_| JWTError::InvalidKey(format!("not a valid {} scalar", curve));
        let sk = match curve {
            Curve::P256 => SigningKey::P256(p256::ecdsa::SigningKey::from_slice(raw).map_err(invalid)?),
            Curve::P384 => SigningKey::P384(p384::ecdsa::SigningKey::from_slice(raw).map_err(invalid)?),
            Curve::P521 => SigningKey::P521(p521::ecdsa::SigningKey::from_slice(raw).map_err(invalid)?),
        };
        Self::from_signing_key(curve, sk)
    }

    /// Parse a PKCS#8 `PRIVATE KEY` or SEC1 `EC PRIVATE KEY` PEM document.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(sk) = p256::SecretKey::from_pkcs8_pem(pem).or_else(|_| p256::SecretKey::from_sec1_pem(pem)) {
            return Self::from_bytes(Curve::P256, &sk.to_bytes());
        }
        if let Ok(sk) = p384::SecretKey::from_pkcs8_pem(pem).or_else(|_| p384::SecretKey::from_sec1_pem(pem)) {
            return Self::from_bytes(Curve::P384, &sk.to_bytes());
        }
        if let Ok(sk) = p521::SecretKey::from_pkcs8_pem(pem).or_else(|_| p521::SecretKey::from_sec1_pem(pem)) {
            return Self::from_bytes(Curve::P521, &sk.to_bytes());
        }
        bail!(JWTError::InvalidKey(
            "unsupported or invalid EC private key".to_string()
        ))
    }

    fn from_signing_key(curve: Curve, sk: SigningKey) -> Result<Self, Error> {
        let vk = match &sk {
            SigningKey::P256(sk) => VerifyingKey::P256(*sk.verifying_key()),
            SigningKey::P384(sk) => VerifyingKey::P384(*sk.verifying_key()),
            SigningKey::P521(sk) => VerifyingKey::P521(p521::ecdsa::VerifyingKey::from(sk)),
        };
        Ok(ECKeyPair {
            sk,
            public_key: ECPublicKey::from_verifying_key(curve, vk),
        })
    }

    pub fn curve(&self) -> Curve {
        self.public_key.curve
    }

    pub fn public_key(&self) -> &ECPublicKey {
        &self.public_key
    }

    /// Sign `message` with the curve's digest, returning the fixed-width `r || s` encoding.
    pub(crate) fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        match &self.sk {
            SigningKey::P256(sk) => {
                let signature: p256::ecdsa::Signature = sk.sign_with_rng(&mut rng, message);
                signature.to_bytes().to_vec()
            }
            SigningKey::P384(sk) => {
                let signature: p384::ecdsa::Signature = sk.sign_with_rng(&mut rng, message);
                signature.to_bytes().to_vec()
            }
            SigningKey::P521(sk) => {
                let signature: p521::ecdsa::Signature = sk.sign_with_rng(&mut rng, message);
                signature.to_bytes().to_vec()
            }
        }
    }
}

use rsa::pkcs1::{DecodeRsaPrivateKey as _, DecodeRsaPublicKey as _};
use rsa::pkcs8::{DecodePrivateKey as _, DecodePublicKey as _};
use rsa::traits::PublicKeyParts as _;
use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::algorithm::{DigestAlgorithm, PssParameters};
use crate::error::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey(rsa::RsaPublicKey);

impl AsRef<rsa::RsaPublicKey> for RSAPublicKey {
    fn as_ref(&self) -> &rsa::RsaPublicKey {
        &self.0
    }
}

impl From<rsa::RsaPublicKey> for RSAPublicKey {
    fn from(rsa_pk: rsa::RsaPublicKey) -> Self {
        RSAPublicKey(rsa_pk)
    }
}

pub struct RSAPublicKeyComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

impl RSAPublicKey {
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let rsa_pk = rsa::RsaPublicKey::from_public_key_der(der)
            .or_else(|_| rsa::RsaPublicKey::from_pkcs1_der(der))
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let rsa_pk = rsa::RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| rsa::RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn from_components(n: &[u8], e: &[u8]) -> Result<Self, Error> {
        let n = rsa::BigUint::from_bytes_be(n);
        let e = rsa::BigUint::from_bytes_be(e);
        let rsa_pk =
            rsa::RsaPublicKey::new(n, e).map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn to_components(&self) -> RSAPublicKeyComponents {
        let n = self.0.n().to_bytes_be();
        let e = self.0.e().to_bytes_be();
        RSAPublicKeyComponents { n, e }
    }

    /// Bit length of the modulus.
    pub fn modulus_bits(&self) -> usize {
        self.0.n().bits() as usize
    }

    pub(crate) fn verify(
        &self,
        digest: DigestAlgorithm,
        pss: Option<&PssParameters>,
        message: &[u8],
        signature: &[u8],
    ) -> bool {
        let hashed = hash(digest, message);
        let result = match pss {
            None => self.0.verify(pkcs1v15_padding(digest), &hashed, signature),
            Some(params) => self.0.verify(pss_padding(params), &hashed, signature),
        };
        result.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct RSAKeyPair {
    rsa_sk: rsa::RsaPrivateKey,
}

impl AsRef<rsa::RsaPrivateKey> for RSAKeyPair {
    fn as_ref(&self) -> &rsa::RsaPrivateKey {
        &self.rsa_sk
    }
}

impl RSAKeyPair {
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let rsa_sk = rsa::RsaPrivateKey::from_pkcs8_der(der)
            .or_else(|_| rsa::RsaPrivateKey::from_pkcs1_der(der))
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Self::checked(rsa_sk)
    }

    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let rsa_sk = rsa::RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| rsa::RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Self::checked(rsa_sk)
    }

    fn checked(mut rsa_sk: rsa::RsaPrivateKey) -> Result<Self, Error> {
        rsa_sk
            .validate()
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        rsa_sk
            .precompute()
            .map_err(|e| JWTError::InvalidKey(e.to_string()))?;
        Ok(RSAKeyPair { rsa_sk })
    }

    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey(self.rsa_sk.to_public_key())
    }

    /// Bit length of the modulus.
    pub fn modulus_bits(&self) -> usize {
        self.rsa_sk.n().bits() as usize
    }

    pub(crate) fn sign(
        &self,
        digest: DigestAlgorithm,
        pss: Option<&PssParameters>,
        message: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let hashed = hash(digest, message);
        let mut rng = rand::thread_rng();
        let signature = match pss {
            None => self
                .rsa_sk
                .sign_with_rng(&mut rng, pkcs1v15_padding(digest), &hashed)?,
            Some(params) => self
                .rsa_sk
                .sign_with_rng(&mut rng, pss_padding(params), &hashed)?,
        };
        Ok(signature)
    }
}

fn hash(digest: DigestAlgorithm, message: &[u8]) -> Vec<u8> {
    match digest {
        DigestAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
        DigestAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
        DigestAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
    }
}

fn pkcs1v15_padding(digest: DigestAlgorithm) -> Pkcs1v15Sign {
    match digest {
        DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

// MGF1 always uses the message digest here; mixed digests are rejected by the engine.
fn pss_padding(params: &PssParameters) -> Pss {
    match params.digest {
        DigestAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(params.salt_len),
        DigestAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(params.salt_len),
        DigestAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(params.salt_len),
    }
}

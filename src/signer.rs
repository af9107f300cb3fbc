use std::fmt;

use tracing::trace;

use crate::algorithm::{Algorithm, Scheme};
use crate::error::*;
use crate::keys::{Key, KeyKind};
use crate::provider::{default_provider, CryptoProvider};

/// Everything needed to build a [`Signer`].
#[derive(Clone)]
pub struct SignerConfig<'k> {
    pub algorithm: Algorithm,
    pub key: &'k Key,
    pub key_id: Option<String>,
    /// Falls back to [`default_provider`] when unset.
    pub provider: Option<&'k dyn CryptoProvider>,
}

impl<'k> SignerConfig<'k> {
    pub fn new(algorithm: Algorithm, key: &'k Key) -> Self {
        SignerConfig {
            algorithm,
            key,
            key_id: None,
            provider: None,
        }
    }

    /// Key identifier, written to the "kid" header of every token.
    pub fn with_key_id(mut self, key_id: impl ToString) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }

    pub fn with_provider(mut self, provider: &'k dyn CryptoProvider) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Check that `key` is usable with `algorithm`: family first, then the RSA
/// modulus size, then the EC curve.
pub(crate) fn validate_key(algorithm: Algorithm, key: &Key, expected: KeyKind) -> Result<(), Error> {
    let found = key.kind();
    ensure!(found == expected, JWTError::InvalidKeyType { expected, found });
    if let Some(required) = algorithm.min_key_bits() {
        let bits = key.modulus_bits().unwrap_or(0);
        ensure!(bits >= required, JWTError::InvalidKeyLength { bits, required });
    }
    if let (Some(expected), Some(found)) = (algorithm.curve(), key.curve()) {
        ensure!(found == expected, JWTError::InvalidCurve { expected, found });
    }
    Ok(())
}

/// Produces signatures for one algorithm with one private (or shared) key.
///
/// The key is validated once, when the signer is built. A signer holds no
/// mutable state and can be shared between threads.
#[derive(Clone)]
pub struct Signer<'k> {
    algorithm: Algorithm,
    key: Option<&'k Key>,
    key_id: Option<String>,
    provider: &'k dyn CryptoProvider,
}

impl<'k> Signer<'k> {
    pub fn new(config: SignerConfig<'k>) -> Result<Self, Error> {
        let SignerConfig {
            algorithm,
            key,
            key_id,
            provider,
        } = config;
        validate_key(
            algorithm,
            key,
            KeyKind::for_signing(algorithm.key_family()),
        )?;
        let provider = provider.unwrap_or_else(|| default_provider());
        trace!(
            algorithm = %algorithm,
            key_id = ?key_id,
            provider = provider.name(),
            "Signer ready"
        );
        Ok(Signer {
            algorithm,
            key: Some(key),
            key_id,
            provider,
        })
    }

    /// A signer for the `none` algorithm. Tokens it produces carry an empty
    /// signature and are only accepted by an explicitly built `none` verifier.
    pub fn unsecured() -> Signer<'static> {
        Signer {
            algorithm: Algorithm::None,
            key: None,
            key_id: None,
            provider: default_provider(),
        }
    }

    /// Shorthand for `Signer::new(SignerConfig::new(algorithm, key))`.
    pub fn from_key(algorithm: Algorithm, key: &'k Key) -> Result<Self, Error> {
        Signer::new(SignerConfig::new(algorithm, key))
    }

    pub fn with_key_id(mut self, key_id: impl ToString) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn scheme(&self) -> Scheme {
        self.algorithm.scheme()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn provider(&self) -> &dyn CryptoProvider {
        self.provider
    }

    /// Sign `payload`. HMAC and PKCS#1 v1.5 signatures are deterministic,
    /// PSS and ECDSA signatures are not.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let key = match self.key {
            None => return Ok(Vec::new()),
            Some(key) => key,
        };
        self.sign_with_engine(key, payload)
            .context(JWTError::SigningFault)
    }

    fn sign_with_engine(&self, key: &'k Key, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let mut engine = self.provider.signature_engine(self.algorithm.transform())?;
        if let Some(params) = self.algorithm.pss_parameters() {
            engine.set_pss_parameters(params)?;
        }
        engine.init_sign(key)?;
        engine.update(payload)?;
        engine.sign()
    }
}

impl fmt::Debug for Signer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::algorithm::{Algorithm, Scheme};
use crate::error::*;
use crate::keys::{Key, KeyKind};
use crate::provider::{default_provider, CryptoProvider};
use crate::signer::validate_key;

/// Everything needed to build a [`Verifier`].
#[derive(Clone)]
pub struct VerifierConfig<'k> {
    pub algorithm: Algorithm,
    pub key: &'k Key,
    pub key_id: Option<String>,
    /// Falls back to [`default_provider`] when unset.
    pub provider: Option<&'k dyn CryptoProvider>,
}

impl<'k> VerifierConfig<'k> {
    pub fn new(algorithm: Algorithm, key: &'k Key) -> Self {
        VerifierConfig {
            algorithm,
            key,
            key_id: None,
            provider: None,
        }
    }

    /// Only accept tokens whose "kid" header is `key_id`.
    pub fn with_key_id(mut self, key_id: impl ToString) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }

    pub fn with_provider(mut self, provider: &'k dyn CryptoProvider) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Checks signatures for one algorithm with one public (or shared) key.
#[derive(Clone)]
pub struct Verifier<'k> {
    algorithm: Algorithm,
    key: Option<&'k Key>,
    key_id: Option<String>,
    provider: &'k dyn CryptoProvider,
}

impl<'k> Verifier<'k> {
    pub fn new(config: VerifierConfig<'k>) -> Result<Self, Error> {
        let VerifierConfig {
            algorithm,
            key,
            key_id,
            provider,
        } = config;
        validate_key(
            algorithm,
            key,
            KeyKind::for_verification(algorithm.key_family()),
        )?;
        let provider = provider.unwrap_or_else(|| default_provider());
        trace!(
            algorithm = %algorithm,
            key_id = ?key_id,
            provider = provider.name(),
            "Verifier ready"
        );
        Ok(Verifier {
            algorithm,
            key: Some(key),
            key_id,
            provider,
        })
    }

    /// A verifier for the `none` algorithm. It only accepts an empty
    /// signature, and it is never used unless passed to a decoder explicitly.
    pub fn none() -> Verifier<'static> {
        Verifier {
            algorithm: Algorithm::None,
            key: None,
            key_id: None,
            provider: default_provider(),
        }
    }

    /// Shorthand for `Verifier::new(VerifierConfig::new(algorithm, key))`.
    pub fn from_key(algorithm: Algorithm, key: &'k Key) -> Result<Self, Error> {
        Verifier::new(VerifierConfig::new(algorithm, key))
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

    /// Whether this verifier can check a token signed with `algorithm`,
    /// carrying the given "kid".
    pub fn can_verify(&self, algorithm: Algorithm, key_id: Option<&str>) -> bool {
        if self.algorithm != algorithm {
            return false;
        }
        match &self.key_id {
            None => true,
            Some(expected) => key_id == Some(expected.as_str()),
        }
    }

    /// Check `signature` over `payload`. `Ok(false)` means the signature
    /// doesn't match; errors are reserved for engine faults.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<bool, Error> {
        let key = match self.key {
            None => return Ok(signature.is_empty()),
            Some(key) => key,
        };
        self.verify_with_engine(key, payload, signature)
            .context(JWTError::VerificationFault)
    }

    fn verify_with_engine(
        &self,
        key: &'k Key,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        let mut engine = self.provider.signature_engine(self.algorithm.transform())?;
        if let Some(params) = self.algorithm.pss_parameters() {
            engine.set_pss_parameters(params)?;
        }
        engine.init_verify(key)?;
        engine.update(payload)?;
        engine.verify(signature)
    }
}

impl fmt::Debug for Verifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

/// Picks the verifier for a token, given its algorithm and "kid".
///
/// A verifier bound to a key id only matches tokens carrying that key id.
/// A verifier without one matches any token of its algorithm, but an exact
/// key id match always wins.
pub trait VerifierResolver {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>>;
}

impl VerifierResolver for Verifier<'_> {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>> {
        self.can_verify(algorithm, key_id).then_some(self)
    }
}

impl VerifierResolver for [Verifier<'_>] {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>> {
        let mut fallback = None;
        for verifier in self.iter().filter(|v| v.can_verify(algorithm, key_id)) {
            if verifier.key_id.is_some() {
                return Some(verifier);
            }
            fallback = fallback.or(Some(verifier));
        }
        fallback
    }
}

impl VerifierResolver for Vec<Verifier<'_>> {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>> {
        self.as_slice().resolve(algorithm, key_id)
    }
}

impl<const N: usize> VerifierResolver for [Verifier<'_>; N] {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>> {
        self.as_slice().resolve(algorithm, key_id)
    }
}

/// Verifiers indexed by algorithm and key id.
#[derive(Clone, Debug, Default)]
pub struct VerifierSet<'k> {
    verifiers: HashMap<(Algorithm, Option<String>), Verifier<'k>>,
}

impl<'k> VerifierSet<'k> {
    pub fn new() -> Self {
        VerifierSet::default()
    }

    /// Register a verifier, replacing any other with the same algorithm and key id.
    pub fn insert(&mut self, verifier: Verifier<'k>) -> Option<Verifier<'k>> {
        let index = (verifier.algorithm, verifier.key_id.clone());
        self.verifiers.insert(index, verifier)
    }

    pub fn with(mut self, verifier: Verifier<'k>) -> Self {
        self.insert(verifier);
        self
    }

    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }
}

impl<'k> FromIterator<Verifier<'k>> for VerifierSet<'k> {
    fn from_iter<I: IntoIterator<Item = Verifier<'k>>>(iter: I) -> Self {
        let mut set = VerifierSet::new();
        for verifier in iter {
            set.insert(verifier);
        }
        set
    }
}

impl VerifierResolver for VerifierSet<'_> {
    fn resolve(&self, algorithm: Algorithm, key_id: Option<&str>) -> Option<&Verifier<'_>> {
        if let Some(key_id) = key_id {
            if let Some(verifier) = self.verifiers.get(&(algorithm, Some(key_id.to_string()))) {
                return Some(verifier);
            }
        }
        self.verifiers.get(&(algorithm, None))
    }
}

use hmac_sha512::sha384 as hmac_sha384;
use zeroize::Zeroize;

use crate::algorithm::DigestAlgorithm;

/// A shared secret for the `HS*` algorithms.
#[derive(Clone)]
pub struct HMACKey {
    raw_key: Vec<u8>,
}

impl Drop for HMACKey {
    fn drop(&mut self) {
        self.raw_key.zeroize();
    }
}

impl std::fmt::Debug for HMACKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HMACKey")
            .field("len", &self.raw_key.len())
            .finish()
    }
}

impl HMACKey {
    /// Create a HMAC key from a byte slice.
    pub fn from_bytes(raw_key: &[u8]) -> Self {
        HMACKey {
            raw_key: raw_key.to_vec(),
        }
    }

    /// Convert the HMAC key to a byte slice.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw_key.clone()
    }

    pub fn len(&self) -> usize {
        self.raw_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_key.is_empty()
    }

    pub(crate) fn authentication_tag(&self, digest: DigestAlgorithm, authenticated: &[u8]) -> Vec<u8> {
        match digest {
            DigestAlgorithm::Sha256 => hmac_sha256::HMAC::mac(authenticated, &self.raw_key).to_vec(),
            DigestAlgorithm::Sha384 => hmac_sha384::HMAC::mac(authenticated, &self.raw_key).to_vec(),
            DigestAlgorithm::Sha512 => hmac_sha512::HMAC::mac(authenticated, &self.raw_key).to_vec(),
        }
    }

    pub(crate) fn verify_tag(
        &self,
        digest: DigestAlgorithm,
        authenticated: &[u8],
        authentication_tag: &[u8],
    ) -> bool {
        ct_codecs::verify(
            &self.authentication_tag(digest, authenticated),
            authentication_tag,
        )
    }
}

impl AsRef<[u8]> for HMACKey {
    /// Get the raw key, as a byte slice
    fn as_ref(&self) -> &[u8] {
        &self.raw_key
    }
}

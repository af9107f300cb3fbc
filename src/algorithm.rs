use std::fmt;
use std::str::FromStr;

use crate::error::*;

/// Digest used by an algorithm, both for the message hash and (for PSS) for MGF1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Digest output length, in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

/// Key family an algorithm requires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    None,
    Hmac,
    Rsa,
    Ec,
}

/// Signature scheme an algorithm belongs to; signers and verifiers dispatch on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Unsecured,
    Hmac,
    RsaPkcs1v15,
    RsaPss,
    Ecdsa,
}

/// Elliptic curves used by the `ES*` algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    /// JOSE curve name ("crv").
    pub fn name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    /// Size of a field element (and of each half of a JOSE ECDSA signature), in bytes.
    pub fn field_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RSASSA-PSS parameters, RFC 8230 profile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PssParameters {
    pub digest: DigestAlgorithm,
    pub mgf1_digest: DigestAlgorithm,
    pub salt_len: usize,
    pub trailer_field: u8,
}

impl PssParameters {
    pub fn for_digest(digest: DigestAlgorithm) -> Self {
        PssParameters {
            digest,
            mgf1_digest: digest,
            salt_len: digest.output_len(),
            trailer_field: 1,
        }
    }
}

/// JOSE signature algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    None,
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
}

struct Entry {
    algorithm: Algorithm,
    name: &'static str,
    digest: Option<DigestAlgorithm>,
    family: KeyFamily,
    transform: &'static str,
    min_key_bits: Option<usize>,
    curve: Option<Curve>,
    pss: bool,
}

const RSA_MIN_KEY_BITS: usize = 2048;

use self::DigestAlgorithm::*;

static REGISTRY: [Entry; 13] = [
    Entry {
        algorithm: Algorithm::None,
        name: "none",
        digest: None,
        family: KeyFamily::None,
        transform: "none",
        min_key_bits: None,
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::HS256,
        name: "HS256",
        digest: Some(Sha256),
        family: KeyFamily::Hmac,
        transform: "HmacSHA256",
        min_key_bits: None,
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::HS384,
        name: "HS384",
        digest: Some(Sha384),
        family: KeyFamily::Hmac,
        transform: "HmacSHA384",
        min_key_bits: None,
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::HS512,
        name: "HS512",
        digest: Some(Sha512),
        family: KeyFamily::Hmac,
        transform: "HmacSHA512",
        min_key_bits: None,
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::RS256,
        name: "RS256",
        digest: Some(Sha256),
        family: KeyFamily::Rsa,
        transform: "SHA256withRSA",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::RS384,
        name: "RS384",
        digest: Some(Sha384),
        family: KeyFamily::Rsa,
        transform: "SHA384withRSA",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::RS512,
        name: "RS512",
        digest: Some(Sha512),
        family: KeyFamily::Rsa,
        transform: "SHA512withRSA",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: false,
    },
    Entry {
        algorithm: Algorithm::PS256,
        name: "PS256",
        digest: Some(Sha256),
        family: KeyFamily::Rsa,
        transform: "RSASSA-PSS",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: true,
    },
    Entry {
        algorithm: Algorithm::PS384,
        name: "PS384",
        digest: Some(Sha384),
        family: KeyFamily::Rsa,
        transform: "RSASSA-PSS",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: true,
    },
    Entry {
        algorithm: Algorithm::PS512,
        name: "PS512",
        digest: Some(Sha512),
        family: KeyFamily::Rsa,
        transform: "RSASSA-PSS",
        min_key_bits: Some(RSA_MIN_KEY_BITS),
        curve: None,
        pss: true,
    },
    Entry {
        algorithm: Algorithm::ES256,
        name: "ES256",
        digest: Some(Sha256),
        family: KeyFamily::Ec,
        transform: "SHA256withECDSA",
        min_key_bits: None,
        curve: Some(Curve::P256),
        pss: false,
    },
    Entry {
        algorithm: Algorithm::ES384,
        name: "ES384",
        digest: Some(Sha384),
        family: KeyFamily::Ec,
        transform: "SHA384withECDSA",
        min_key_bits: None,
        curve: Some(Curve::P384),
        pss: false,
    },
    Entry {
        algorithm: Algorithm::ES512,
        name: "ES512",
        digest: Some(Sha512),
        family: KeyFamily::Ec,
        transform: "SHA512withECDSA",
        min_key_bits: None,
        curve: Some(Curve::P521),
        pss: false,
    },
];

impl Algorithm {
    pub const ALL: [Algorithm; 13] = [
        Algorithm::None,
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ];

    fn entry(self) -> &'static Entry {
        // The registry is laid out in declaration order.
        &REGISTRY[self as usize]
    }

    /// Resolve a JOSE "alg" value. Matching is exact and case-sensitive.
    pub fn resolve(name: &str) -> Result<Algorithm, Error> {
        REGISTRY
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.algorithm)
            .ok_or_else(|| JWTError::unsupported_algorithm(name).into())
    }

    /// The JOSE name ("alg")
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn digest(self) -> Option<DigestAlgorithm> {
        self.entry().digest
    }

    pub fn key_family(self) -> KeyFamily {
        self.entry().family
    }

    pub fn scheme(self) -> Scheme {
        let entry = self.entry();
        match entry.family {
            KeyFamily::None => Scheme::Unsecured,
            KeyFamily::Hmac => Scheme::Hmac,
            KeyFamily::Rsa if entry.pss => Scheme::RsaPss,
            KeyFamily::Rsa => Scheme::RsaPkcs1v15,
            KeyFamily::Ec => Scheme::Ecdsa,
        }
    }

    /// Name of the signature transform requested from a `CryptoProvider`.
    pub fn transform(self) -> &'static str {
        self.entry().transform
    }

    pub fn min_key_bits(self) -> Option<usize> {
        self.entry().min_key_bits
    }

    pub fn curve(self) -> Option<Curve> {
        self.entry().curve
    }

    /// PSS parameters for the `PS*` algorithms, `None` for everything else.
    pub fn pss_parameters(self) -> Option<PssParameters> {
        let entry = self.entry();
        match (entry.pss, entry.digest) {
            (true, Some(digest)) => Some(PssParameters::for_digest(digest)),
            _ => None,
        }
    }

    /// PSS salt length in bytes; equal to the digest length.
    pub fn pss_salt_len(self) -> Option<usize> {
        self.pss_parameters().map(|params| params.salt_len)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::resolve(s)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

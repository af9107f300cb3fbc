use std::fmt;

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};

use crate::algorithm::{Curve, KeyFamily};
use crate::algorithms::*;
use crate::error::*;

/// The kind of key material, as reported in key errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// No key at all (the `none` algorithm).
    None,
    Hmac,
    RsaPrivate,
    RsaPublic,
    EcPrivate,
    EcPublic,
}

impl KeyKind {
    pub fn family(self) -> KeyFamily {
        match self {
            KeyKind::None => KeyFamily::None,
            KeyKind::Hmac => KeyFamily::Hmac,
            KeyKind::RsaPrivate | KeyKind::RsaPublic => KeyFamily::Rsa,
            KeyKind::EcPrivate | KeyKind::EcPublic => KeyFamily::Ec,
        }
    }

    /// Key kind a signer of the given family needs.
    pub fn for_signing(family: KeyFamily) -> Self {
        match family {
            KeyFamily::None => KeyKind::None,
            KeyFamily::Hmac => KeyKind::Hmac,
            KeyFamily::Rsa => KeyKind::RsaPrivate,
            KeyFamily::Ec => KeyKind::EcPrivate,
        }
    }

    /// Key kind a verifier of the given family needs.
    pub fn for_verification(family: KeyFamily) -> Self {
        match family {
            KeyFamily::None => KeyKind::None,
            KeyFamily::Hmac => KeyKind::Hmac,
            KeyFamily::Rsa => KeyKind::RsaPublic,
            KeyFamily::Ec => KeyKind::EcPublic,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::None => "none",
            KeyKind::Hmac => "HMACKey",
            KeyKind::RsaPrivate => "RSAPrivateKey",
            KeyKind::RsaPublic => "RSAPublicKey",
            KeyKind::EcPrivate => "ECPrivateKey",
            KeyKind::EcPublic => "ECPublicKey",
        })
    }
}

/// Typed key material.
///
/// Keys are built once by the caller and lent to signers and verifiers,
/// which never modify them.
#[derive(Debug, Clone)]
pub enum Key {
    Hmac(HMACKey),
    RsaPrivate(RSAKeyPair),
    RsaPublic(RSAPublicKey),
    EcPrivate(ECKeyPair),
    EcPublic(ECPublicKey),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PemKind {
    Private,
    Public,
}

fn pem_label(pem: &str) -> Option<&str> {
    let label = pem.trim_start().strip_prefix("-----BEGIN ")?;
    Some(&label[..label.find("-----")?])
}

fn pem_kind(pem: &str) -> Option<PemKind> {
    match pem_label(pem)? {
        "PRIVATE KEY" | "RSA PRIVATE KEY" | "EC PRIVATE KEY" => Some(PemKind::Private),
        "PUBLIC KEY" | "RSA PUBLIC KEY" => Some(PemKind::Public),
        _ => None,
    }
}

// Generic PKCS#8/SPKI labels don't name the key type: report both failures.
fn neither_rsa_nor_ec(rsa: Error, ec: Error) -> Error {
    JWTError::InvalidKey(format!(
        "neither an RSA key ({}) nor an EC key ({})",
        rsa, ec
    ))
    .into()
}

impl Key {
    /// A shared secret for the `HS*` algorithms.
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Key::Hmac(HMACKey::from_bytes(secret.as_ref()))
    }

    /// Decode a private key from PEM text (PKCS#8, PKCS#1 or SEC1).
    pub fn private_from_pem(pem: &str) -> Result<Self, Error> {
        match pem_kind(pem) {
            Some(PemKind::Private) => {}
            Some(PemKind::Public) => bail!(JWTError::MissingPrivateKey),
            None => bail!(JWTError::InvalidKey("not a PEM encoded key".to_string())),
        }
        match pem_label(pem) {
            Some("RSA PRIVATE KEY") => Ok(Key::RsaPrivate(RSAKeyPair::from_pem(pem)?)),
            Some("EC PRIVATE KEY") => Ok(Key::EcPrivate(ECKeyPair::from_pem(pem)?)),
            _ => match RSAKeyPair::from_pem(pem) {
                Ok(key_pair) => Ok(Key::RsaPrivate(key_pair)),
                Err(rsa) => ECKeyPair::from_pem(pem)
                    .map(Key::EcPrivate)
                    .map_err(|ec| neither_rsa_nor_ec(rsa, ec)),
            },
        }
    }

    /// Decode a public key from PEM text (SPKI or PKCS#1).
    pub fn public_from_pem(pem: &str) -> Result<Self, Error> {
        match pem_kind(pem) {
            Some(PemKind::Public) => {}
            Some(PemKind::Private) => bail!(JWTError::MissingPublicKey),
            None => bail!(JWTError::InvalidKey("not a PEM encoded key".to_string())),
        }
        match pem_label(pem) {
            Some("RSA PUBLIC KEY") => Ok(Key::RsaPublic(RSAPublicKey::from_pem(pem)?)),
            _ => match RSAPublicKey::from_pem(pem) {
                Ok(pk) => Ok(Key::RsaPublic(pk)),
                Err(rsa) => ECPublicKey::from_pem(pem)
                    .map(Key::EcPublic)
                    .map_err(|ec| neither_rsa_nor_ec(rsa, ec)),
            },
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Hmac(_) => KeyKind::Hmac,
            Key::RsaPrivate(_) => KeyKind::RsaPrivate,
            Key::RsaPublic(_) => KeyKind::RsaPublic,
            Key::EcPrivate(_) => KeyKind::EcPrivate,
            Key::EcPublic(_) => KeyKind::EcPublic,
        }
    }

    pub fn family(&self) -> KeyFamily {
        self.kind().family()
    }

    /// RSA modulus length in bits; `None` for other families.
    pub fn modulus_bits(&self) -> Option<usize> {
        match self {
            Key::RsaPrivate(key_pair) => Some(key_pair.modulus_bits()),
            Key::RsaPublic(pk) => Some(pk.modulus_bits()),
            _ => None,
        }
    }

    pub fn curve(&self) -> Option<Curve> {
        match self {
            Key::EcPrivate(key_pair) => Some(key_pair.curve()),
            Key::EcPublic(pk) => Some(pk.curve()),
            _ => None,
        }
    }

    /// The key a verifier needs for tokens signed with this key.
    pub fn to_public(&self) -> Key {
        match self {
            Key::Hmac(key) => Key::Hmac(key.clone()),
            Key::RsaPrivate(key_pair) => Key::RsaPublic(key_pair.public_key()),
            Key::RsaPublic(pk) => Key::RsaPublic(pk.clone()),
            Key::EcPrivate(key_pair) => Key::EcPublic(key_pair.public_key().clone()),
            Key::EcPublic(pk) => Key::EcPublic(pk.clone()),
        }
    }

    /// RFC 7638 JWK thumbprint (SHA-256, base64url), computed over the public part.
    pub fn jwk_thumbprint(&self) -> Result<String, Error> {
        let b64 = |bin: &[u8]| Base64UrlSafeNoPadding::encode_to_string(bin);
        // Members in lexicographic order, no whitespace.
        let jwk = match self.to_public() {
            Key::Hmac(key) => format!(r#"{{"k":"{}","kty":"oct"}}"#, b64(key.as_ref())?),
            Key::RsaPublic(pk) => {
                let components = pk.to_components();
                format!(
                    r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
                    b64(&components.e)?,
                    b64(&components.n)?
                )
            }
            Key::EcPublic(pk) => {
                let (x, y) = pk.coordinates();
                format!(
                    r#"{{"crv":"{}","kty":"EC","x":"{}","y":"{}"}}"#,
                    pk.curve().name(),
                    b64(x)?,
                    b64(y)?
                )
            }
            Key::RsaPrivate(_) | Key::EcPrivate(_) => {
                bail!(JWTError::InternalError("public key expected".to_string()))
            }
        };
        Ok(Base64UrlSafeNoPadding::encode_to_string(
            hmac_sha256::Hash::hash(jwk.as_bytes()),
        )?)
    }
}

impl From<HMACKey> for Key {
    fn from(key: HMACKey) -> Self {
        Key::Hmac(key)
    }
}

impl From<RSAKeyPair> for Key {
    fn from(key_pair: RSAKeyPair) -> Self {
        Key::RsaPrivate(key_pair)
    }
}

impl From<RSAPublicKey> for Key {
    fn from(pk: RSAPublicKey) -> Self {
        Key::RsaPublic(pk)
    }
}

impl From<ECKeyPair> for Key {
    fn from(key_pair: ECKeyPair) -> Self {
        Key::EcPrivate(key_pair)
    }
}

impl From<ECPublicKey> for Key {
    fn from(pk: ECPublicKey) -> Self {
        Key::EcPublic(pk)
    }
}

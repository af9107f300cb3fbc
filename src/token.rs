use std::sync::Arc;

use coarsetime::UnixTimeStamp;
use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::algorithm::Algorithm;
use crate::clock::TimeSource;
use crate::common::*;
use crate::error::*;
use crate::header::Header;
use crate::jwt::JWT;
use crate::signer::Signer;
use crate::verifier::VerifierResolver;

/// Utilities to get information about a JWT token
pub struct Token;

/// JWT token information useful before signature verification
#[derive(Debug, Clone, Default)]
pub struct TokenMetadata {
    header: Header,
}

impl TokenMetadata {
    /// The JWT algorithm for this token ("alg")
    /// This information should not be trusted: it is unprotected and can be
    /// freely modified by a third party. Clients should ignore it and use
    /// the correct type of key directly.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.algorithm()
    }

    /// The key, or public key identifier for this token ("kid")
    pub fn key_id(&self) -> Option<&str> {
        self.header.key_id()
    }

    /// The token type ("typ")
    pub fn typ(&self) -> Option<&str> {
        self.header.typ()
    }

    /// The whole, unverified header
    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl Token {
    /// Decode token information that can be useful prior to signature
    /// verification
    pub fn decode_metadata(token: &str) -> Result<TokenMetadata, Error> {
        let mut parts = token.split('.');
        let header_b64 = parts
            .next()
            .ok_or(JWTError::MalformedJWT("missing header"))?;
        ensure!(
            header_b64.len() <= MAX_HEADER_LENGTH,
            JWTError::MalformedJWT("header too large")
        );
        let header = Header::from_map(decode_json_segment(header_b64)?);
        Ok(TokenMetadata { header })
    }
}

fn decode_json_segment(segment: &str) -> Result<Map<String, Value>, Error> {
    let json = Base64UrlSafeNoPadding::decode_to_vec(segment, None)
        .map_err(|_| JWTError::MalformedJWT("invalid base64url encoding"))?;
    match serde_json::from_slice(&json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => bail!(JWTError::MalformedJWT("not a JSON object")),
        Err(_) => bail!(JWTError::MalformedJWT("invalid JSON")),
    }
}

/// Builds compact tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct JWTEncoder;

impl JWTEncoder {
    pub fn new() -> Self {
        JWTEncoder
    }

    /// Encode and sign `jwt`. The header is `{"alg": ...}`, plus "kid" if
    /// the signer has a key id.
    pub fn encode(&self, jwt: &JWT, signer: &Signer<'_>) -> Result<String, Error> {
        self.encode_with(jwt, signer, |_| {})
    }

    /// Like [`encode`](Self::encode), but `header_mutator` can add or
    /// override header parameters before the header is serialized. It cannot
    /// change "alg".
    pub fn encode_with<F>(
        &self,
        jwt: &JWT,
        signer: &Signer<'_>,
        header_mutator: F,
    ) -> Result<String, Error>
    where
        F: FnOnce(&mut Header),
    {
        let algorithm = signer.algorithm();
        let mut header = Header::new(algorithm);
        if let Some(key_id) = signer.key_id() {
            header.set("kid", key_id);
        }
        header_mutator(&mut header);
        ensure!(
            header.algorithm() == Some(algorithm.name()),
            JWTError::AlgorithmMismatch
        );

        let header_json = serde_json::to_string(&header)?;
        let claims_json = serde_json::to_string(&jwt.claims)?;
        let mut token = format!(
            "{}.{}",
            Base64UrlSafeNoPadding::encode_to_string(header_json)?,
            Base64UrlSafeNoPadding::encode_to_string(claims_json)?
        );
        let signature = signer.sign(token.as_bytes())?;
        token.push('.');
        token.push_str(&Base64UrlSafeNoPadding::encode_to_string(signature)?);
        Ok(token)
    }
}

/// Parses, verifies and time-checks compact tokens.
///
/// The time source is fixed when the decoder is built.
#[derive(Debug, Clone, Default)]
pub struct JWTDecoder {
    clock: TimeSource,
    options: DecoderOptions,
}

impl JWTDecoder {
    /// A decoder using the system clock.
    pub fn new() -> Self {
        JWTDecoder::default()
    }

    /// A decoder that evaluates "exp" and "nbf" against a fixed instant.
    pub fn at(instant: UnixTimeStamp) -> Self {
        JWTDecoder {
            clock: TimeSource::Fixed(instant),
            options: DecoderOptions::default(),
        }
    }

    /// A decoder that asks `now` for the current time.
    pub fn with_clock<F>(now: F) -> Self
    where
        F: Fn() -> UnixTimeStamp + Send + Sync + 'static,
    {
        JWTDecoder {
            clock: TimeSource::Custom(Arc::new(now)),
            options: DecoderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn time_source(&self) -> &TimeSource {
        &self.clock
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode `token`, verifying it with a verifier picked from `verifiers`.
    ///
    /// The steps run in order and the first failure is returned: structure,
    /// segment decoding, algorithm, verifier selection, signature, then
    /// "exp" and "nbf".
    pub fn decode<R>(&self, token: &str, verifiers: &R) -> Result<JWT, Error>
    where
        R: VerifierResolver + ?Sized,
    {
        let res = self.decode_and_verify(token, verifiers);
        if let Err(err) = &res {
            debug!(error = %err, "JWT rejected");
        }
        res
    }

    fn decode_and_verify<R>(&self, token: &str, verifiers: &R) -> Result<JWT, Error>
    where
        R: VerifierResolver + ?Sized,
    {
        let options = &self.options;
        if let Some(max_token_length) = options.max_token_length {
            ensure!(
                token.len() <= max_token_length,
                JWTError::MalformedJWT("token too long")
            );
        }

        let mut parts = token.split('.');
        let header_b64 = parts
            .next()
            .ok_or(JWTError::MalformedJWT("missing header"))?;
        let claims_b64 = parts
            .next()
            .ok_or(JWTError::MalformedJWT("missing claims"))?;
        let signature_b64 = parts
            .next()
            .ok_or(JWTError::MalformedJWT("missing signature segment"))?;
        ensure!(
            parts.next().is_none(),
            JWTError::MalformedJWT("too many segments")
        );
        ensure!(
            header_b64.len() <= options.max_header_length.unwrap_or(MAX_HEADER_LENGTH),
            JWTError::MalformedJWT("header too large")
        );

        let header = Header::from_map(decode_json_segment(header_b64)?);
        let claims = decode_json_segment(claims_b64)?;

        let alg = header
            .get("alg")
            .ok_or(JWTError::MalformedJWT("missing alg"))?
            .as_str()
            .ok_or(JWTError::MalformedJWT("alg must be a string"))?;
        let key_id = match header.get("kid") {
            None => None,
            Some(kid) => Some(
                kid.as_str()
                    .ok_or(JWTError::MalformedJWT("kid must be a string"))?,
            ),
        };
        let algorithm = Algorithm::resolve(alg)?;

        let verifier = verifiers.resolve(algorithm, key_id).ok_or_else(|| {
            JWTError::UnsupportedAlgorithm {
                algorithm: algorithm.name().to_string(),
                key_id: key_id.map(str::to_string),
            }
        })?;
        trace!(
            algorithm = %algorithm,
            key_id = ?verifier.key_id(),
            "Verifier resolved"
        );

        let signature = Base64UrlSafeNoPadding::decode_to_vec(signature_b64, None)
            .map_err(|_| JWTError::InvalidSignature)?;
        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        ensure!(
            verifier.verify(signing_input.as_bytes(), &signature)?,
            JWTError::InvalidSignature
        );

        let jwt = JWT::from_parts(header, claims);
        jwt.check_time_claims()?;
        let now = self.clock.now();
        let time_tolerance = options.time_tolerance.unwrap_or_default();
        if let Some(expires_at) = jwt.expires_at() {
            ensure!(
                now < expires_at.saturating_add(time_tolerance),
                JWTError::TokenHasExpired
            );
        }
        if let Some(not_before) = jwt.not_before() {
            ensure!(
                now.saturating_add(time_tolerance) >= not_before,
                JWTError::TokenNotValidYet
            );
        }
        Ok(jwt)
    }
}

/// Encode `jwt` with the default encoder.
pub fn encode(jwt: &JWT, signer: &Signer<'_>) -> Result<String, Error> {
    JWTEncoder::new().encode(jwt, signer)
}

/// Decode `token` against the system clock.
pub fn decode<R>(token: &str, verifiers: &R) -> Result<JWT, Error>
where
    R: VerifierResolver + ?Sized,
{
    JWTDecoder::new().decode(token, verifiers)
}

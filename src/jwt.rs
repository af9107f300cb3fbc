use coarsetime::{Clock, Duration, UnixTimeStamp};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::*;
use crate::header::Header;
use crate::numeric_date;

/// Registered claims holding a NumericDate.
pub const TIME_CLAIMS: [&str; 3] = ["exp", "nbf", "iat"];

/// A JSON Web Token: a header and an ordered set of claims.
///
/// Registered claims are read and written through typed accessors; any other
/// claim is kept verbatim, in insertion order.
///
/// The header is only filled in by the decoder. The encoder builds the header
/// of a new token from the signer.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JWT {
    pub header: Header,
    pub claims: Map<String, Value>,
}

impl JWT {
    pub fn new() -> Self {
        JWT::default()
    }

    pub(crate) fn from_parts(header: Header, claims: Map<String, Value>) -> Self {
        JWT { header, claims }
    }

    /// Add (or replace) a claim.
    pub fn add_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Merge application-defined claims from any serializable object.
    pub fn with_custom_claims<CustomClaims: Serialize>(
        mut self,
        custom_claims: &CustomClaims,
    ) -> Result<Self, Error> {
        match serde_json::to_value(custom_claims)? {
            Value::Object(map) => self.claims.extend(map),
            _ => bail!(JWTError::InternalError(
                "custom claims must serialize to a JSON object".to_string()
            )),
        }
        Ok(self)
    }

    /// Set the issuer ("iss")
    pub fn with_issuer(self, issuer: impl ToString) -> Self {
        self.add_claim("iss", issuer.to_string())
    }

    /// Set the subject ("sub")
    pub fn with_subject(self, subject: impl ToString) -> Self {
        self.add_claim("sub", subject.to_string())
    }

    /// Set a single audience ("aud")
    pub fn with_audience(self, audience: impl ToString) -> Self {
        self.add_claim("aud", audience.to_string())
    }

    /// Set multiple audiences ("aud" as an array)
    pub fn with_audiences<I, S>(self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let audiences: Vec<Value> = audiences
            .into_iter()
            .map(|audience| Value::from(audience.to_string()))
            .collect();
        self.add_claim("aud", audiences)
    }

    /// Set the JWT identifier ("jti")
    pub fn with_jwt_id(self, jwt_id: impl ToString) -> Self {
        self.add_claim("jti", jwt_id.to_string())
    }

    /// Set the expiration time ("exp")
    pub fn with_expires_at(self, expires_at: UnixTimeStamp) -> Self {
        self.add_claim("exp", numeric_date::to_value(expires_at))
    }

    /// Set the time before which the token must not be accepted ("nbf")
    pub fn with_not_before(self, not_before: UnixTimeStamp) -> Self {
        self.add_claim("nbf", numeric_date::to_value(not_before))
    }

    /// Set the issuance time ("iat")
    pub fn with_issued_at(self, issued_at: UnixTimeStamp) -> Self {
        self.add_claim("iat", numeric_date::to_value(issued_at))
    }

    /// Issue the token now, expiring after `valid_for`.
    pub fn expires_in(self, valid_for: Duration) -> Self {
        let now = Clock::now_since_epoch();
        self.with_issued_at(now).with_expires_at(now + valid_for)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// A claim, if present and a string.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Deserialize a single claim.
    pub fn claim<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.claims.get(name) {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    /// Deserialize the whole claim set into an application-defined type.
    pub fn custom_claims<CustomClaims: DeserializeOwned>(&self) -> Result<CustomClaims, Error> {
        Ok(serde_json::from_value(Value::Object(self.claims.clone()))?)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_string("iss")
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_string("sub")
    }

    /// Audiences, whether "aud" is a single string or an array.
    pub fn audiences(&self) -> Vec<&str> {
        match self.claims.get("aud") {
            Some(Value::String(audience)) => vec![audience.as_str()],
            Some(Value::Array(audiences)) => audiences.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.get_string("jti")
    }

    pub fn expires_at(&self) -> Option<UnixTimeStamp> {
        self.time_claim("exp")
    }

    pub fn not_before(&self) -> Option<UnixTimeStamp> {
        self.time_claim("nbf")
    }

    pub fn issued_at(&self) -> Option<UnixTimeStamp> {
        self.time_claim("iat")
    }

    fn time_claim(&self, name: &str) -> Option<UnixTimeStamp> {
        self.claims.get(name).and_then(numeric_date::from_value)
    }

    /// `true` if "exp" is present and `now` has reached it.
    pub fn is_expired(&self, now: UnixTimeStamp) -> bool {
        self.expires_at().map_or(false, |expires_at| now >= expires_at)
    }

    /// `true` if "nbf" is present and `now` is still before it.
    pub fn is_unavailable_for_processing(&self, now: UnixTimeStamp) -> bool {
        self.not_before().map_or(false, |not_before| now < not_before)
    }

    /// Registered time claims must be numbers.
    pub(crate) fn check_time_claims(&self) -> Result<(), Error> {
        for name in TIME_CLAIMS {
            if let Some(value) = self.claims.get(name) {
                ensure!(
                    numeric_date::from_value(value).is_some(),
                    JWTError::MalformedJWT("time claims must be numbers")
                );
            }
        }
        Ok(())
    }
}

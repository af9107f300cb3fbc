use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algorithm::Algorithm;

/// JOSE header: an ordered map of header parameters.
///
/// Parameters keep their insertion order when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header {
    fields: Map<String, Value>,
}

impl Header {
    /// A header holding only `alg`.
    pub fn new(algorithm: Algorithm) -> Self {
        let mut header = Header::default();
        header.set("alg", algorithm.name());
        header
    }

    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Header { fields }
    }

    /// The algorithm name ("alg"), as found in the header.
    pub fn algorithm(&self) -> Option<&str> {
        self.get_str("alg")
    }

    /// The key identifier ("kid")
    pub fn key_id(&self) -> Option<&str> {
        self.get_str("kid")
    }

    /// The token type ("typ")
    pub fn typ(&self) -> Option<&str> {
        self.get_str("typ")
    }

    /// The content type ("cty")
    pub fn content_type(&self) -> Option<&str> {
        self.get_str("cty")
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Add a parameter, or replace it in place if already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

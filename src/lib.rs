#![forbid(unsafe_code)]

pub mod algorithm;
pub mod algorithms;
pub mod clock;
pub mod common;
pub mod error;
pub mod header;
pub mod jwt;
pub mod keys;
pub mod provider;
pub mod signer;
pub mod token;
pub mod verifier;

mod numeric_date;

#[cfg(test)]
mod test_keys;

pub use coarsetime;
pub use serde;

pub mod prelude {
    pub use crate::algorithm::*;
    pub use crate::algorithms::*;
    pub use crate::clock::*;
    pub use crate::common::*;
    pub use crate::error::{Error, JWTError};
    pub use crate::header::*;
    pub use crate::jwt::*;
    pub use crate::keys::*;
    pub use crate::provider::*;
    pub use crate::signer::*;
    pub use crate::token::*;
    pub use crate::verifier::*;
    pub use coarsetime::{self, Clock, Duration, UnixTimeStamp};
    pub use serde::{Deserialize, Serialize};
}

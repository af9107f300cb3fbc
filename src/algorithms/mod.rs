mod ecdsa;
mod hmac;
mod rsa;

pub use self::ecdsa::*;
pub use self::hmac::*;
pub use self::rsa::*;

//! NumericDate claim values (RFC 7519 section 2).

use coarsetime::UnixTimeStamp;
use serde_json::Value;

// `UnixTimeStamp` keeps whole seconds in 32 bits.
const MAX_SECS: u64 = u32::MAX as u64;

/// Write a NumericDate as whole seconds.
pub(crate) fn to_value(time: UnixTimeStamp) -> Value {
    Value::from(time.as_secs())
}

/// Read a NumericDate. Integers and fractional numbers are accepted;
/// negative values clamp to the epoch. Returns `None` for non-numbers.
pub(crate) fn from_value(value: &Value) -> Option<UnixTimeStamp> {
    let number = value.as_number()?;
    if let Some(secs) = number.as_u64() {
        return Some(UnixTimeStamp::from_secs(secs.min(MAX_SECS)));
    }
    if number.is_i64() {
        return Some(UnixTimeStamp::from_secs(0));
    }
    let secs = number.as_f64()?;
    if secs.is_nan() || secs <= 0.0 {
        return Some(UnixTimeStamp::from_secs(0));
    }
    if secs >= MAX_SECS as f64 {
        return Some(UnixTimeStamp::from_secs(MAX_SECS));
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9) as u32;
    Some(UnixTimeStamp::new(whole as u64, nanos.min(999_999_999)))
}

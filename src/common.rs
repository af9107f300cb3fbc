use coarsetime::Duration;

/// Default upper bound on the size of the encoded header segment, in bytes.
pub const MAX_HEADER_LENGTH: usize = 8192;

/// Limits and tolerances applied while decoding
#[derive(Clone, Debug, Default)]
pub struct DecoderOptions {
    /// Reject tokens longer than this, in bytes
    pub max_token_length: Option<usize>,

    /// Maximum length of the encoded header segment (default: `MAX_HEADER_LENGTH`)
    pub max_header_length: Option<usize>,

    /// Leeway applied to both "exp" and "nbf" (default: none)
    pub time_tolerance: Option<Duration>,
}

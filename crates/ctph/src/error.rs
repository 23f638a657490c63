use thiserror::Error;

/// Errors reported by the digest engine.
///
/// Every engine operation is total: overflow and declaration mismatches are
/// detected during updates but only surfaced when the digest is requested,
/// keeping the per-byte path free of error plumbing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum FuzzyError {
    /// The input (or a declared input length) exceeds the largest size the
    /// digest format can represent.
    #[error("input of {size} bytes exceeds the maximum the digest can represent")]
    InputTooLarge {
        /// Observed or declared input length in bytes.
        size: u64,
    },

    /// A fixed input length was declared but the bytes actually hashed do
    /// not add up to it.
    #[error("declared input length {declared} does not match the {actual} bytes hashed")]
    FixedLengthMismatch {
        /// Length passed to `set_fixed_length`.
        declared: u64,
        /// Total number of bytes the engine consumed.
        actual: u64,
    },

    /// The input length was declared twice with different values.
    #[error("input length already declared as {previous}, cannot redeclare as {requested}")]
    FixedLengthRedeclared {
        /// The length from the first declaration.
        previous: u64,
        /// The conflicting length from the second declaration.
        requested: u64,
    },
}

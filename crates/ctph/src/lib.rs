#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `ctph` implements the context-triggered piecewise hash (CTPH) used by the
//! rfuzzy workspace. The digest strings it produces are byte-for-byte
//! compatible with the established ssdeep wire format, so signatures computed
//! here remain interchangeable with signatures that have circulated publicly
//! for years.
//!
//! # Design
//!
//! The crate is split into three small modules:
//!
//! - [`rolling`] implements the 7-byte sliding-window hash whose value picks
//!   the content-defined block boundaries.
//! - [`blockhash`] holds the precomputed FNV-style sum table and the
//!   per-block-size accumulator slot.
//! - [`engine`] drives both over a byte stream, maintaining up to 31
//!   parallel block-size hypotheses and selecting one when the digest is
//!   rendered.
//!
//! # Invariants
//!
//! - All rolling-hash arithmetic is wrapping 32-bit unsigned; nothing
//!   saturates.
//! - A digest is a pure function of the concatenation of all update buffers;
//!   chunk boundaries are never observable.
//! - Cloning a [`FuzzyHasher`] yields an independent state: the clone and
//!   the original may diverge freely afterwards.
//!
//! # Errors
//!
//! [`FuzzyError`] covers input-length overflow and fixed-length declaration
//! mismatches. Both surface at [`FuzzyHasher::digest`] time so the update
//! path stays branch-light.
//!
//! # Examples
//!
//! ```
//! use ctph::FuzzyHasher;
//!
//! let sig = FuzzyHasher::hash_bytes(b"Hello World!").unwrap();
//! assert_eq!(sig, "3:aBn:aB");
//! ```

mod blockhash;
mod engine;
mod error;
mod rolling;

pub use engine::{DigestFlags, FuzzyHasher};
pub use error::FuzzyError;
pub use rolling::RollingHash;

/// Width of the sliding window used by [`RollingHash`].
pub const ROLLING_WINDOW: usize = 7;

/// Smallest supported block size; every block size is `3 << k`.
pub const MIN_BLOCKSIZE: u32 = 3;

/// Maximum length of one digest piece, and the expected number of blocks a
/// well-chosen block size produces.
pub const SPAMSUM_LENGTH: usize = 64;

/// Number of parallel block-size hypotheses the engine maintains.
pub const NUM_BLOCKHASHES: usize = 31;

/// Largest input the digest can represent: `3 * 2^30 * 64` bytes.
pub const MAX_INPUT_SIZE: u64 =
    (MIN_BLOCKSIZE as u64) * (1u64 << (NUM_BLOCKHASHES - 1)) * (SPAMSUM_LENGTH as u64);

/// The digest alphabet.
pub(crate) const B64: [u8; 64] =
    *b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Logical block size for hypothesis index `i`.
#[inline]
#[must_use]
pub const fn block_size(index: usize) -> u64 {
    (MIN_BLOCKSIZE as u64) << index
}

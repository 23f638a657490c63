#![deny(unsafe_code)]

//! # Overview
//!
//! `signature` handles the textual side of the fuzzy-hash format: parsing a
//! `blocksize:sig1:sig2` triple into its components and reading or writing
//! files of known signatures.
//!
//! Parsing applies the same normalisation the comparator relies on: runs of
//! more than three identical characters collapse to exactly three, a
//! trailing `,filename` suffix is stripped, and pieces longer than 64
//! characters are rejected.
//!
//! # Errors
//!
//! [`SignatureError`] covers malformed signatures, invalid signature-file
//! headers, malformed entries, and I/O failures while reading. Parse
//! failures never panic; the comparator maps them to its "not comparable"
//! result at the boundary.

mod error;
mod sigfile;
mod signature;

pub use error::SignatureError;
pub use sigfile::{HEADER_V1_0, HEADER_V1_1, SigFileEntry, SigFileReader, SigFileWriter};
pub use signature::{Signature, eliminate_sequences};

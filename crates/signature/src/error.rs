use std::io;

use thiserror::Error;

/// Errors produced while parsing signatures or signature files.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signature does not contain the expected `:` separators.
    #[error("signature is missing a ':' separator")]
    MissingSeparator,

    /// The text before the first `:` is not a decimal block size.
    #[error("block size {text:?} is not a valid decimal number")]
    InvalidBlockSize {
        /// The offending prefix.
        text: String,
    },

    /// A digest piece exceeds the maximum length even after run elimination.
    #[error("signature piece {piece} is longer than {max} characters")]
    PieceTooLong {
        /// 1 for `sig1`, 2 for `sig2`.
        piece: u8,
        /// The enforced maximum.
        max: usize,
    },

    /// The first line of a signature file is not a recognised header.
    #[error("invalid signature file header {found:?}")]
    InvalidHeader {
        /// The line that was read instead.
        found: String,
    },

    /// A signature-file entry does not carry a quoted filename.
    #[error("line {line}: entry has no quoted filename")]
    UnquotedFilename {
        /// 1-based line number within the file.
        line: u64,
    },

    /// A signature-file entry failed to parse.
    #[error("line {line}: {source}")]
    MalformedEntry {
        /// 1-based line number within the file.
        line: u64,
        /// The underlying signature parse failure.
        source: Box<SignatureError>,
    },

    /// Reading the signature file failed.
    #[error("signature file I/O error: {0}")]
    Io(#[from] io::Error),
}

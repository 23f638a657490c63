use std::fmt;
use std::str::FromStr;

use memchr::memchr;

use ctph::SPAMSUM_LENGTH;

use crate::error::SignatureError;

/// Collapses runs of identical characters longer than three.
///
/// Long runs carry almost no information and would bias both the
/// common-substring filter and the edit distance, so the comparator
/// normalises them away on parse. The transformation is idempotent.
///
/// # Examples
///
/// ```
/// assert_eq!(signature::eliminate_sequences("AAAAAAb"), "AAAb");
/// assert_eq!(signature::eliminate_sequences("AAAb"), "AAAb");
/// ```
#[must_use]
pub fn eliminate_sequences(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut run = 0usize;
    let mut previous = None;
    for ch in input.chars() {
        if previous == Some(ch) {
            run += 1;
            if run >= 3 {
                continue;
            }
        } else {
            run = 0;
            previous = Some(ch);
        }
        out.push(ch);
    }
    out
}

/// A parsed fuzzy-hash signature: `blocksize:sig1:sig2`.
///
/// The two digest pieces are stored in run-eliminated form, which is the
/// form every comparison operates on. An optional `,filename` suffix on the
/// input is accepted and discarded.
///
/// # Examples
///
/// ```
/// use signature::Signature;
///
/// let sig: Signature = "3:aBn:aB,\"hello.txt\"".parse().unwrap();
/// assert_eq!(sig.block_size(), 3);
/// assert_eq!(sig.sig1(), "aBn");
/// assert_eq!(sig.sig2(), "aB");
/// assert_eq!(sig.to_string(), "3:aBn:aB");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Signature {
    block_size: u64,
    sig1: String,
    sig2: String,
}

impl Signature {
    /// Parses a textual signature.
    ///
    /// # Errors
    ///
    /// [`SignatureError::MissingSeparator`] when either `:` is absent,
    /// [`SignatureError::InvalidBlockSize`] when the prefix is not a
    /// decimal number, and [`SignatureError::PieceTooLong`] when a piece
    /// still exceeds 64 characters after run elimination.
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        let first = memchr(b':', text.as_bytes()).ok_or(SignatureError::MissingSeparator)?;
        let prefix = &text[..first];
        let block_size: u64 = prefix
            .parse()
            .map_err(|_| SignatureError::InvalidBlockSize {
                text: prefix.to_owned(),
            })?;

        let rest = &text[first + 1..];
        let second = memchr(b':', rest.as_bytes()).ok_or(SignatureError::MissingSeparator)?;
        let sig1 = eliminate_sequences(&rest[..second]);
        if sig1.len() > SPAMSUM_LENGTH {
            return Err(SignatureError::PieceTooLong {
                piece: 1,
                max: SPAMSUM_LENGTH,
            });
        }

        let tail = &rest[second + 1..];
        let tail = match memchr(b',', tail.as_bytes()) {
            Some(comma) => &tail[..comma],
            None => tail,
        };
        let sig2 = eliminate_sequences(tail);
        if sig2.len() > SPAMSUM_LENGTH {
            return Err(SignatureError::PieceTooLong {
                piece: 2,
                max: SPAMSUM_LENGTH,
            });
        }

        Ok(Self {
            block_size,
            sig1,
            sig2,
        })
    }

    /// The declared block size.
    #[must_use]
    pub const fn block_size(&self) -> u64 {
        self.block_size
    }

    /// The first digest piece, run-eliminated.
    #[must_use]
    pub fn sig1(&self) -> &str {
        &self.sig1
    }

    /// The second digest piece, run-eliminated.
    #[must_use]
    pub fn sig2(&self) -> &str {
        &self.sig2
    }

    /// Reports whether two signatures have comparable block sizes.
    ///
    /// Signatures compare when their block sizes are equal or differ by
    /// exactly one doubling; anything else scores zero without being an
    /// error.
    #[must_use]
    pub const fn is_comparable_with(&self, other: &Self) -> bool {
        let a = self.block_size;
        let b = other.block_size;
        a == b || (a <= u64::MAX / 2 && a * 2 == b) || (a % 2 == 0 && a / 2 == b)
    }

    /// Reports whether the block size has the canonical `3 * 2^k` form the
    /// digest engine emits.
    ///
    /// Foreign block sizes still parse and compare (they simply never score
    /// against engine output); this helper lets diagnostics flag them.
    #[must_use]
    pub fn has_canonical_block_size(&self) -> bool {
        let bs = self.block_size;
        bs >= 3 && bs % 3 == 0 && (bs / 3).is_power_of_two() && bs / 3 <= (1 << 30)
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.block_size, self.sig1, self.sig2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_empty_signature() {
        let sig = Signature::parse("3::").unwrap();
        assert_eq!(sig.block_size(), 3);
        assert_eq!(sig.sig1(), "");
        assert_eq!(sig.sig2(), "");
        assert_eq!(sig.to_string(), "3::");
    }

    #[test]
    fn strips_a_trailing_filename() {
        let sig = Signature::parse("96:abcdef:ghij,\"dir/file name.bin\"").unwrap();
        assert_eq!(sig.sig1(), "abcdef");
        assert_eq!(sig.sig2(), "ghij");
    }

    #[test]
    fn collapses_runs_on_parse() {
        let sig = Signature::parse("3:AAAAAA:BBBBBB").unwrap();
        assert_eq!(sig.sig1(), "AAA");
        assert_eq!(sig.sig2(), "BBB");
    }

    #[test]
    fn elimination_is_idempotent() {
        let once = eliminate_sequences("xxxxxyzzzzzzzyyy");
        let twice = eliminate_sequences(&once);
        assert_eq!(once, "xxxyzzzyyy");
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_text_without_separators() {
        assert!(matches!(
            Signature::parse("not-a-signature"),
            Err(SignatureError::MissingSeparator)
        ));
        assert!(matches!(
            Signature::parse("3:only-one-piece"),
            Err(SignatureError::MissingSeparator)
        ));
    }

    #[test]
    fn rejects_a_non_numeric_block_size() {
        assert!(matches!(
            Signature::parse("abc:def:ghi"),
            Err(SignatureError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn rejects_overlong_pieces_after_elimination() {
        let long: String = "ABCDEFGHIJKLMNOP".repeat(5);
        assert!(matches!(
            Signature::parse(&format!("3:{long}:ok")),
            Err(SignatureError::PieceTooLong { piece: 1, .. })
        ));
        assert!(matches!(
            Signature::parse(&format!("3:ok:{long}")),
            Err(SignatureError::PieceTooLong { piece: 2, .. })
        ));

        // A long run collapses below the limit instead of failing.
        let runs = "A".repeat(100);
        let sig = Signature::parse(&format!("3:{runs}:x")).unwrap();
        assert_eq!(sig.sig1(), "AAA");
    }

    #[test]
    fn block_size_compatibility_is_one_doubling() {
        let base = Signature::parse("48:aaaaaaa:bbbbbbb").unwrap();
        let same = Signature::parse("48:ccccccc:ddddddd").unwrap();
        let double = Signature::parse("96:ccccccc:ddddddd").unwrap();
        let half = Signature::parse("24:ccccccc:ddddddd").unwrap();
        let far = Signature::parse("192:ccccccc:ddddddd").unwrap();

        assert!(base.is_comparable_with(&same));
        assert!(base.is_comparable_with(&double));
        assert!(base.is_comparable_with(&half));
        assert!(!base.is_comparable_with(&far));
        assert!(!far.is_comparable_with(&base));
    }

    #[test]
    fn canonical_block_sizes_are_recognised() {
        for k in 0..=30u32 {
            let sig = Signature::parse(&format!("{}:a:b", 3u64 << k)).unwrap();
            assert!(sig.has_canonical_block_size());
        }
        for bs in [0u64, 1, 2, 5, 7, 9, 3 << 31] {
            let sig = Signature::parse(&format!("{bs}:a:b")).unwrap();
            assert!(!sig.has_canonical_block_size());
        }
    }
}

use ctph::{MIN_BLOCKSIZE, ROLLING_WINDOW, SPAMSUM_LENGTH};
use signature::{Signature, SignatureError};

/// Block sizes at or above this value score without the small-block cap.
const SMALL_BLOCK_LIMIT: u64 =
    (99 + ROLLING_WINDOW as u64) / (ROLLING_WINDOW as u64) * (MIN_BLOCKSIZE as u64);

/// Scores one pair of digest pieces at an effective block size.
///
/// Returns `0..=100`. Pieces shorter than the rolling window, or pairs
/// without a seven-byte common substring, score zero outright. Below
/// [`SMALL_BLOCK_LIMIT`] the score is capped in proportion to the block
/// size and the shorter piece, so matches between tiny inputs are not
/// overstated.
fn score_strings(s1: &[u8], s2: &[u8], block_size: u64) -> u32 {
    if s1.len() < ROLLING_WINDOW || s2.len() < ROLLING_WINDOW {
        return 0;
    }

    #[cfg(feature = "position-array")]
    let distance = {
        let table = crate::position::PositionArray::new(s1);
        if !table.has_common_substring(s2) {
            return 0;
        }
        table.edit_distance(s2)
    };
    #[cfg(not(feature = "position-array"))]
    let distance = {
        if !crate::common_substring::has_common_substring(s1, s2) {
            return 0;
        }
        crate::edit_distance::edit_distance(s1, s2)
    };

    // Scale by the combined length so the value measures the changed
    // proportion rather than an absolute edit count, then flip onto the
    // friendlier 0..=100 scale where 100 is a perfect match.
    let mut score = distance * SPAMSUM_LENGTH as u32 / (s1.len() + s2.len()) as u32;
    score = 100 * score / SPAMSUM_LENGTH as u32;
    score = 100 - score;

    if block_size >= SMALL_BLOCK_LIMIT {
        return score;
    }
    let cap = (block_size / u64::from(MIN_BLOCKSIZE)) as u32 * s1.len().min(s2.len()) as u32;
    score.min(cap)
}

/// Scores two already-parsed signatures.
///
/// Returns `0..=100`; incompatible block sizes score `0`, bytewise-equal
/// signatures short-circuit to `100`. When the block sizes are equal both
/// piece pairs are scored and the larger result wins; when they differ by a
/// doubling, the overlapping pieces are scored at the larger block size.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
#[must_use]
pub fn compare_signatures(a: &Signature, b: &Signature) -> u32 {
    if !a.is_comparable_with(b) {
        return 0;
    }

    let bs1 = a.block_size();
    let bs2 = b.block_size();
    if bs1 == bs2 && a.sig1() == b.sig1() && a.sig2() == b.sig2() {
        return 100;
    }

    let (s1b1, s1b2) = (a.sig1().as_bytes(), a.sig2().as_bytes());
    let (s2b1, s2b2) = (b.sig1().as_bytes(), b.sig2().as_bytes());

    if bs1 <= u64::MAX / 2 {
        if bs1 == bs2 {
            let score1 = score_strings(s1b1, s2b1, bs1);
            let score2 = score_strings(s1b2, s2b2, bs1 * 2);
            score1.max(score2)
        } else if bs1 * 2 == bs2 {
            score_strings(s2b1, s1b2, bs2)
        } else {
            score_strings(s1b1, s2b2, bs1)
        }
    } else if bs1 == bs2 {
        // Block sizes this large cannot be doubled without overflowing, so
        // only the first piece pair can be scored.
        score_strings(s1b1, s2b1, bs1)
    } else if bs1 % 2 == 0 && bs1 / 2 == bs2 {
        score_strings(s1b1, s2b2, bs1)
    } else {
        0
    }
}

/// Parses and scores two textual signatures.
///
/// # Errors
///
/// Any [`SignatureError`] from parsing either input; the score itself is
/// always defined for well-formed signatures.
///
/// # Examples
///
/// ```
/// use matching::compare;
///
/// assert_eq!(compare("3:aBn:aB", "3:aBn:aB").unwrap(), 100);
/// assert_eq!(compare("3:aaaaaaa:bbbb", "48:cccccc:dddd").unwrap(), 0);
/// assert!(compare("not-a-signature", "3:abcdefg:hij").is_err());
/// ```
pub fn compare(a: &str, b: &str) -> Result<u32, SignatureError> {
    let sig_a = Signature::parse(a)?;
    let sig_b = Signature::parse(b)?;
    Ok(compare_signatures(&sig_a, &sig_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_signatures_score_one_hundred() {
        assert_eq!(compare("3::", "3::").unwrap(), 100);
        assert_eq!(
            compare("3:aaaaaaa:bbbbbbb", "3:aaaaaaa:bbbbbbb").unwrap(),
            100
        );
    }

    #[test]
    fn runs_collapse_before_the_identity_check() {
        // Runs of four or more collapse to three on parse, so these pairs
        // are bytewise equal afterwards and hit the identity short-cut even
        // though the pieces are shorter than the rolling window.
        assert_eq!(compare("3:AAAAAA:BBBBBB", "3:AAA:BBB").unwrap(), 100);
        assert_eq!(compare("3:AAA:BBB", "3:AAA:BBB").unwrap(), 100);
    }

    #[test]
    fn incompatible_block_sizes_score_zero() {
        assert_eq!(compare("3:aaaaaaa:bbbb", "48:cccccc:dddd").unwrap(), 0);
        assert_eq!(compare("3:aaaaaaa:bbbb", "12:aaaaaaa:bbbb").unwrap(), 0);
    }

    #[test]
    fn adjacent_block_sizes_score_the_overlapping_pieces() {
        // sig2 of the smaller block size lines up with sig1 of the larger.
        let small = "24:ABCDEFGHIJKLMNOP:QRSTUVWXYZabcdef";
        let large = "48:QRSTUVWXYZabcdef:ghij";
        let score = compare(small, large).unwrap();
        assert_eq!(score, compare(large, small).unwrap());
        assert_eq!(score, 100);
    }

    #[test]
    fn malformed_signatures_are_errors() {
        assert!(compare("not-a-signature", "3:abcdefg:hij").is_err());
        assert!(compare("3:abcdefg:hij", "::").is_err());
    }

    #[test]
    fn short_pieces_without_identity_score_zero() {
        assert_eq!(compare("3:abc:def", "3:abd:deg").unwrap(), 0);
    }

    #[test]
    fn known_score_pairs() {
        assert_eq!(
            score_strings(b"ABCDEFGHIJKLMNOP", b"ABCDEFGHQRSTUVWX", 48),
            50
        );
        // The same pair at block size 3 hits the small-block cap.
        assert_eq!(
            score_strings(b"ABCDEFGHIJKLMNOP", b"ABCDEFGHQRSTUVWX", 3),
            16
        );
    }

    #[test]
    fn scores_never_leave_the_range() {
        let pairs = [
            ("3:ABCDEFGHIJ:KLMNOPQRST", "3:ABCDEFGHIJ:KLMNOPQRSU"),
            ("192:ABCDEFGHIJ:KLMNOPQRST", "384:KLMNOPQRST:zzzz"),
            ("6:AAAbbbCCCddd:EEE", "6:AAAbbbCCCddd:EEE"),
        ];
        for (a, b) in pairs {
            let score = compare(a, b).unwrap();
            assert!(score <= 100);
        }
    }
}

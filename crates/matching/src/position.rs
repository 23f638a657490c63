use ctph::{ROLLING_WINDOW, SPAMSUM_LENGTH};

/// Per-character bitmap of positions in a source string.
///
/// Bit `i` of `bits[c]` is set when byte `i` of the source equals `c`. One
/// table serves both bit-parallel kernels: the Hyyrö-style edit distance and
/// the substring filter, so a caller scoring one string against many others
/// builds the table once per source.
///
/// Only sources of up to [`SPAMSUM_LENGTH`] bytes are representable; digest
/// pieces always satisfy that after parsing.
#[derive(Clone, Debug)]
pub struct PositionArray {
    bits: [u64; 256],
    len: usize,
}

impl PositionArray {
    /// Builds the table for `source`.
    #[must_use]
    pub fn new(source: &[u8]) -> Self {
        debug_assert!(source.len() <= SPAMSUM_LENGTH);
        let mut bits = [0u64; 256];
        for (i, &byte) in source.iter().enumerate() {
            bits[usize::from(byte)] |= 1 << i;
        }
        Self {
            bits,
            len: source.len(),
        }
    }

    /// Length of the source string the table was built from.
    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.len
    }

    /// Bit-parallel variant of [`crate::edit_distance`] against `target`.
    ///
    /// Maintains the positive and negative vertical delta vectors and a
    /// running distance initialised to the source length; each target byte
    /// costs one word-parallel update.
    #[must_use]
    pub fn edit_distance(&self, target: &[u8]) -> u32 {
        debug_assert!(target.len() <= SPAMSUM_LENGTH);
        if self.len == 0 {
            return target.len() as u32;
        }
        let msb = 1u64 << (self.len - 1);
        let mut cur = self.len as i64;
        let mut pv = u64::MAX;
        let mut nv = 0u64;
        for &byte in target {
            let mt = self.bits[usize::from(byte)];
            let zd = ((mt & pv).wrapping_add(pv) ^ pv) | mt | nv;
            let nh = pv & zd;
            if nh & msb != 0 {
                cur -= 1;
            }
            let x = nv | !(pv | zd) | (pv & !mt & 1);
            let y = pv.wrapping_sub(nh) >> 1;
            let ph = x.wrapping_add(y) ^ y;
            if ph & msb != 0 {
                cur += 1;
            }
            let x = (ph << 1) | 1;
            nv = x & zd;
            pv = (nh << 1) | !(x | zd) | (x & pv.wrapping_sub(nh));
        }
        cur as u32
    }

    /// Bit-parallel variant of [`crate::has_common_substring`].
    ///
    /// Scans the target back to front, extending a match word while source
    /// positions keep lining up and skipping a full window width whenever
    /// the match dies, so most windows cost a single table probe.
    #[must_use]
    pub fn has_common_substring(&self, target: &[u8]) -> bool {
        if self.len < ROLLING_WINDOW || target.len() < ROLLING_WINDOW {
            return false;
        }
        let n = target.len();
        let mut r = ROLLING_WINDOW - 1;
        while r < n {
            let l = r - (ROLLING_WINDOW - 1);
            let mut idx = n - 1 - r;
            let mut d = self.bits[usize::from(target[idx])];
            while d != 0 {
                r -= 1;
                idx += 1;
                d = (d << 1) & self.bits[usize::from(target[idx])];
                if r == l && d != 0 {
                    return true;
                }
            }
            r += ROLLING_WINDOW;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_substring::has_common_substring;
    use crate::edit_distance::edit_distance;

    use proptest::prelude::*;

    #[test]
    fn matches_the_row_swap_kernel_on_known_pairs() {
        let cases: [(&[u8], &[u8]); 5] = [
            (b"Hello world", b"Hello owrld"),
            (b"Hello world", b"Hell world"),
            (b"ABCDEFGH", b"ABCDEFGH"),
            (b"ABCDEFGH", b"QRSTUVWX"),
            (b"A", b""),
        ];
        for (a, b) in cases {
            assert_eq!(PositionArray::new(a).edit_distance(b), edit_distance(a, b));
        }
    }

    #[test]
    fn finds_a_shared_seven_byte_window() {
        let pa = PositionArray::new(b"xxABCDEFGyy");
        assert!(pa.has_common_substring(b"zzzABCDEFGzzz"));
        assert!(!pa.has_common_substring(b"zzzABCDEFzzzz"));
        assert!(!pa.has_common_substring(b"short"));
    }

    fn piece() -> impl Strategy<Value = Vec<u8>> {
        // A narrow alphabet makes shared substrings and near-misses common.
        prop::collection::vec(prop::sample::select(b"ABCDab01+/".to_vec()), 0..=SPAMSUM_LENGTH)
    }

    proptest! {
        #[test]
        fn edit_distance_agrees_with_row_swap(a in piece(), b in piece()) {
            prop_assert_eq!(
                PositionArray::new(&a).edit_distance(&b),
                edit_distance(&a, &b)
            );
        }

        #[test]
        fn substring_filter_agrees_with_rolling_hash(a in piece(), b in piece()) {
            prop_assert_eq!(
                PositionArray::new(&a).has_common_substring(&b),
                has_common_substring(&a, &b)
            );
        }
    }
}

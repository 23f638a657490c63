use ctph::{ROLLING_WINDOW, RollingHash};
use rustc_hash::FxHashSet;

/// Reports whether two strings share any substring of [`ROLLING_WINDOW`]
/// bytes.
///
/// Requiring one shared window before scoring drops the false-positive rate
/// at low thresholds dramatically while barely affecting true matches. The
/// implementation reuses the engine's rolling hash as a filter: every window
/// of `s1` contributes its hash to a candidate set, every window of `s2` is
/// probed against it, and a hash hit is confirmed with a literal comparison
/// so collisions cannot produce a false answer.
///
/// # Examples
///
/// ```
/// use matching::has_common_substring;
///
/// assert!(has_common_substring(b"xxABCDEFGyy", b"ABCDEFG"));
/// assert!(!has_common_substring(b"abcdefg", b"abcdefX"));
/// ```
#[must_use]
pub fn has_common_substring(s1: &[u8], s2: &[u8]) -> bool {
    if s1.len() < ROLLING_WINDOW || s2.len() < ROLLING_WINDOW {
        return false;
    }

    let mut hashes = Vec::with_capacity(s1.len() - ROLLING_WINDOW + 1);
    let mut roll = RollingHash::new();
    for &byte in &s1[..ROLLING_WINDOW - 1] {
        roll.feed(byte);
    }
    for &byte in &s1[ROLLING_WINDOW - 1..] {
        roll.feed(byte);
        hashes.push(roll.sum());
    }
    let candidates: FxHashSet<u32> = hashes.iter().copied().collect();

    let mut roll = RollingHash::new();
    for &byte in &s2[..ROLLING_WINDOW - 1] {
        roll.feed(byte);
    }
    for j in 0..=s2.len() - ROLLING_WINDOW {
        roll.feed(s2[j + ROLLING_WINDOW - 1]);
        let h = roll.sum();
        if !candidates.contains(&h) {
            continue;
        }
        for (i, &candidate) in hashes.iter().enumerate() {
            if candidate == h && s1[i..i + ROLLING_WINDOW] == s2[j..j + ROLLING_WINDOW] {
                return true;
            }
        }
    }
    false
}

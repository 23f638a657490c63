use ctph::SPAMSUM_LENGTH;

const INSERT_COST: u32 = 1;
const REMOVE_COST: u32 = 1;
const REPLACE_COST: u32 = 2;

/// Levenshtein distance with substitution weighted at twice the cost of an
/// insertion or deletion.
///
/// Both inputs are digest pieces of at most [`SPAMSUM_LENGTH`] bytes, so a
/// pair of fixed rows suffices. The weighting makes one changed character
/// cost the same as deleting it and inserting its replacement, which keeps
/// the score scale consistent across edit kinds.
///
/// # Examples
///
/// ```
/// use matching::edit_distance;
///
/// assert_eq!(edit_distance(b"Hello world", b"Hello world"), 0);
/// assert_eq!(edit_distance(b"Hello world", b"Hell world"), 1);
/// assert_eq!(edit_distance(b"Hello world", b"HellX world"), 2);
/// ```
#[must_use]
pub fn edit_distance(s1: &[u8], s2: &[u8]) -> u32 {
    debug_assert!(s1.len() <= SPAMSUM_LENGTH && s2.len() <= SPAMSUM_LENGTH);
    let mut previous = [0u32; SPAMSUM_LENGTH + 1];
    let mut current = [0u32; SPAMSUM_LENGTH + 1];
    for (i2, slot) in previous.iter_mut().take(s2.len() + 1).enumerate() {
        *slot = i2 as u32 * REMOVE_COST;
    }
    for (i1, &c1) in s1.iter().enumerate() {
        current[0] = (i1 as u32 + 1) * INSERT_COST;
        for (i2, &c2) in s2.iter().enumerate() {
            let cost_insert = previous[i2 + 1] + INSERT_COST;
            let cost_remove = current[i2] + REMOVE_COST;
            let cost_replace = previous[i2] + if c1 == c2 { 0 } else { REPLACE_COST };
            current[i2 + 1] = cost_insert.min(cost_remove).min(cost_replace);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[s2.len()]
}

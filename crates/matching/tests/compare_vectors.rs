//! End-to-end comparison vectors: hash realistic buffers with the engine,
//! then score the resulting signatures.

use ctph::FuzzyHasher;
use matching::compare;

fn lcg_bytes(seed: u64, n: usize) -> Vec<u8> {
    let mut x = seed;
    (0..n)
        .map(|_| {
            x = x
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (x >> 56) as u8
        })
        .collect()
}

#[test]
fn one_byte_flip_in_64_kib_scores_ninety_nine() {
    let a = lcg_bytes(0x5EED, 65536);
    let mut b = a.clone();
    b[32768] ^= 0x03;

    let sig_a = FuzzyHasher::hash_bytes(&a).unwrap();
    let sig_b = FuzzyHasher::hash_bytes(&b).unwrap();

    let score = compare(&sig_a, &sig_b).unwrap();
    assert_eq!(score, 99);
    assert_eq!(compare(&sig_b, &sig_a).unwrap(), score);
    assert_eq!(compare(&sig_a, &sig_a).unwrap(), 100);
}

#[test]
fn sixteen_zeroed_bytes_in_1_mib_score_ninety_nine() {
    let a = lcg_bytes(99, 1 << 20);
    let mut b = a.clone();
    for slot in &mut b[500000..500016] {
        *slot = 0;
    }

    let sig_a = FuzzyHasher::hash_bytes(&a).unwrap();
    let sig_b = FuzzyHasher::hash_bytes(&b).unwrap();
    assert_eq!(compare(&sig_a, &sig_b).unwrap(), 99);
}

#[test]
fn truncated_file_scores_across_block_sizes() {
    let full = lcg_bytes(1234, 200000);
    let sig_full = FuzzyHasher::hash_bytes(&full).unwrap();
    let sig_prefix = FuzzyHasher::hash_bytes(&full[..120000]).unwrap();

    let score = compare(&sig_full, &sig_prefix).unwrap();
    assert_eq!(score, 77);
    assert_eq!(compare(&sig_prefix, &sig_full).unwrap(), score);
}

#[test]
fn unrelated_buffers_score_zero() {
    let sig_a = FuzzyHasher::hash_bytes(&lcg_bytes(42, 4096)).unwrap();
    let sig_b = FuzzyHasher::hash_bytes(&lcg_bytes(7, 4096)).unwrap();
    assert_eq!(compare(&sig_a, &sig_b).unwrap(), 0);
}

#[test]
fn empty_digest_compares_reflexively() {
    let sig = FuzzyHasher::hash_bytes(b"").unwrap();
    assert_eq!(sig, "3::");
    assert_eq!(compare(&sig, &sig).unwrap(), 100);
}

//! The documented end-to-end scenarios, exercised through the public crate
//! APIs rather than the binary.

use ctph::{DigestFlags, FuzzyHasher};
use matching::compare;
use signature::Signature;

#[test]
fn empty_input_round_trips() {
    let sig = FuzzyHasher::hash_bytes(b"").unwrap();
    assert_eq!(sig, "3::");
    assert_eq!(compare(&sig, &sig).unwrap(), 100);
}

#[test]
fn all_zero_input_round_trips() {
    // Zero bytes keep the rolling sum at zero, so no content-defined
    // boundary ever fires and both pieces stay empty.
    let sig = FuzzyHasher::hash_bytes(&vec![0u8; 1024]).unwrap();
    assert_eq!(sig, "3::");
    assert_eq!(compare(&sig, &sig).unwrap(), 100);
}

#[test]
fn single_byte_flip_keeps_high_similarity() {
    let mut x = 0x5EEDu64;
    let mut data: Vec<u8> = (0..65536)
        .map(|_| {
            x = x
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (x >> 56) as u8
        })
        .collect();
    let sig_a = FuzzyHasher::hash_bytes(&data).unwrap();
    data[32768] ^= 0x03;
    let sig_b = FuzzyHasher::hash_bytes(&data).unwrap();

    let parsed_a: Signature = sig_a.parse().unwrap();
    let parsed_b: Signature = sig_b.parse().unwrap();
    assert_eq!(parsed_a.block_size(), parsed_b.block_size());
    assert!(compare(&sig_a, &sig_b).unwrap() >= 95);
}

#[test]
fn incompatible_block_sizes_score_zero() {
    assert_eq!(compare("3:aaaaaaa:bbbb", "48:cccccc:dddd").unwrap(), 0);
}

#[test]
fn malformed_signatures_do_not_score() {
    assert!(compare("not-a-signature", "3:abcdefg:hij").is_err());
}

#[test]
fn run_elimination_makes_long_runs_equivalent() {
    let collapsed = compare("3:AAA:BBB", "3:AAA:BBB").unwrap();
    assert_eq!(compare("3:AAAAAA:BBBBBB", "3:AAA:BBB").unwrap(), collapsed);
    assert_eq!(collapsed, 100);
}

#[test]
fn alphabet_closure_holds_for_odd_inputs() {
    let alphabet: Vec<u8> =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/".to_vec();
    for data in [
        vec![0xffu8; 300],
        (0u8..=255).collect::<Vec<u8>>(),
        b"\x00\x01\x02tiny".to_vec(),
    ] {
        let mut hasher = FuzzyHasher::new();
        hasher.update(&data);
        let sig = hasher.digest(DigestFlags::new().no_truncate()).unwrap();
        let sig = Signature::parse(&sig).unwrap();
        for piece in [sig.sig1(), sig.sig2()] {
            assert!(piece.bytes().all(|b| alphabet.contains(&b)));
        }
    }
}

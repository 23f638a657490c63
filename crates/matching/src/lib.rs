#![deny(unsafe_code)]

//! # Overview
//!
//! `matching` scores parsed signatures against each other and maintains the
//! collections a matching run needs: the insertion-ordered index of known
//! signatures and the union-find cluster set used for grouped output.
//!
//! # Design
//!
//! Scoring runs in three stages, mirroring the established algorithm:
//!
//! 1. a block-size compatibility gate (equal or exactly one doubling apart),
//! 2. a common-substring pre-filter requiring seven consecutive shared
//!    characters, which removes almost all false positives at low scores,
//! 3. a length-normalised edit distance rescaled to `0..=100`, with a cap
//!    for small block sizes so short inputs cannot overstate similarity.
//!
//! Two interchangeable kernels implement stages 2 and 3: a rolling-hash
//! filter plus row-swap dynamic program, and a bit-parallel pair sharing one
//! [`PositionArray`] (selected by the default `position-array` feature).
//! Both produce identical scores.

mod cluster;
mod common_substring;
mod compare;
mod edit_distance;
mod index;
mod position;

pub use cluster::ClusterSet;
pub use common_substring::has_common_substring;
pub use compare::{compare, compare_signatures};
pub use edit_distance::edit_distance;
pub use index::{Filedata, MatchIndex, MatchResult, ScanOptions};
pub use position::PositionArray;

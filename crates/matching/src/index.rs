use std::io::BufRead;

use signature::{SigFileEntry, SigFileReader, Signature, SignatureError};

use crate::compare::compare_signatures;

/// One known file: its parsed signature plus display metadata.
#[derive(Clone, Debug)]
pub struct Filedata {
    signature: Signature,
    raw: String,
    filename: String,
    match_file: Option<String>,
}

impl Filedata {
    /// Builds an entry from a rendered signature and a display filename.
    ///
    /// # Errors
    ///
    /// Any [`SignatureError`] from parsing `signature`.
    pub fn new(signature: &str, filename: &str) -> Result<Self, SignatureError> {
        Ok(Self {
            signature: Signature::parse(signature)?,
            raw: signature.to_owned(),
            filename: filename.to_owned(),
            match_file: None,
        })
    }

    /// Converts a signature-file entry, recording which file it came from.
    #[must_use]
    pub fn from_entry(entry: SigFileEntry, origin: &str) -> Self {
        Self {
            signature: entry.signature,
            raw: entry.raw,
            filename: entry.filename,
            match_file: Some(origin.to_owned()),
        }
    }

    /// The parsed signature.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The signature as originally rendered.
    #[must_use]
    pub fn raw_signature(&self) -> &str {
        &self.raw
    }

    /// Display filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The signature file this entry was loaded from, if any.
    #[must_use]
    pub fn match_file(&self) -> Option<&str> {
        self.match_file.as_deref()
    }
}

/// A match produced by scanning the index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchResult {
    /// Index of the matched entry.
    pub index: usize,
    /// Similarity score in `0..=100`.
    pub score: u32,
}

/// Options controlling [`MatchIndex::scan`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanOptions {
    /// Matches must score strictly above this to be reported.
    pub threshold: u32,
    /// Report every comparison regardless of score.
    pub display_all: bool,
    /// Suppress comparisons of an entry against itself (same filename and
    /// signature from the same origin), as pairwise self-scans would
    /// otherwise report every file matching itself.
    pub skip_identical: bool,
}

/// Insertion-ordered store of known signatures.
///
/// The index replaces upstream ssdeep's hand-rolled linked list with owned
/// values in a vector; clustering references entries by their insertion
/// index, so nothing in the store is ever aliased.
#[derive(Clone, Debug, Default)]
pub struct MatchIndex {
    entries: Vec<Filedata>,
}

impl MatchIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, returning its index.
    pub fn add(&mut self, entry: Filedata) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Stored entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Filedata] {
        &self.entries
    }

    /// Looks up one entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Filedata> {
        self.entries.get(index)
    }

    /// Loads every entry of a signature file, tagging each with `origin`.
    ///
    /// Returns the number of entries added.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first malformed entry or I/O failure;
    /// entries read before the failure remain in the index.
    pub fn load<R: BufRead>(
        &mut self,
        reader: SigFileReader<R>,
        origin: &str,
    ) -> Result<usize, SignatureError> {
        let mut added = 0;
        for entry in reader {
            self.add(Filedata::from_entry(entry?, origin));
            added += 1;
        }
        Ok(added)
    }

    /// Scores `probe` against every stored entry.
    ///
    /// Results keep the index's insertion order.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    #[must_use]
    pub fn scan(&self, probe: &Filedata, options: ScanOptions) -> Vec<MatchResult> {
        let mut results = Vec::new();
        for (index, known) in self.entries.iter().enumerate() {
            if options.skip_identical
                && probe.filename == known.filename
                && probe.signature == known.signature
                && probe.match_file == known.match_file
            {
                continue;
            }
            let score = compare_signatures(&probe.signature, &known.signature);
            if score > options.threshold || options.display_all {
                results.push(MatchResult { index, score });
            }
        }
        results
    }
}

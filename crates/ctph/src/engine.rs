use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use logging::debug_log;

use crate::blockhash::{BlockHash, HASH_INIT, sum_hash};
use crate::error::FuzzyError;
use crate::rolling::RollingHash;
use crate::{B64, MAX_INPUT_SIZE, MIN_BLOCKSIZE, NUM_BLOCKHASHES, SPAMSUM_LENGTH, block_size};

/// Rendering options for [`FuzzyHasher::digest`].
///
/// # Examples
///
/// ```
/// use ctph::DigestFlags;
///
/// let flags = DigestFlags::new().eliminate_sequences();
/// assert!(flags.eliminates_sequences());
/// assert!(!flags.is_untruncated());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DigestFlags {
    eliminate_sequences: bool,
    no_truncate: bool,
}

impl DigestFlags {
    /// Default rendering: runs kept, second piece truncated to 32 characters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            eliminate_sequences: false,
            no_truncate: false,
        }
    }

    /// Collapse runs of more than three identical characters while rendering.
    #[must_use]
    pub const fn eliminate_sequences(self) -> Self {
        Self {
            eliminate_sequences: true,
            no_truncate: self.no_truncate,
        }
    }

    /// Keep the second piece at full length instead of truncating it.
    #[must_use]
    pub const fn no_truncate(self) -> Self {
        Self {
            eliminate_sequences: self.eliminate_sequences,
            no_truncate: true,
        }
    }

    /// Reports whether run elimination is requested.
    #[must_use]
    pub const fn eliminates_sequences(self) -> bool {
        self.eliminate_sequences
    }

    /// Reports whether truncation of the second piece is disabled.
    #[must_use]
    pub const fn is_untruncated(self) -> bool {
        self.no_truncate
    }
}

/// Streaming context-triggered piecewise hash state.
///
/// The hasher consumes byte buffers in any chunking and renders a textual
/// signature of the form `blocksize:sig1:sig2`. Because the right block size
/// depends on the total input length, which a stream does not know up front,
/// the state tracks up to [`NUM_BLOCKHASHES`] block-size hypotheses in
/// parallel and picks one at digest time. Callers that do know the length in
/// advance can declare it with [`set_fixed_length`](Self::set_fixed_length)
/// so hypotheses that can never win are skipped.
///
/// The state owns nothing but its own memory: it can be cloned to snapshot
/// an intermediate position, sent across threads, or dropped at any point.
///
/// # Examples
///
/// ```
/// use ctph::{DigestFlags, FuzzyHasher};
///
/// let mut hasher = FuzzyHasher::new();
/// hasher.update(b"Hello ");
/// hasher.update(b"World!");
/// assert_eq!(hasher.digest(DigestFlags::new()).unwrap(), "3:aBn:aB");
/// ```
#[derive(Clone, Debug)]
pub struct FuzzyHasher {
    bh: [BlockHash; NUM_BLOCKHASHES],
    roll: RollingHash,
    total_size: u64,
    fixed_size: Option<u64>,
    reduce_border: u64,
    bhstart: usize,
    bhend: usize,
    bhendlimit: usize,
    rollmask: u32,
    lasth: u8,
    need_lasthash: bool,
}

impl Default for FuzzyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyHasher {
    /// Creates an empty digest state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bh: [BlockHash::new(); NUM_BLOCKHASHES],
            roll: RollingHash::new(),
            total_size: 0,
            fixed_size: None,
            reduce_border: (MIN_BLOCKSIZE as u64) * (SPAMSUM_LENGTH as u64),
            bhstart: 0,
            bhend: 1,
            bhendlimit: NUM_BLOCKHASHES - 1,
            rollmask: 0,
            lasth: 0,
            need_lasthash: false,
        }
    }

    /// Declares the total input length ahead of time.
    ///
    /// Knowing the length lets the engine cap the largest block-size
    /// hypothesis it will ever activate, which keeps the per-byte loop short
    /// for large inputs. The declaration is checked against the actual byte
    /// count when the digest is rendered.
    ///
    /// # Errors
    ///
    /// [`FuzzyError::InputTooLarge`] when `len` exceeds [`MAX_INPUT_SIZE`],
    /// and [`FuzzyError::FixedLengthRedeclared`] when a different length was
    /// declared earlier.
    pub fn set_fixed_length(&mut self, len: u64) -> Result<(), FuzzyError> {
        if len > MAX_INPUT_SIZE {
            return Err(FuzzyError::InputTooLarge { size: len });
        }
        if let Some(previous) = self.fixed_size {
            if previous != len {
                return Err(FuzzyError::FixedLengthRedeclared {
                    previous,
                    requested: len,
                });
            }
        }
        self.fixed_size = Some(len);
        let mut bi = 0;
        while block_size(bi) * (SPAMSUM_LENGTH as u64) < len {
            bi += 1;
            if bi == NUM_BLOCKHASHES - 2 {
                break;
            }
        }
        self.bhendlimit = bi + 1;
        Ok(())
    }

    /// Total number of bytes consumed so far.
    #[must_use]
    pub const fn total_len(&self) -> u64 {
        self.total_size
    }

    /// Feeds a buffer into the digest.
    ///
    /// Buffer boundaries are not observable: any partitioning of the same
    /// byte sequence produces the same digest. Inputs beyond
    /// [`MAX_INPUT_SIZE`] saturate the internal length counter; the overflow
    /// is reported by [`digest`](Self::digest).
    pub fn update(&mut self, buffer: &[u8]) {
        let len = buffer.len() as u64;
        if len > MAX_INPUT_SIZE || MAX_INPUT_SIZE - len < self.total_size {
            self.total_size = MAX_INPUT_SIZE + 1;
        } else {
            self.total_size += len;
        }
        for &byte in buffer {
            self.step(byte);
        }
    }

    fn try_fork(&mut self) {
        debug_assert!(self.bhend > 0);
        if self.bhend <= self.bhendlimit {
            let (h, halfh) = {
                let last = &self.bh[self.bhend - 1];
                (last.h, last.halfh)
            };
            let next = &mut self.bh[self.bhend];
            next.h = h;
            next.halfh = halfh;
            next.digest[0] = 0;
            next.halfdigest = 0;
            next.dindex = 0;
            self.bhend += 1;
        } else if self.bhend == NUM_BLOCKHASHES && !self.need_lasthash {
            // No room for a 32nd hypothesis; keep only its accumulator so a
            // maximal-block-size digest can still end in a meaningful
            // character.
            self.need_lasthash = true;
            self.lasth = self.bh[self.bhend - 1].h;
        }
    }

    fn try_reduce(&mut self) {
        debug_assert!(self.bhstart < self.bhend);
        if self.bhend - self.bhstart < 2 {
            return;
        }
        if self.reduce_border >= self.fixed_size.unwrap_or(self.total_size) {
            // The initial block-size guess would still select this or a
            // smaller block size.
            return;
        }
        if self.bh[self.bhstart + 1].dindex < SPAMSUM_LENGTH / 2 {
            // The guess adjustment would walk back down to this block size.
            return;
        }
        self.bhstart += 1;
        self.reduce_border *= 2;
        self.rollmask = self.rollmask.wrapping_mul(2).wrapping_add(1);
        debug_log!(
            Engine,
            1,
            "retired block size below {}",
            block_size(self.bhstart)
        );
    }

    fn step(&mut self, c: u8) {
        // Update the rolling hash and every active block accumulator; when
        // the rolling value hits a reset point, emit one character per
        // matching block size and restart those accumulators.
        self.roll.feed(c);
        let horg = self.roll.sum().wrapping_add(1);
        let mut h = horg / MIN_BLOCKSIZE;

        for slot in &mut self.bh[self.bhstart..self.bhend] {
            slot.h = sum_hash(c, slot.h);
            slot.halfh = sum_hash(c, slot.halfh);
        }
        if self.need_lasthash {
            self.lasth = sum_hash(c, self.lasth);
        }

        // 0xffffffff is not -1 modulo 3, so the +1 above cannot alias a
        // boundary; a zero here means the raw sum was the all-ones value.
        if horg == 0 {
            return;
        }
        // With growing block size almost every position fails this test.
        if h & self.rollmask != 0 {
            return;
        }
        // Delay the modulo until the cheap mask has passed.
        if horg % MIN_BLOCKSIZE != 0 {
            return;
        }
        h >>= self.bhstart;

        let mut i = self.bhstart;
        loop {
            if self.bh[i].dindex == 0 {
                // First character at this block size; activate the next
                // hypothesis. Can only happen NUM_BLOCKHASHES - 1 times.
                self.try_fork();
            }
            let slot = &mut self.bh[i];
            slot.digest[slot.dindex] = B64[usize::from(slot.h)];
            slot.halfdigest = B64[usize::from(slot.halfh)];
            if slot.dindex < SPAMSUM_LENGTH - 1 {
                slot.dindex += 1;
                slot.digest[slot.dindex] = 0;
                slot.h = HASH_INIT;
                if slot.dindex < SPAMSUM_LENGTH / 2 {
                    slot.halfh = HASH_INIT;
                    slot.halfdigest = 0;
                }
            } else {
                // The last slot keeps absorbing characters instead of being
                // reset, which folds the tail of the input into one piece.
                self.try_reduce();
            }
            if h & 1 != 0 {
                break;
            }
            h >>= 1;
            i += 1;
            if i >= self.bhend {
                break;
            }
        }
    }

    /// Renders the signature for everything consumed so far.
    ///
    /// The state is not consumed; callers may keep updating it and render
    /// again later, or clone it first to keep an intermediate signature.
    ///
    /// # Errors
    ///
    /// [`FuzzyError::InputTooLarge`] when more than [`MAX_INPUT_SIZE`] bytes
    /// were consumed, and [`FuzzyError::FixedLengthMismatch`] when a
    /// declared length does not match the bytes actually hashed.
    pub fn digest(&self, flags: DigestFlags) -> Result<String, FuzzyError> {
        let h = self.roll.sum();
        if self.total_size > MAX_INPUT_SIZE {
            return Err(FuzzyError::InputTooLarge {
                size: self.total_size,
            });
        }
        if let Some(declared) = self.fixed_size {
            if declared != self.total_size {
                return Err(FuzzyError::FixedLengthMismatch {
                    declared,
                    actual: self.total_size,
                });
            }
        }

        // Initial guess from the total length, clamped to what is active,
        // then walked back down while the digest is too short to be useful.
        let mut bi = self.bhstart;
        while block_size(bi) * (SPAMSUM_LENGTH as u64) < self.total_size {
            bi += 1;
        }
        if bi >= self.bhend {
            bi = self.bhend - 1;
        }
        while bi > self.bhstart && self.bh[bi].dindex < SPAMSUM_LENGTH / 2 {
            bi -= 1;
        }
        debug_assert!(bi == self.bhstart || self.bh[bi].dindex >= SPAMSUM_LENGTH / 2);
        debug_log!(Engine, 1, "selected block size {}", block_size(bi));

        let eliminate = flags.eliminates_sequences();
        let mut out = String::with_capacity(SPAMSUM_LENGTH * 2 + 16);
        out.push_str(&block_size(bi).to_string());
        out.push(':');

        let slot = &self.bh[bi];
        let copied = append_piece(&mut out, &slot.digest[..slot.dindex], eliminate);
        if h != 0 {
            append_tail_char(&mut out, B64[usize::from(slot.h)], copied, eliminate);
        } else if slot.digest[slot.dindex] != 0 {
            // The final slot still holds the last character emitted at the
            // length cap.
            append_tail_char(&mut out, slot.digest[slot.dindex], copied, eliminate);
        }
        out.push(':');

        if bi < self.bhend - 1 {
            let slot = &self.bh[bi + 1];
            let mut take = slot.dindex;
            if !flags.is_untruncated() && take > SPAMSUM_LENGTH / 2 - 1 {
                take = SPAMSUM_LENGTH / 2 - 1;
            }
            let copied = append_piece(&mut out, &slot.digest[..take], eliminate);
            if h != 0 {
                let tail = if flags.is_untruncated() {
                    slot.h
                } else {
                    slot.halfh
                };
                append_tail_char(&mut out, B64[usize::from(tail)], copied, eliminate);
            } else {
                let tail = if flags.is_untruncated() {
                    slot.digest[slot.dindex]
                } else {
                    slot.halfdigest
                };
                if tail != 0 {
                    append_tail_char(&mut out, tail, copied, eliminate);
                }
            }
        } else if h != 0 {
            debug_assert!(bi == 0 || bi == NUM_BLOCKHASHES - 1);
            // A one-character piece cannot form a run, so the elimination
            // flag is irrelevant here.
            if bi == 0 {
                out.push(char::from(B64[usize::from(self.bh[0].h)]));
            } else {
                out.push(char::from(B64[usize::from(self.lasth)]));
            }
        }

        Ok(out)
    }

    /// Hashes a complete in-memory buffer.
    ///
    /// # Errors
    ///
    /// [`FuzzyError::InputTooLarge`] when the buffer exceeds
    /// [`MAX_INPUT_SIZE`].
    pub fn hash_bytes(buffer: &[u8]) -> Result<String, FuzzyError> {
        let mut hasher = Self::new();
        hasher.set_fixed_length(buffer.len() as u64)?;
        hasher.update(buffer);
        hasher.digest(DigestFlags::new())
    }

    /// Hashes everything a reader yields.
    ///
    /// # Errors
    ///
    /// Propagates reader errors; engine overflow surfaces as
    /// [`io::ErrorKind::Other`].
    pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
        let mut hasher = Self::new();
        let mut buffer = [0u8; 4096];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        hasher.digest(DigestFlags::new()).map_err(io::Error::other)
    }

    /// Opens and hashes a file, declaring its length up front.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors; engine overflow surfaces as
    /// [`io::ErrorKind::Other`].
    pub fn hash_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
        let mut file = File::open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        let mut hasher = Self::new();
        hasher.set_fixed_length(len).map_err(io::Error::other)?;
        let mut buffer = [0u8; 4096];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        hasher.digest(DigestFlags::new()).map_err(io::Error::other)
    }
}

/// Copies a digest piece, optionally refusing to extend runs of three.
///
/// Returns the number of characters appended. The first three characters of
/// a piece always copy through; afterwards a character equal to the three
/// most recently emitted ones is dropped.
fn append_piece(out: &mut String, src: &[u8], eliminate: bool) -> usize {
    let start = out.len();
    for &ch in src {
        if eliminate && out.len() - start >= 3 {
            let tail = out.as_bytes();
            let n = tail.len();
            if tail[n - 1] == ch && tail[n - 2] == ch && tail[n - 3] == ch {
                continue;
            }
        }
        out.push(char::from(ch));
    }
    out.len() - start
}

/// Appends the trailing character of a piece under the same run rule.
///
/// `copied` is the rendered length of the piece so far; with fewer than
/// three characters no run is possible and the character always lands.
fn append_tail_char(out: &mut String, ch: u8, copied: usize, eliminate: bool) {
    if eliminate && copied >= 3 {
        let tail = out.as_bytes();
        let n = tail.len();
        if tail[n - 1] == ch && tail[n - 2] == ch && tail[n - 3] == ch {
            return;
        }
    }
    out.push(char::from(ch));
}

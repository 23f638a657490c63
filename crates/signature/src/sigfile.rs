use std::io::{self, BufRead, Write};

use memchr::memchr;

use crate::error::SignatureError;
use crate::signature::Signature;

/// Header written at the top of every signature file.
pub const HEADER_V1_1: &str = "ssdeep,1.1--blocksize:hash:hash,filename";

/// Legacy header still accepted on read.
pub const HEADER_V1_0: &str = "ssdeep,1.0--blocksize:hash:hash,filename";

/// One line of a signature file.
#[derive(Clone, Debug)]
pub struct SigFileEntry {
    /// The parsed signature.
    pub signature: Signature,
    /// The signature exactly as it appeared on the line.
    pub raw: String,
    /// The unquoted, unescaped filename.
    pub filename: String,
}

/// Streaming reader for files of known signatures.
///
/// The constructor consumes and validates the header line; afterwards the
/// reader yields one [`SigFileEntry`] per line. Lines may end in `\n` or
/// `\r\n`; blank lines are skipped.
///
/// # Examples
///
/// ```
/// use signature::SigFileReader;
///
/// let file = "ssdeep,1.1--blocksize:hash:hash,filename\n3:aBn:aB,\"hello.txt\"\n";
/// let mut reader = SigFileReader::new(file.as_bytes()).unwrap();
/// let entry = reader.next().unwrap().unwrap();
/// assert_eq!(entry.filename, "hello.txt");
/// assert_eq!(entry.raw, "3:aBn:aB");
/// ```
#[derive(Debug)]
pub struct SigFileReader<R> {
    reader: R,
    line: u64,
}

impl<R: BufRead> SigFileReader<R> {
    /// Wraps a buffered reader, consuming the header line.
    ///
    /// # Errors
    ///
    /// [`SignatureError::InvalidHeader`] when the first line is neither the
    /// current nor the legacy header; [`SignatureError::Io`] on read
    /// failures.
    pub fn new(reader: R) -> Result<Self, SignatureError> {
        let mut this = Self { reader, line: 0 };
        let header = this
            .read_line()?
            .ok_or_else(|| SignatureError::InvalidHeader {
                found: String::new(),
            })?;
        if header != HEADER_V1_1 && header != HEADER_V1_0 {
            return Err(SignatureError::InvalidHeader { found: header });
        }
        Ok(this)
    }

    fn read_line(&mut self) -> Result<Option<String>, SignatureError> {
        let mut buffer = String::new();
        let n = self.reader.read_line(&mut buffer)?;
        if n == 0 {
            return Ok(None);
        }
        self.line += 1;
        while buffer.ends_with('\n') || buffer.ends_with('\r') {
            buffer.pop();
        }
        Ok(Some(buffer))
    }

    fn parse_entry(&self, text: &str) -> Result<SigFileEntry, SignatureError> {
        let comma = memchr(b',', text.as_bytes()).ok_or(SignatureError::UnquotedFilename {
            line: self.line,
        })?;
        let raw = &text[..comma];
        let quoted = &text[comma + 1..];
        if !quoted.starts_with('"') || !quoted.ends_with('"') || quoted.len() < 2 {
            return Err(SignatureError::UnquotedFilename { line: self.line });
        }
        let filename = unescape_filename(&quoted[1..quoted.len() - 1]);
        let signature = Signature::parse(raw).map_err(|source| SignatureError::MalformedEntry {
            line: self.line,
            source: Box::new(source),
        })?;
        Ok(SigFileEntry {
            signature,
            raw: raw.to_owned(),
            filename,
        })
    }
}

impl<R: BufRead> Iterator for SigFileReader<R> {
    type Item = Result<SigFileEntry, SignatureError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_line() {
                Err(err) => return Some(Err(err)),
                Ok(None) => return None,
                Ok(Some(line)) if line.is_empty() => {}
                Ok(Some(line)) => return Some(self.parse_entry(&line)),
            }
        }
    }
}

fn unescape_filename(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_filename(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for ch in filename.chars() {
        if ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Writer producing the signature-file format.
///
/// The header is emitted lazily before the first entry, so a run that hashes
/// nothing produces an empty file rather than a lone header.
#[derive(Debug)]
pub struct SigFileWriter<W> {
    writer: W,
    header_written: bool,
}

impl<W: Write> SigFileWriter<W> {
    /// Wraps a writer; nothing is emitted yet.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    /// Writes one `signature,"filename"` line, quoting and escaping the
    /// filename.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn write_entry(&mut self, signature: &str, filename: &str) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{HEADER_V1_1}")?;
            self.header_written = true;
        }
        writeln!(self.writer, "{signature},\"{}\"", escape_filename(filename))
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

use std::io::{self, Write};
use std::path::Path;

use matching::Filedata;

/// How filenames appear in output.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NameStyle {
    pub barename: bool,
    pub relative: bool,
}

/// Renders a path for display according to the selected style.
///
/// The default mirrors the classic tool: arguments become absolute paths
/// without resolving symlinks, so hashes of files reached through links
/// keep the name the user gave. `-l` keeps paths as typed and `-b` strips
/// everything but the final component.
pub(crate) fn display_name(path: &Path, style: NameStyle) -> String {
    if style.barename {
        return path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            });
    }
    if style.relative {
        return path.display().to_string();
    }
    std::path::absolute(path).map_or_else(|_| path.display().to_string(), |absolute| {
        absolute.display().to_string()
    })
}

fn quoted(name: &str) -> String {
    name.replace('"', "\\\"")
}

/// Writes one match line in either plain or CSV form.
///
/// Plain form: `[origin:]probe matches [origin:]known (score)`, where the
/// origin prefix names the signature file an entry was loaded from.
pub(crate) fn print_match<W: Write>(
    out: &mut W,
    probe: &Filedata,
    known: &Filedata,
    score: u32,
    csv: bool,
) -> io::Result<()> {
    if csv {
        return writeln!(
            out,
            "\"{}\",\"{}\",{score}",
            quoted(probe.filename()),
            quoted(known.filename())
        );
    }
    if let Some(origin) = probe.match_file() {
        write!(out, "{origin}:")?;
    }
    write!(out, "{} matches ", probe.filename())?;
    if let Some(origin) = known.match_file() {
        write!(out, "{origin}:")?;
    }
    writeln!(out, "{} ({score})", known.filename())
}

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use ctph::FuzzyHasher;
use logging::{error_log, info_log};
use matching::{ClusterSet, Filedata, MatchIndex, ScanOptions, compare_signatures};
use signature::{SigFileReader, SigFileWriter};
use walk::{WalkOptions, Walker};

use crate::options::{Mode, ParsedArgs};
use crate::output::{NameStyle, display_name, print_match};

pub(crate) fn run_parsed<Out, Err>(parsed: &ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let mut config = logging::VerbosityConfig::from_verbose_level(parsed.verbose);
    config.silent = parsed.silent;
    logging::init(config);

    if parsed.show_version {
        let _ = writeln!(stdout, "{}", env!("CARGO_PKG_VERSION"));
        return 0;
    }
    if let Err(message) = crate::options::validate(parsed) {
        let _ = writeln!(stderr, "rfuzzy: {message}");
        let _ = writeln!(stderr, "Try `rfuzzy --help` for more information");
        return 1;
    }

    let outcome = match parsed.mode {
        Mode::Hash => run_hash(parsed, stdout),
        Mode::Match => run_match(parsed, stdout),
        Mode::Directory => run_directory(parsed, stdout),
        Mode::Pretty => run_pretty(parsed, stdout),
        Mode::Cluster => run_cluster(parsed, stdout),
        Mode::SigCompare => run_sigcompare(parsed, stdout),
        Mode::CompareUnknown => run_compare_unknown(parsed, stdout),
    };
    match outcome {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(stderr, "rfuzzy: {err}");
            1
        }
    }
}

fn name_style(parsed: &ParsedArgs) -> NameStyle {
    NameStyle {
        barename: parsed.barename,
        relative: parsed.relative,
    }
}

fn scan_options(parsed: &ParsedArgs, skip_identical: bool) -> ScanOptions {
    ScanOptions {
        threshold: parsed.threshold,
        display_all: parsed.display_all,
        skip_identical,
    }
}

/// Walks every positional argument, invoking `visit` per regular file.
fn for_each_input<F: FnMut(&Path)>(parsed: &ParsedArgs, visit: &mut F) {
    let mut walker = Walker::new(WalkOptions {
        recursive: parsed.recursive,
    });
    for argument in &parsed.files {
        let cleaned = walk::clean_path(argument);
        walker.walk(Path::new(&cleaned), visit);
    }
}

/// Hashes one file, reporting failures through the logging layer.
fn hash_one(path: &Path) -> Option<String> {
    info_log!(Hash, 1, "hashing {}", path.display());
    match FuzzyHasher::hash_file(path) {
        Ok(sig) => Some(sig),
        Err(err) => {
            error_log!("{}: {err}", path.display());
            None
        }
    }
}

/// Loads every `-m`/`-k` file into the index. Returns how many opened.
fn load_knowns(files: &[String], index: &mut MatchIndex) -> usize {
    let mut opened = 0;
    for name in files {
        let file = match File::open(name) {
            Ok(file) => file,
            Err(err) => {
                error_log!("{name}: {err}");
                continue;
            }
        };
        match SigFileReader::new(BufReader::new(file)) {
            Ok(reader) => {
                opened += 1;
                if let Err(err) = index.load(reader, name) {
                    error_log!("{name}: {err}");
                }
            }
            Err(err) => error_log!("{name}: {err}"),
        }
    }
    opened
}

/// Default mode: print a signature file for the inputs.
fn run_hash<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let style = name_style(parsed);
    let mut writer = SigFileWriter::new(&mut *stdout);
    let mut write_error = None;
    for_each_input(parsed, &mut |path| {
        if let Some(sig) = hash_one(path) {
            let name = display_name(path, style);
            if let Err(err) = writer.write_entry(&sig, &name) {
                write_error.get_or_insert(err);
            }
        }
    });
    match write_error {
        Some(err) => Err(err),
        None => Ok(0),
    }
}

/// `-m`: hash inputs and report matches against the loaded knowns.
fn run_match<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let mut index = MatchIndex::new();
    if load_knowns(&parsed.match_files, &mut index) == 0 {
        return Err(io::Error::other("no matching files loaded"));
    }
    let style = name_style(parsed);
    let options = scan_options(parsed, false);
    let mut failure = None;
    for_each_input(parsed, &mut |path| {
        let Some(sig) = hash_one(path) else { return };
        let probe = match Filedata::new(&sig, &display_name(path, style)) {
            Ok(probe) => probe,
            Err(err) => {
                error_log!("{}: {err}", path.display());
                return;
            }
        };
        for result in index.scan(&probe, options) {
            let known = &index.entries()[result.index];
            if let Err(err) = print_match(stdout, &probe, known, result.score, parsed.csv) {
                failure.get_or_insert(err);
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(0),
    }
}

/// `-d`: compare every file against everything seen before it.
fn run_directory<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let mut index = MatchIndex::new();
    let style = name_style(parsed);
    let options = scan_options(parsed, false);
    let mut failure = None;
    for_each_input(parsed, &mut |path| {
        let Some(sig) = hash_one(path) else { return };
        let probe = match Filedata::new(&sig, &display_name(path, style)) {
            Ok(probe) => probe,
            Err(err) => {
                error_log!("{}: {err}", path.display());
                return;
            }
        };
        for result in index.scan(&probe, options) {
            let known = &index.entries()[result.index];
            if let Err(err) = print_match(stdout, &probe, known, result.score, parsed.csv) {
                failure.get_or_insert(err);
            }
        }
        index.add(probe);
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(0),
    }
}

/// Collects signatures for every input file into an index.
fn collect_inputs(parsed: &ParsedArgs) -> MatchIndex {
    let mut index = MatchIndex::new();
    let style = name_style(parsed);
    for_each_input(parsed, &mut |path| {
        let Some(sig) = hash_one(path) else { return };
        match Filedata::new(&sig, &display_name(path, style)) {
            Ok(entry) => {
                index.add(entry);
            }
            Err(err) => error_log!("{}: {err}", path.display()),
        }
    });
    index
}

/// Prints all pairwise matches of `index` in pretty style.
fn print_all_pairs<Out: Write>(
    index: &MatchIndex,
    parsed: &ParsedArgs,
    stdout: &mut Out,
) -> io::Result<()> {
    let options = scan_options(parsed, true);
    for probe in index.entries() {
        let results = index.scan(probe, options);
        for result in &results {
            let known = &index.entries()[result.index];
            print_match(stdout, probe, known, result.score, parsed.csv)?;
        }
        if !results.is_empty() && !parsed.csv {
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// `-p`: hash everything, then print all pairwise matches.
fn run_pretty<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let index = collect_inputs(parsed);
    print_all_pairs(&index, parsed, stdout)?;
    Ok(0)
}

/// `-g`: hash everything, union matching pairs, print the groups.
fn run_cluster<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let index = collect_inputs(parsed);
    let mut clusters = ClusterSet::new();
    for _ in 0..index.len() {
        clusters.add();
    }
    for (i, probe) in index.entries().iter().enumerate() {
        for (j, known) in index.entries().iter().enumerate().skip(i + 1) {
            let score = compare_signatures(probe.signature(), known.signature());
            if score > parsed.threshold {
                info_log!(Match, 1, "{} ~ {} ({score})", probe.filename(), known.filename());
                clusters.join(i, j);
            }
        }
    }
    let mut first = true;
    for group in clusters.groups() {
        if !first {
            writeln!(stdout)?;
        }
        first = false;
        for member in group {
            writeln!(stdout, "{}", index.entries()[member].filename())?;
        }
    }
    Ok(0)
}

/// `-x`: positional arguments are signature files; compare their entries
/// against each other.
fn run_sigcompare<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let mut index = MatchIndex::new();
    if load_knowns(&parsed.files, &mut index) == 0 {
        return Err(io::Error::other("no matching files loaded"));
    }
    print_all_pairs(&index, parsed, stdout)?;
    Ok(0)
}

/// `-k`: compare entries of positional signature files against the knowns.
fn run_compare_unknown<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> io::Result<i32> {
    let mut knowns = MatchIndex::new();
    if load_knowns(&parsed.match_files, &mut knowns) == 0 {
        return Err(io::Error::other("no matching files loaded"));
    }
    let options = scan_options(parsed, false);
    let mut failure = None;
    for name in &parsed.files {
        let mut probes = MatchIndex::new();
        if load_knowns(std::slice::from_ref(name), &mut probes) == 0 {
            continue;
        }
        for probe in probes.entries() {
            for result in knowns.scan(probe, options) {
                let known = &knowns.entries()[result.index];
                if let Err(err) = print_match(stdout, probe, known, result.score, parsed.csv) {
                    failure.get_or_insert(err);
                }
            }
        }
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(0),
    }
}

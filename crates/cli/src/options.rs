use std::ffi::OsString;

use clap::{Arg, ArgAction, Command, value_parser};

/// Which top-level operation the invocation selects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// Hash files and print signatures (the default).
    Hash,
    /// Match files against known signatures (`-m`).
    Match,
    /// Match every file against all files seen before it (`-d`).
    Directory,
    /// Collect everything, then print all pairwise matches (`-p`).
    Pretty,
    /// Collect everything, then print clusters of matches (`-g`).
    Cluster,
    /// Treat the positional arguments as signature files and compare their
    /// entries against each other (`-x`).
    SigCompare,
    /// Compare entries of positional signature files against the knowns
    /// loaded with `-k`.
    CompareUnknown,
}

/// Everything the front-end needs to run one invocation.
#[derive(Clone, Debug)]
pub(crate) struct ParsedArgs {
    pub mode: Mode,
    pub files: Vec<String>,
    pub match_files: Vec<String>,
    pub verbose: u8,
    pub silent: bool,
    pub recursive: bool,
    pub csv: bool,
    pub display_all: bool,
    pub barename: bool,
    pub relative: bool,
    pub threshold: u32,
    pub show_version: bool,
}

pub(crate) fn command() -> Command {
    Command::new("rfuzzy")
        .about("Compute and match context-triggered piecewise (fuzzy) hashes")
        .override_usage("rfuzzy [-v|-V|-h] [-m|-k FILE] [-dpgrsablcx] [-t NUM] [FILES]...")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Verbose mode; repeat for more detail"),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .action(ArgAction::SetTrue)
                .help("Silent mode; suppress all error messages"),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .action(ArgAction::SetTrue)
                .help("Recursive mode"),
        )
        .arg(
            Arg::new("directory")
                .short('d')
                .long("directory")
                .action(ArgAction::SetTrue)
                .help("Directory mode; compare all files in a directory"),
        )
        .arg(
            Arg::new("pretty")
                .short('p')
                .long("pretty")
                .action(ArgAction::SetTrue)
                .conflicts_with("directory")
                .help("Pretty matching mode; like -d but includes all matches"),
        )
        .arg(
            Arg::new("group")
                .short('g')
                .long("group")
                .action(ArgAction::SetTrue)
                .help("Cluster matches together"),
        )
        .arg(
            Arg::new("csv")
                .short('c')
                .long("csv")
                .action(ArgAction::SetTrue)
                .help("Print matches in CSV format"),
        )
        .arg(
            Arg::new("display-all")
                .short('a')
                .long("display-all")
                .action(ArgAction::SetTrue)
                .help("Display all matches regardless of score"),
        )
        .arg(
            Arg::new("sigcompare")
                .short('x')
                .long("sigcompare")
                .action(ArgAction::SetTrue)
                .help("Compare FILES as signature files, not files to be hashed"),
        )
        .arg(
            Arg::new("known")
                .short('k')
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("Match signatures in FILES against signatures in this file"),
        )
        .arg(
            Arg::new("match")
                .short('m')
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("Match FILES against known hashes in this file"),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("NUM")
                .value_parser(value_parser!(u32).range(0..=100))
                .default_value("0")
                .help("Only display matches above this threshold"),
        )
        .arg(
            Arg::new("barename")
                .short('b')
                .long("barename")
                .action(ArgAction::SetTrue)
                .help("Use only the bare name of files; all path information omitted"),
        )
        .arg(
            Arg::new("relative")
                .short('l')
                .long("relative")
                .action(ArgAction::SetTrue)
                .conflicts_with("barename")
                .help("Use relative paths for filenames"),
        )
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Display version number and exit"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .num_args(0..)
                .help("Files or directories to hash, or signature files with -x/-k"),
        )
}

pub(crate) fn parse<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let mut matches = command().try_get_matches_from(arguments)?;

    let match_files_k: Vec<String> = matches
        .remove_many::<String>("known")
        .map(Iterator::collect)
        .unwrap_or_default();
    let match_files_m: Vec<String> = matches
        .remove_many::<String>("match")
        .map(Iterator::collect)
        .unwrap_or_default();

    let mode = if matches.get_flag("sigcompare") {
        Mode::SigCompare
    } else if !match_files_k.is_empty() {
        Mode::CompareUnknown
    } else if matches.get_flag("pretty") {
        Mode::Pretty
    } else if matches.get_flag("group") {
        Mode::Cluster
    } else if matches.get_flag("directory") {
        Mode::Directory
    } else if !match_files_m.is_empty() {
        Mode::Match
    } else {
        Mode::Hash
    };

    Ok(ParsedArgs {
        mode,
        files: matches
            .remove_many::<String>("files")
            .map(Iterator::collect)
            .unwrap_or_default(),
        match_files: if mode == Mode::CompareUnknown {
            match_files_k
        } else {
            match_files_m
        },
        verbose: matches.get_count("verbose"),
        silent: matches.get_flag("silent"),
        recursive: matches.get_flag("recursive"),
        csv: matches.get_flag("csv"),
        display_all: matches.get_flag("display-all"),
        barename: matches.get_flag("barename"),
        relative: matches.get_flag("relative"),
        threshold: matches.remove_one::<u32>("threshold").unwrap_or(0),
        show_version: matches.get_flag("version"),
    })
}

/// The sanity checks the classic tool performs after argument parsing.
/// Unloadable `-m`/`-k` files are diagnosed later, when they are opened.
pub(crate) fn validate(parsed: &ParsedArgs) -> Result<(), String> {
    if !parsed.show_version && parsed.files.is_empty() {
        return Err("no input files".to_owned());
    }
    Ok(())
}

#![deny(unsafe_code)]

//! # Overview
//!
//! `walk` turns command-line path arguments into the ordered stream of
//! regular files the hashing layer consumes. It owns the traversal policy:
//! recursion, symlink handling, cycle detection, and the skipping of
//! special files. It never opens file contents; callers receive paths and
//! do their own I/O.
//!
//! Directory entries are visited in sorted order so repeated runs over the
//! same tree produce identical output.

use std::fs;
use std::path::{Path, PathBuf};

use logging::{error_log, info_log};
use rustc_hash::FxHashSet;

/// Traversal policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkOptions {
    /// Descend into directories. Without this, directory arguments are
    /// reported as errors, matching the classic tool behaviour.
    pub recursive: bool,
}

/// Stateful walker carrying cycle-detection bookkeeping across calls.
#[derive(Debug, Default)]
pub struct Walker {
    options: WalkOptions,
    // Canonical identities of directories on the current traversal stack;
    // re-entering one means a symlink loop.
    in_progress: FxHashSet<PathBuf>,
    errors: usize,
}

impl Walker {
    /// Creates a walker with the given policy.
    #[must_use]
    pub fn new(options: WalkOptions) -> Self {
        Self {
            options,
            in_progress: FxHashSet::default(),
            errors: 0,
        }
    }

    /// Number of paths that could not be processed so far.
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.errors
    }

    /// Processes one argument, invoking `visit` for every regular file.
    ///
    /// Failures (unreadable entries, directories without recursion,
    /// symlink cycles) are reported through the logging layer and counted;
    /// the walk continues with the next entry.
    pub fn walk<F: FnMut(&Path)>(&mut self, path: &Path, visit: &mut F) {
        self.process(path, visit);
    }

    fn process<F: FnMut(&Path)>(&mut self, path: &Path, visit: &mut F) {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                self.report(path, &err.to_string());
                return;
            }
        };
        let file_type = metadata.file_type();

        if file_type.is_dir() {
            self.enter_directory(path, visit);
            return;
        }

        if file_type.is_symlink() {
            // Classify the target before deciding; symlinks to directories
            // are where cycles come from.
            match fs::metadata(path) {
                Ok(target) if target.is_dir() => self.enter_directory(path, visit),
                Ok(target) if target.is_file() => visit(path),
                Ok(_) => {
                    info_log!(Walk, 1, "{}: skipping special file", path.display());
                }
                Err(err) => self.report(path, &err.to_string()),
            }
            return;
        }

        if file_type.is_file() {
            visit(path);
            return;
        }

        info_log!(Walk, 1, "{}: skipping special file", path.display());
    }

    fn enter_directory<F: FnMut(&Path)>(&mut self, dir: &Path, visit: &mut F) {
        if !self.options.recursive {
            self.report(dir, "is a directory");
            return;
        }

        let canonical = match dir.canonicalize() {
            Ok(canonical) => canonical,
            Err(err) => {
                self.report(dir, &err.to_string());
                return;
            }
        };
        if self.in_progress.contains(&canonical) {
            self.report(dir, "symlink creates cycle");
            return;
        }
        self.in_progress.insert(canonical.clone());
        info_log!(Walk, 1, "entering {}", dir.display());

        match fs::read_dir(dir) {
            Ok(entries) => {
                let mut paths: Vec<PathBuf> = Vec::new();
                for entry in entries {
                    match entry {
                        Ok(entry) => paths.push(entry.path()),
                        Err(err) => self.report(dir, &err.to_string()),
                    }
                }
                paths.sort_unstable();
                for path in paths {
                    self.process(&path, visit);
                }
            }
            Err(err) => self.report(dir, &err.to_string()),
        }

        self.in_progress.remove(&canonical);
    }

    fn report(&mut self, path: &Path, message: &str) {
        error_log!("{}: {message}", path.display());
        self.errors += 1;
    }
}

/// Collapses doubled separators in a user-supplied path string.
///
/// Keeps a single leading separator intact; everything else of the form
/// `//` becomes `/`.
#[must_use]
pub fn clean_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_was_separator = false;
    for ch in path.chars() {
        if ch == std::path::MAIN_SEPARATOR {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_separators_collapse() {
        assert_eq!(clean_path("a//b///c"), "a/b/c");
        assert_eq!(clean_path("/already/clean"), "/already/clean");
        assert_eq!(clean_path("//leading"), "/leading");
        assert_eq!(clean_path(""), "");
    }
}

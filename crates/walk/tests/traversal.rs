//! Traversal behaviour over real temporary directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use walk::{WalkOptions, Walker};

fn collect(walker: &mut Walker, root: &Path) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    walker.walk(root, &mut |path: &Path| seen.push(path.to_path_buf()));
    seen
}

#[test]
fn a_plain_file_is_visited_directly() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.bin");
    fs::write(&file, b"contents").unwrap();

    let mut walker = Walker::new(WalkOptions::default());
    assert_eq!(collect(&mut walker, &file), vec![file]);
    assert_eq!(walker.errors(), 0);
}

#[test]
fn directories_error_without_recursion() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"x").unwrap();

    let mut walker = Walker::new(WalkOptions::default());
    assert!(collect(&mut walker, dir.path()).is_empty());
    assert_eq!(walker.errors(), 1);
}

#[test]
fn recursive_walk_visits_files_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("zebra.bin"), b"z").unwrap();
    fs::write(dir.path().join("alpha.bin"), b"a").unwrap();
    fs::write(dir.path().join("sub/nested.bin"), b"n").unwrap();

    let mut walker = Walker::new(WalkOptions { recursive: true });
    let seen = collect(&mut walker, dir.path());
    assert_eq!(
        seen,
        vec![
            dir.path().join("alpha.bin"),
            dir.path().join("sub/nested.bin"),
            dir.path().join("zebra.bin"),
        ]
    );
    assert_eq!(walker.errors(), 0);
}

#[test]
fn missing_paths_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut walker = Walker::new(WalkOptions::default());
    assert!(collect(&mut walker, &dir.path().join("nope")).is_empty());
    assert_eq!(walker.errors(), 1);
}

#[cfg(unix)]
#[test]
fn symlink_cycles_are_detected_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/file.bin"), b"f").unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

    let mut walker = Walker::new(WalkOptions { recursive: true });
    let seen = collect(&mut walker, dir.path());
    assert_eq!(seen, vec![dir.path().join("sub/file.bin")]);
    assert_eq!(walker.errors(), 1);
}

#[cfg(unix)]
#[test]
fn symlinks_to_files_are_hashed_like_files() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("real.bin");
    fs::write(&target, b"real").unwrap();
    let link = dir.path().join("link.bin");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let mut walker = Walker::new(WalkOptions::default());
    assert_eq!(collect(&mut walker, &link), vec![link]);
    assert_eq!(walker.errors(), 0);
}

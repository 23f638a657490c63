//! End-to-end tests driving the `rfuzzy` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn rfuzzy() -> Command {
    Command::cargo_bin("rfuzzy").unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn hashing_prints_the_signature_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let hello = write_file(dir.path(), "hello.txt", b"Hello World!");

    let output = rfuzzy().arg(&hello).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ssdeep,1.1--blocksize:hash:hash,filename"
    );
    assert_eq!(lines.next().unwrap(), format!("3:aBn:aB,\"{hello}\""));
    assert_eq!(lines.next(), None);
}

#[test]
fn barename_strips_directories_from_output() {
    let dir = tempfile::tempdir().unwrap();
    let hello = write_file(dir.path(), "hello.txt", b"Hello World!");

    let output = rfuzzy().args(["-b", hello.as_str()]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("3:aBn:aB,\"hello.txt\""));
}

#[test]
fn match_mode_reports_known_files() {
    let dir = tempfile::tempdir().unwrap();
    let probe = write_file(dir.path(), "probe.bin", b"Hello World!");
    let knowns = write_file(
        dir.path(),
        "known.sig",
        b"ssdeep,1.1--blocksize:hash:hash,filename\n3:aBn:aB,\"original.bin\"\n",
    );

    let output = rfuzzy().args(["-m", knowns.as_str(), probe.as_str()]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim_end(),
        format!("{probe} matches {knowns}:original.bin (100)")
    );
}

#[test]
fn match_mode_in_csv_format() {
    let dir = tempfile::tempdir().unwrap();
    let probe = write_file(dir.path(), "probe.bin", b"Hello World!");
    let knowns = write_file(
        dir.path(),
        "known.sig",
        b"ssdeep,1.1--blocksize:hash:hash,filename\n3:aBn:aB,\"original.bin\"\n",
    );

    let output = rfuzzy()
        .args(["-m", knowns.as_str(), "-c", probe.as_str()])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end(), format!("\"{probe}\",\"original.bin\",100"));
}

#[test]
fn missing_match_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let probe = write_file(dir.path(), "probe.bin", b"Hello World!");
    let missing = dir.path().join("nope.sig").display().to_string();

    rfuzzy()
        .args(["-m", missing.as_str(), probe.as_str()])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn directory_mode_matches_duplicate_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(dir.path(), "first.bin", b"Hello World!");
    let second = write_file(dir.path(), "second.bin", b"Hello World!");

    let output = rfuzzy().args(["-d", first.as_str(), second.as_str()]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end(), format!("{second} matches {first} (100)"));
}

#[test]
fn cluster_mode_groups_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.bin", b"Hello World!");
    let b = write_file(dir.path(), "b.bin", b"Hello World!");
    let c = write_file(dir.path(), "c.bin", b"abc");

    let output = rfuzzy().args(["-g", a.as_str(), b.as_str(), c.as_str()]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end(), format!("{a}\n{b}"));
}

#[test]
fn sigcompare_mode_compares_signature_files() {
    let dir = tempfile::tempdir().unwrap();
    let left = write_file(
        dir.path(),
        "left.sig",
        b"ssdeep,1.1--blocksize:hash:hash,filename\n3:ABCDEFGHIJ:KLMNOPQRST,\"one.bin\"\n",
    );
    let right = write_file(
        dir.path(),
        "right.sig",
        b"ssdeep,1.1--blocksize:hash:hash,filename\n3:ABCDEFGHIJ:KLMNOPQRST,\"two.bin\"\n",
    );

    let output = rfuzzy().args(["-x", left.as_str(), right.as_str()]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(&format!("{left}:one.bin matches {right}:two.bin (100)")));
    assert!(stdout.contains(&format!("{right}:two.bin matches {left}:one.bin (100)")));
}

#[test]
fn recursive_mode_hashes_a_tree() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    write_file(dir.path(), "top.txt", b"Hello World!");
    write_file(&dir.path().join("sub"), "inner.txt", b"abc");

    let root = dir.path().display().to_string();
    let output = rfuzzy().args(["-r", root.as_str()]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("3:uG:uG"));
    assert!(stdout.contains("3:aBn:aB"));
}

#[test]
fn directories_without_recursion_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"Hello World!");

    let output = rfuzzy()
        .arg(dir.path().display().to_string())
        .output()
        .unwrap();
    // The classic tool reports the directory on stderr and exits cleanly.
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("is a directory"));
    assert!(output.stdout.is_empty());
}

#[test]
fn silent_mode_suppresses_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin").display().to_string();

    let output = rfuzzy().args(["-s", missing.as_str()]).output().unwrap();
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    assert!(output.stdout.is_empty());
}

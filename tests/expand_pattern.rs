use std::fs;
use std::path::PathBuf;

use dropbox_upload::expand::expand_pattern;

#[test]
fn matches_files_relative_to_the_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"a").unwrap();
    fs::write(dir.path().join("b.png"), b"b").unwrap();
    fs::write(dir.path().join("c.txt"), b"c").unwrap();

    let mut files = expand_pattern(dir.path(), "*.png").expect("pattern expands");
    files.sort();

    assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
}

#[test]
fn no_match_is_an_empty_list_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"a").unwrap();

    let files = expand_pattern(dir.path(), "*.zip").expect("pattern expands");
    assert!(files.is_empty());
}

#[test]
fn directories_are_not_matched() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("fake.png")).unwrap();
    fs::write(dir.path().join("real.png"), b"r").unwrap();

    let files = expand_pattern(dir.path(), "*.png").expect("pattern expands");
    assert_eq!(files, vec![PathBuf::from("real.png")]);
}

#[test]
fn recursive_patterns_reach_nested_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("nested.png"), b"n").unwrap();

    let files = expand_pattern(dir.path(), "**/*.png").expect("pattern expands");
    assert!(files.contains(&PathBuf::from("sub/nested.png")));
}

#[test]
fn malformed_pattern_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(expand_pattern(dir.path(), "[").is_err());
}

use std::fs;

use firmware_classifier::{canonicalize_or_current, default_log_filter};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");

    std::env::set_current_dir(original).expect("restore cwd");
    assert_eq!(result, expected);
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let corpus = tmp.path().join("corpus");
    fs::create_dir_all(&corpus).expect("create corpus");

    let result = canonicalize_or_current(corpus.to_str().expect("utf-8 path")).expect("resolve");
    assert_eq!(result, corpus.canonicalize().expect("canonicalize corpus"));
}

#[test]
fn canonicalize_or_current_keeps_missing_absolute_paths() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("not-yet-created");

    let result = canonicalize_or_current(missing.to_str().expect("utf-8 path")).expect("resolve");
    assert_eq!(result, missing);
}

#[test]
fn log_filter_raises_level_when_verbose() {
    assert!(default_log_filter(false).contains("birthmark_core=info"));
    assert!(default_log_filter(true).contains("birthmark_core=debug"));
    assert!(default_log_filter(true).contains("firmware_classifier=debug"));
}

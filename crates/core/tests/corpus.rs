use std::fs;
use std::io::Write;
use std::path::Path;

use birthmark_core::corpus::{read_listing, CorpusSource, DEFAULT_VERSION};
use birthmark_core::store::ClassifierConfig;
use birthmark_core::BirthmarkError;
use tempfile::tempdir;

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, body).expect("write listing");
}

fn summary(source: &CorpusSource) -> Vec<(String, String, String)> {
    source
        .discover(&ClassifierConfig::default())
        .expect("discover")
        .into_iter()
        .map(|e| (e.project, e.version, e.relative_path))
        .collect()
}

fn owned(items: &[(&str, &str, &str)]) -> Vec<(String, String, String)> {
    items.iter().map(|(p, v, r)| (p.to_string(), v.to_string(), r.to_string())).collect()
}

#[test]
fn directory_corpus_assigns_projects_and_versions() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "zephyr/v2/fw.asm", ".text\n");
    write(root, "zephyr/v1/build/deep/fw.elf.asm", ".text\n");
    write(root, "zephyr/top.asm", ".text\n");
    write(root, "zephyr/v1/readme.txt", "not a listing");
    write(root, "alpha/1.0/a.ASM", ".text\n");
    write(root, ".hidden/v1/x.asm", ".text\n");

    let source = CorpusSource::open(root).expect("open corpus");
    assert_eq!(source.root(), root);
    assert_eq!(
        summary(&source),
        owned(&[
            ("alpha", "1.0", "1.0/a.ASM"),
            ("zephyr", DEFAULT_VERSION, "top.asm"),
            ("zephyr", "v1", "v1/build/deep/fw.elf.asm"),
            ("zephyr", "v2", "v2/fw.asm"),
        ])
    );
}

#[test]
fn loading_an_entry_reads_its_text() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "proj/v1/fw.asm", ".text\nmain:\n    nop\n");

    let source = CorpusSource::open(dir.path()).expect("open");
    let entries = source.discover(&ClassifierConfig::default()).expect("discover");
    let loaded = entries[0].load().expect("load");
    assert_eq!(loaded.project, "proj");
    assert!(loaded.contents.contains("nop"));
}

#[test]
fn non_utf8_listing_is_decoded_lossily() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fw.asm");
    fs::write(&path, b".text\nmain:\n    nop \xff\xfe\n").expect("write bytes");
    let text = read_listing(&path).expect("read");
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn missing_inputs_are_input_not_found() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("absent");
    assert!(matches!(CorpusSource::open(&missing), Err(BirthmarkError::InputNotFound { .. })));

    let plain = dir.path().join("plain.txt");
    fs::write(&plain, "x").expect("write file");
    assert!(matches!(CorpusSource::open(&plain), Err(BirthmarkError::InputNotFound { .. })));

    assert!(matches!(read_listing(&missing), Err(BirthmarkError::InputNotFound { .. })));
}

fn build_zip(path: &Path, prefix: &str, files: &[(&str, &str)]) {
    let file = fs::File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, body) in files {
        zip.start_file(format!("{prefix}{name}"), options).expect("start file");
        zip.write_all(body.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

#[test]
fn archive_with_single_top_level_directory_uses_it_as_root() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("corpus.zip");
    build_zip(
        &archive,
        "firmware/",
        &[("alpha/v1/fw.asm", ".text\nmain:\n    nop\n"), ("beta/fw.asm", ".text\n")],
    );

    let source = CorpusSource::open(&archive).expect("open archive");
    assert_eq!(source.origin(), archive.as_path());
    assert!(source.root().ends_with("firmware"));
    assert_eq!(
        summary(&source),
        owned(&[("alpha", "v1", "v1/fw.asm"), ("beta", DEFAULT_VERSION, "fw.asm")])
    );
}

#[test]
fn archive_without_wrapper_directory_is_used_directly() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("corpus.zip");
    build_zip(&archive, "", &[("alpha/v1/fw.asm", ".text\n"), ("beta/v2/fw.asm", ".text\n")]);

    let source = CorpusSource::open(&archive).expect("open archive");
    let projects: Vec<String> = summary(&source).into_iter().map(|(p, _, _)| p).collect();
    assert_eq!(projects, vec!["alpha", "beta"]);
}

#[test]
fn archive_extraction_is_removed_on_drop() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("corpus.zip");
    build_zip(&archive, "corpus/", &[("alpha/v1/fw.asm", ".text\n")]);

    let source = CorpusSource::open(&archive).expect("open archive");
    let extracted = match &source {
        CorpusSource::Archive { extracted, .. } => extracted.extraction_dir().to_path_buf(),
        CorpusSource::Directory(_) => panic!("expected an archive source"),
    };
    assert!(extracted.is_dir());
    drop(source);
    assert!(!extracted.exists());
}

#[test]
fn corrupt_archive_is_an_archive_error() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("broken.zip");
    fs::write(&archive, b"definitely not a zip").expect("write");
    assert!(matches!(CorpusSource::open(&archive), Err(BirthmarkError::Archive { .. })));
}

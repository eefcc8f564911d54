//! Runs in its own test binary: it points `TMPDIR` at a private directory.

use std::fs;
use std::io::Write;
use std::path::Path;

use birthmark_core::corpus::CorpusSource;
use birthmark_core::services::ExtractionRunner;
use birthmark_core::store::ClassifierConfig;
use birthmark_core::BirthmarkError;
use tempfile::tempdir;

const LISTING: &str = ".text\nmain:\n    mov r0, r1\n    bl main\n";

fn build_zip(path: &Path, files: &[(&str, &str)]) {
    let mut zip = zip::ZipWriter::new(fs::File::create(path).expect("create zip"));
    for (name, body) in files {
        zip.start_file(format!("corpus/{name}"), zip::write::SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(body.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

fn extraction_dirs(tmp: &Path) -> Vec<String> {
    fs::read_dir(tmp)
        .expect("read tmp")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("firmware-corpus-"))
        .collect()
}

#[test]
fn archive_extraction_is_removed_on_every_exit_path() {
    let scratch = tempdir().expect("scratch dir");
    let tmp = scratch.path().join("tmp");
    fs::create_dir_all(&tmp).expect("create tmp");
    std::env::set_var("TMPDIR", &tmp);

    let good = scratch.path().join("good.zip");
    build_zip(&good, &[("alpha/v1/fw.asm", LISTING)]);
    let no_listings = scratch.path().join("no-listings.zip");
    build_zip(&no_listings, &[("alpha/v1/notes.txt", "no listings here")]);

    // Extraction lands in the redirected temp directory while the source is open.
    let source = CorpusSource::open(&good).expect("open archive");
    assert_eq!(extraction_dirs(&tmp).len(), 1);
    drop(source);
    assert!(extraction_dirs(&tmp).is_empty());

    let config = ClassifierConfig::default();
    let runner = ExtractionRunner::new(&config);

    runner.run(&good, &scratch.path().join("out")).expect("successful run");
    assert!(extraction_dirs(&tmp).is_empty());

    let err = runner.run(&no_listings, &scratch.path().join("unused")).expect_err("no listings");
    assert!(matches!(err, BirthmarkError::InputNotFound { .. }));
    assert!(extraction_dirs(&tmp).is_empty());

    // The output path is a regular file, so writing fails after every listing was parsed.
    let blocked = scratch.path().join("blocked");
    fs::write(&blocked, "not a directory").expect("write blocker");
    let err = runner.run(&good, &blocked).expect_err("unwritable output");
    assert!(matches!(err, BirthmarkError::Io { .. }));
    assert!(extraction_dirs(&tmp).is_empty());
}

// tests/discover_walk.rs

mod common;
use crate::common::builders::BatchConfigBuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::Arc;

use batchgrade::config::BatchConfig;
use batchgrade::discover::Discovery;
use batchgrade::errors::BatchError;
use batchgrade::fs::FileSystem;
use batchgrade::fs::mock::MockFileSystem;
use batchgrade::types::TraversalMode;

type TestResult = Result<(), Box<dyn Error>>;

fn discover(fs: &MockFileSystem, cfg: &BatchConfig) -> batchgrade::errors::Result<Vec<String>> {
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    Discovery::new(shared, cfg)?
        .map(|unit| unit.map(|u| u.source.to_string_lossy().replace('\\', "/")))
        .collect()
}

#[test]
fn walk_is_depth_first_in_lexical_order() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("root/b_stu/b_q1.cpp", "b");
    fs.add_file("root/c_q1_root.cpp", "c");
    fs.add_file("root/a_stu/a_q1.cpp", "a");
    fs.add_file("root/a_root_q1.cpp", "a-root");

    let found = discover(&fs, &BatchConfigBuilder::new("root").build())?;

    assert_eq!(
        found,
        vec![
            "root/a_root_q1.cpp",
            "root/a_stu/a_q1.cpp",
            "root/b_stu/b_q1.cpp",
            "root/c_q1_root.cpp",
        ]
    );
    Ok(())
}

#[test]
fn first_match_ends_its_submission_directory() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/abc/README.md", "notes");
    fs.add_file("root/abc/abc_q1.cpp", "main");
    fs.add_file("root/abc/helper_q1.cpp", "helper");
    fs.add_file("root/abc/zzz/deep_q1.cpp", "deeper");
    fs.add_file("root/def/def_q1.cpp", "main");

    let found = discover(&fs, &BatchConfigBuilder::new("root").build())?;

    assert_eq!(found, vec!["root/abc/abc_q1.cpp", "root/def/def_q1.cpp"]);
    Ok(())
}

#[test]
fn tag_filter_requires_tag_separator_and_extension() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/s1/abcq1.cpp", "");
    fs.add_file("root/s2/abc_q2.cpp", "");
    fs.add_file("root/s3/abc_q1.cpp", "");
    fs.add_file("root/s4/notes_q1.txt", "");

    let cfg = BatchConfigBuilder::new("root").question("q1").build();
    let found = discover(&fs, &cfg)?;

    assert_eq!(found, vec!["root/s3/abc_q1.cpp"]);
    Ok(())
}

#[test]
fn without_tag_any_source_file_matches() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/s1/main.cpp", "");
    fs.add_file("root/s2/abc_q2.cpp", "");
    fs.add_file("root/s3/notes.txt", "");

    let found = discover(&fs, &BatchConfigBuilder::new("root").build())?;

    assert_eq!(found, vec!["root/s1/main.cpp", "root/s2/abc_q2.cpp"]);
    Ok(())
}

#[test]
fn output_and_archive_directories_are_never_walked() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/abc/abc_q1.cpp", "");
    fs.add_file("root/bin/old_q1.cpp", "");
    fs.add_file("root/cpps/abc_q1.cpp", "");

    let found = discover(&fs, &BatchConfigBuilder::new("root").build())?;

    assert_eq!(found, vec!["root/abc/abc_q1.cpp"]);
    Ok(())
}

#[test]
fn exclude_globs_prune_subtrees() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/__MACOSX/abc/abc_q1.cpp", "");
    fs.add_file("root/abc/abc_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root").exclude("**/__MACOSX").build();
    let found = discover(&fs, &cfg)?;

    assert_eq!(found, vec!["root/abc/abc_q1.cpp"]);
    Ok(())
}

#[test]
fn flat_mode_resumes_at_first_entry_containing_student() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/aaa/aaa_q1.cpp", "");
    fs.add_file("root/bbb/bbb_q1.cpp", "");
    fs.add_file("root/ccc/ccc_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root").student("bbb").build();
    let found = discover(&fs, &cfg)?;

    assert_eq!(found, vec!["root/bbb/bbb_q1.cpp", "root/ccc/ccc_q1.cpp"]);
    Ok(())
}

#[test]
fn flat_mode_finds_student_inside_unrelated_folders() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/sub1/aaa_q1.cpp", "");
    fs.add_file("root/sub2/bbb_q1.cpp", "");
    fs.add_file("root/sub3/ccc_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root").student("bbb").build();
    let found = discover(&fs, &cfg)?;

    assert_eq!(found, vec!["root/sub2/bbb_q1.cpp", "root/sub3/ccc_q1.cpp"]);
    Ok(())
}

#[test]
fn flat_mode_missing_student_is_fatal() {
    let fs = MockFileSystem::new();
    fs.add_file("root/aaa/aaa_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root").student("zzz").build();

    match discover(&fs, &cfg) {
        Err(BatchError::StartNotFound(id)) => assert_eq!(id, "zzz"),
        other => panic!("expected StartNotFound, got {other:?}"),
    }
}

#[test]
fn student_dirs_mode_skips_everything_before_the_student() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/aaa/aaa_q1.cpp", "");
    fs.add_file("root/aaa_root_q1.cpp", "");
    fs.add_file("root/bbb/bbb_q1.cpp", "");
    fs.add_file("root/ccc/ccc_q1.cpp", "");
    fs.add_file("root/zzz_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root")
        .mode(TraversalMode::StudentDirs)
        .student("bb")
        .build();
    let found = discover(&fs, &cfg)?;

    assert_eq!(
        found,
        vec!["root/bbb/bbb_q1.cpp", "root/ccc/ccc_q1.cpp", "root/zzz_q1.cpp"]
    );
    Ok(())
}

#[test]
fn student_dirs_mode_fails_before_walking_when_student_is_missing() {
    let fs = MockFileSystem::new();
    fs.add_file("root/aaa/aaa_q1.cpp", "");
    // Only a file carries the id; student-dirs mode looks at directories.
    fs.add_file("root/zzz_q1.cpp", "");

    let cfg = BatchConfigBuilder::new("root")
        .mode(TraversalMode::StudentDirs)
        .student("zzz")
        .build();
    let shared: Arc<dyn FileSystem> = Arc::new(fs);

    assert!(matches!(
        Discovery::new(shared, &cfg),
        Err(BatchError::StartNotFound(_))
    ));
}

#[test]
fn unreadable_root_is_fatal() {
    let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
    let cfg = BatchConfigBuilder::new("missing").build();

    assert!(Discovery::new(fs, &cfg).is_err());
}

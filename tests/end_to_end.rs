// tests/end_to_end.rs
#![cfg(unix)]

mod common;
use crate::common::builders::BatchConfigBuilder;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use batchgrade::engine::Pipeline;
use batchgrade::exec::{RealProcessBackend, TerminalInput};
use batchgrade::fs::{FileSystem, RealFileSystem};
use batchgrade::layout::prepare_layout;
use batchgrade::types::StepOutcome;

type TestResult = Result<(), Box<dyn Error>>;

/// A "source file" for the `sh` compiler: invoked as
/// `sh <source> -o <output>`, it writes an executable to `<output>` that
/// appends `name` to `runs.log` in its working directory.
fn write_submission(path: &Path, name: &str) -> std::io::Result<()> {
    let script = format!(
        "cat > \"$2\" <<'EOF'\n#!/bin/sh\necho {name} >> runs.log\nEOF\nchmod +x \"$2\"\n"
    );
    fs::write(path, script)
}

#[tokio::test]
async fn every_submission_is_built_archived_and_run_in_order() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path();
    write_submission(&root.join("a_q1_x.cpp"), "a_q1_x")?;
    write_submission(&root.join("b_q1_y.cpp"), "b_q1_y")?;
    fs::write(root.join("a_q2_x.cpp"), "other question")?;

    let cfg = BatchConfigBuilder::new(&root.to_string_lossy())
        .compiler("sh")
        .question("q1")
        .times(2)
        .build();

    let real: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    prepare_layout(real.as_ref(), &cfg)?;

    let (tx, mut input) = TerminalInput::channel();
    drop(tx);

    let pipeline = Pipeline::new(Arc::new(cfg), real, Arc::new(RealProcessBackend::new()));
    let report = with_timeout(pipeline.run(&mut input)).await?;

    assert_eq!(report.unit_names(), vec!["a_q1_x.cpp", "b_q1_y.cpp"]);
    assert!(report.failures().next().is_none());
    for record in report.records() {
        assert_eq!(record.runs, vec![StepOutcome::Success; 2]);
    }

    assert_eq!(
        fs::read_to_string(root.join("runs.log"))?,
        "a_q1_x\na_q1_x\nb_q1_y\nb_q1_y\n"
    );

    assert!(root.join("bin/a_q1_x").is_file());
    assert!(root.join("bin/b_q1_y").is_file());
    assert!(!root.join("bin/a_q2_x").exists());

    assert_eq!(
        fs::read(root.join("cpps/a_q1_x.cpp"))?,
        fs::read(root.join("a_q1_x.cpp"))?
    );
    assert!(root.join("cpps/b_q1_y.cpp").is_file());
    Ok(())
}

#[tokio::test]
async fn broken_submission_does_not_stop_the_batch() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir(root.join("alice"))?;
    fs::create_dir(root.join("bob"))?;
    fs::write(root.join("alice/alice_q1.cpp"), "exit 1\n")?;
    write_submission(&root.join("bob/bob_q1.cpp"), "bob")?;

    // Left over from an earlier batch; must not run in alice's place.
    fs::create_dir(root.join("bin"))?;
    let stale = root.join("bin/alice_q1");
    fs::write(&stale, "#!/bin/sh\necho stale >> runs.log\n")?;
    fs::set_permissions(&stale, fs::Permissions::from_mode(0o755))?;

    let cfg = BatchConfigBuilder::new(&root.to_string_lossy())
        .compiler("sh")
        .question("q1")
        .strict(true)
        .build();

    let real: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    prepare_layout(real.as_ref(), &cfg)?;

    let (_tx, mut input) = TerminalInput::channel();
    let pipeline = Pipeline::new(Arc::new(cfg), real, Arc::new(RealProcessBackend::new()));
    let report = with_timeout(pipeline.run(&mut input)).await?;

    let records = report.records();
    assert_eq!(records[0].build, StepOutcome::Failed(1));
    assert!(records[0].runs.is_empty());
    assert_eq!(records[1].runs, vec![StepOutcome::Success]);

    assert_eq!(fs::read_to_string(root.join("runs.log"))?, "bob\n");
    assert!(root.join("cpps/alice_q1.cpp").is_file());
    Ok(())
}

#[tokio::test]
async fn scripted_input_groups_feed_successive_runs() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path();
    let script = "cat > \"$2\" <<'EOF'\n#!/bin/sh\nread a\nread b\necho \"$a+$b\" >> runs.log\nEOF\nchmod +x \"$2\"\n";
    fs::write(root.join("sum_q1.cpp"), script)?;

    let cfg = BatchConfigBuilder::new(&root.to_string_lossy())
        .compiler("sh")
        .inputs(&[&["90", "60"], &["135", "71"]])
        .build();
    assert_eq!(cfg.times, 2);

    let real: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    prepare_layout(real.as_ref(), &cfg)?;

    let (_tx, mut input) = TerminalInput::channel();
    let pipeline = Pipeline::new(Arc::new(cfg), real, Arc::new(RealProcessBackend::new()));
    let report = with_timeout(pipeline.run(&mut input)).await?;

    assert_eq!(report.records()[0].runs, vec![StepOutcome::Success; 2]);
    assert_eq!(fs::read_to_string(root.join("runs.log"))?, "90+60\n135+71\n");
    Ok(())
}

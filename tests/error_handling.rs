// tests/error_handling.rs

mod common;
use crate::common::*;

use std::ffi::OsString;
use std::path::Path;

use montage_workflow::errors::WorkflowError;
use montage_workflow::fs::FileSystem;
use montage_workflow::fs::mock::MockFileSystem;
use montage_workflow_test_utils::builders::diffs_table;

const CENTER: &str = "10.68 41.27";
const BANDS: &[&str] = &["dss:DSS2B:red"];

fn workflow_file_written(fs: &MockFileSystem) -> bool {
    fs.exists(Path::new(&data_file("montage-workflow.yml")))
}

#[tokio::test]
async fn existing_data_dir_is_refused_before_anything_runs() {
    let scenario = Scenario::new().with_band(&BandFixture::strip(1, "dss", 2));
    scenario.fs.add_dir(DATA_DIR);

    let outcome = scenario.run(CENTER, 0.5, BANDS).await;

    match outcome.result {
        Err(WorkflowError::WorkDirExists(dir)) => assert_eq!(dir, Path::new(DATA_DIR)),
        other => panic!("expected WorkDirExists, got {:?}", other.map(|_| ())),
    }
    assert!(outcome.log.all().is_empty());
    assert!(!workflow_file_written(&outcome.fs));
    assert!(!outcome.fs.exists(Path::new(&data_file("region.hdr"))));
}

#[tokio::test]
async fn failed_archive_search_aborts_without_workflow_file() {
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .with_runner(|r| r.failing("mArchiveList", 1))
        .run(CENTER, 0.5, BANDS)
        .await;

    match outcome.result {
        Err(WorkflowError::ToolFailed { tool, code }) => {
            assert_eq!(tool, "mArchiveList");
            assert_eq!(code, 1);
        }
        other => panic!("expected ToolFailed, got {:?}", other.map(|_| ())),
    }
    assert_eq!(outcome.log.programs(), vec!["mArchiveList"]);
    assert!(!workflow_file_written(&outcome.fs));
}

#[tokio::test]
async fn failed_tabulation_aborts() {
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .with_runner(|r| r.failing("mDAGTbls", 3))
        .run(CENTER, 0.5, BANDS)
        .await;

    assert!(matches!(
        outcome.result,
        Err(WorkflowError::ToolFailed { code: 3, .. })
    ));
    assert!(!workflow_file_written(&outcome.fs));
}

#[tokio::test]
async fn missing_reference_executable_is_reported() {
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .with_search_path(Some(OsString::from("/usr/bin:/usr/local/bin")))
        .run(CENTER, 0.5, BANDS)
        .await;

    match outcome.result {
        Err(WorkflowError::ExecutableNotFound(name)) => assert_eq!(name, "mProject"),
        other => panic!("expected ExecutableNotFound, got {:?}", other.map(|_| ())),
    }
    assert!(!outcome.fs.exists(Path::new(DATA_DIR)));
}

#[tokio::test]
async fn missing_fit_dependency_is_reported() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir(WORK_DIR);
    for tool in ["mProject", "mDiffFit", "mDiff", "mAdd"] {
        fs.add_file(format!("/opt/partial/bin/{tool}"), "#!/bin/sh\n");
    }

    let scenario = Scenario {
        runner: FakeToolRunner::new(fs.clone()),
        fs,
        config: Default::default(),
        search_path: Some(OsString::from("/opt/partial/bin")),
        mode: None,
    };
    let outcome = scenario.run(CENTER, 0.5, BANDS).await;

    match outcome.result {
        Err(WorkflowError::MissingTransformation(name)) => assert_eq!(name, "mFitplane"),
        other => panic!("expected MissingTransformation, got {:?}", other.map(|_| ())),
    }
    assert!(outcome.log.all().is_empty());
}

#[tokio::test]
async fn named_center_cannot_build_a_grid() {
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .run("M17", 0.5, BANDS)
        .await;

    assert!(matches!(outcome.result, Err(WorkflowError::ConfigError(_))));
    assert!(!outcome.fs.exists(Path::new(DATA_DIR)));
}

#[tokio::test]
async fn overlap_with_unknown_image_is_unresolved() {
    let ghost = diffs_table(&[(
        "ghost.fits".to_string(),
        "dss-0.fits".to_string(),
        "diff.000009.000000.fits".to_string(),
    )]);
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .with_runner(|r| r.with_output("mOverlaps", "1-diffs.tbl", ghost))
        .run(CENTER, 0.5, BANDS)
        .await;

    match outcome.result {
        Err(WorkflowError::UnresolvedInput { job, lfn }) => {
            assert_eq!(lfn, "pghost.fits");
            assert!(job.contains("mDiffFit"), "{job}");
        }
        other => panic!("expected UnresolvedInput, got {:?}", other.map(|_| ())),
    }
    assert!(!workflow_file_written(&outcome.fs));
}

#[tokio::test]
async fn malformed_table_is_a_table_error() {
    let outcome = Scenario::new()
        .with_band(&BandFixture::strip(1, "dss", 2))
        .with_runner(|r| r.with_output("mOverlaps", "1-diffs.tbl", "no header here\n"))
        .run(CENTER, 0.5, BANDS)
        .await;

    match outcome.result {
        Err(WorkflowError::TableError(msg)) => assert!(msg.contains("1-diffs.tbl"), "{msg}"),
        other => panic!("expected TableError, got {:?}", other.map(|_| ())),
    }
}

// tests/dry_run.rs

use clap::Parser;

use montage_workflow::cli::CliArgs;
use montage_workflow::run;

fn args(work_dir: &std::path::Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec![
        "montage-workflow".to_string(),
        "--work-dir".to_string(),
        work_dir.display().to_string(),
        "--center".to_string(),
        "10.68 41.27".to_string(),
        "--degrees".to_string(),
        "0.5".to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cli = args(
        dir.path(),
        &[
            "--band",
            "dss:DSS2B:blue",
            "--band",
            "dss:DSS2R:green",
            "--band",
            "dss:DSS2IR:red",
            "--dry-run",
        ],
    );

    run(cli).await.unwrap();
    assert!(!dir.path().join("data").exists());
}

#[tokio::test]
async fn dry_run_still_validates_bands() {
    let dir = tempfile::tempdir().unwrap();
    let cli = args(dir.path(), &["--band", "dss-DSS2B-red", "--dry-run"]);

    let err = run(cli).await.unwrap_err();
    assert!(err.to_string().contains("invalid band definition"), "{err}");
}

#[tokio::test]
async fn existing_data_dir_is_refused_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    let cli = args(dir.path(), &["--band", "dss:DSS2B:red"]);

    let err = run(cli).await.unwrap_err();
    assert!(err.to_string().contains("already exists"), "{err}");
}

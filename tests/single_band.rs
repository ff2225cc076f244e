// tests/single_band.rs

mod common;
use crate::common::*;

use std::path::PathBuf;

use montage_workflow::catalog::replica::{ARCHIVE_SITE, LOCAL_SITE};
use montage_workflow::dag::document;

fn three_image_strip() -> BandFixture {
    BandFixture::strip(1, "dss", 3)
}

#[tokio::test]
async fn one_band_registers_expected_jobs() {
    let fixture = three_image_strip();
    let (wf, _fs, log) = Scenario::new()
        .with_band(&fixture)
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    assert_eq!(wf.workflow.len(), fixture.expected_jobs());
    assert_eq!(wf.workflow.len(), 13);
    assert_eq!(wf.workflow.count_of("mProject"), 3);
    assert_eq!(wf.workflow.count_of("mDiffFit"), 2);
    assert_eq!(wf.workflow.count_of("mConcatFit"), 1);
    assert_eq!(wf.workflow.count_of("mBgModel"), 1);
    assert_eq!(wf.workflow.count_of("mBackground"), 3);
    assert_eq!(wf.workflow.count_of("mImgtbl"), 1);
    assert_eq!(wf.workflow.count_of("mAdd"), 1);
    assert_eq!(wf.workflow.count_of("mJPEG"), 1);
    assert!(wf.composite.is_none());

    assert_eq!(wf.bands.len(), 1);
    assert_eq!(wf.bands[0].jobs, 13);
    assert_eq!(wf.bands[0].images, 3);
    assert_eq!(wf.bands[0].overlaps, 2);

    assert_eq!(log.programs(), vec!["mArchiveList", "mDAGTbls", "mOverlaps"]);
}

#[tokio::test]
async fn tools_run_in_data_dir_with_expected_arguments() {
    let (_wf, _fs, log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    let search = &log.find("mArchiveList")[0];
    assert_eq!(search.cwd, PathBuf::from(DATA_DIR));
    assert_eq!(
        search.args,
        vec!["dss", "DSS2B", "10.68 41.27", "0.71", "0.71", "1-images.tbl"]
    );

    let tabulate = &log.find("mDAGTbls")[0];
    assert_eq!(
        tabulate.args,
        vec![
            "1-images.tbl",
            "region-oversized.hdr",
            "1-raw.tbl",
            "1-projected.tbl",
            "1-corrected.tbl"
        ]
    );

    let overlaps = &log.find("mOverlaps")[0];
    assert_eq!(overlaps.args, vec!["1-raw.tbl", "1-diffs.tbl"]);
}

#[tokio::test]
async fn region_headers_are_written_and_registered() {
    let (wf, fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    let region = fs.contents(data_file("region.hdr")).expect("region.hdr");
    assert!(region.contains("NAXIS1  = 1800\n"));
    assert!(region.contains("CRPIX2  = 900.500000\n"));
    assert!(region.ends_with("END\n"));

    let big = fs
        .contents(data_file("region-oversized.hdr"))
        .expect("region-oversized.hdr");
    assert!(big.contains("NAXIS2  = 4800\n"));
    assert!(big.contains("CRPIX1  = 2400.500000\n"));
    assert!(big.contains("CRVAL1  = 10.680000\n"));

    assert_eq!(wf.regions.oversized_grid.naxis, wf.regions.nominal_grid.naxis + 3000);

    let local = wf.replicas.replicas("region.hdr");
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].site, LOCAL_SITE);
    assert_eq!(local[0].pfn, "file:///work/data/region.hdr");
}

#[tokio::test]
async fn discovered_images_are_registered_at_the_archive() {
    let (wf, _fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    for name in ["dss-0.fits", "dss-1.fits", "dss-2.fits"] {
        let replicas = wf.replicas.replicas(name);
        assert_eq!(replicas.len(), 1, "{name}");
        assert_eq!(replicas[0].site, ARCHIVE_SITE);
        assert_eq!(replicas[0].pfn, BandFixture::url(name));
    }
    for name in [
        "1-images.tbl",
        "1-raw.tbl",
        "1-projected.tbl",
        "1-corrected.tbl",
        "1-stat.tbl",
    ] {
        assert!(wf.replicas.contains(name), "{name} should be registered");
    }
}

#[tokio::test]
async fn stat_table_names_match_fit_outputs() {
    let (wf, fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    let stat = read_table(&fs, "1-stat.tbl");
    let stat_names: Vec<String> = stat
        .column("stat")
        .unwrap()
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(
        stat_names,
        vec!["1-fit.000000.000001.txt", "1-fit.000001.000002.txt"]
    );

    let fit_outputs: Vec<String> = jobs_of(&wf, "mDiffFit")
        .into_iter()
        .flat_map(output_names)
        .collect();
    assert_eq!(fit_outputs, stat_names);

    // The stat table keeps the overlap columns it was derived from.
    assert_eq!(
        stat.column("diff").unwrap(),
        vec!["diff.000000.000001.fits", "diff.000001.000002.fits"]
    );
}

#[tokio::test]
async fn job_arguments_follow_montage_conventions() {
    let (wf, _fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    let project = jobs_of(&wf, "mProject")[0];
    assert_eq!(
        project.arguments(),
        ["-X", "dss-0.fits", "pdss-0.fits", "region-oversized.hdr"]
    );
    assert_eq!(input_names(project), vec!["region-oversized.hdr", "dss-0.fits"]);
    // Intermediate outputs stay on the compute site but are still registered.
    assert!(project.outputs().all(|u| !u.stage_out && u.register_replica));

    let fit = jobs_of(&wf, "mDiffFit")[0];
    assert_eq!(
        fit.arguments(),
        [
            "-d",
            "-s",
            "1-fit.000000.000001.txt",
            "pdss-0.fits",
            "pdss-1.fits",
            "1-diff.000000.000001.fits",
            "region-oversized.hdr"
        ]
    );
    assert_eq!(
        input_names(fit),
        vec![
            "pdss-0.fits",
            "pdss-0_area.fits",
            "pdss-1.fits",
            "pdss-1_area.fits",
            "region-oversized.hdr"
        ]
    );

    let concat = jobs_of(&wf, "mConcatFit")[0];
    assert_eq!(concat.arguments(), ["1-stat.tbl", "1-fits.tbl", "."]);

    let model = jobs_of(&wf, "mBgModel")[0];
    assert_eq!(
        model.arguments(),
        ["-i", "100000", "1-images.tbl", "1-fits.tbl", "1-corrections.tbl"]
    );

    let background = jobs_of(&wf, "mBackground")[2];
    assert_eq!(
        background.arguments(),
        ["-t", "pdss-2.fits", "cdss-2.fits", "1-projected.tbl", "1-corrections.tbl"]
    );

    let imgtbl = jobs_of(&wf, "mImgtbl")[0];
    assert_eq!(
        imgtbl.arguments(),
        [".", "-t", "1-corrected.tbl", "1-updated-corrected.tbl"]
    );
    assert_eq!(
        input_names(imgtbl),
        vec!["1-corrected.tbl", "cdss-0.fits", "cdss-1.fits", "cdss-2.fits"]
    );

    let add = jobs_of(&wf, "mAdd")[0];
    assert_eq!(
        add.arguments(),
        ["-e", "1-updated-corrected.tbl", "region.hdr", "1-mosaic.fits"]
    );
    assert_eq!(output_names(add), vec!["1-mosaic.fits", "1-mosaic_area.fits"]);
    assert!(add.outputs().all(|u| u.stage_out && u.register_replica));
    assert_eq!(input_names(add).len(), 2 + 2 * 3);

    let jpeg = jobs_of(&wf, "mJPEG")[0];
    assert_eq!(
        jpeg.arguments(),
        [
            "-ct",
            "0",
            "-gray",
            "1-mosaic.fits",
            "0s",
            "99.999%",
            "gaussian",
            "-out",
            "1-mosaic.jpg"
        ]
    );
    assert!(jpeg.outputs().all(|u| u.stage_out));
}

#[tokio::test]
async fn dependencies_follow_shared_files() {
    let (wf, _fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    let children = |parent: &str| -> Vec<String> {
        wf.dependencies
            .iter()
            .find(|d| d.parent == parent)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    };

    // mProject(dss-0) feeds the first fit and its background correction.
    assert_eq!(children("ID0000001"), vec!["ID0000004", "ID0000008"]);
    // mProject(dss-1) takes part in both overlaps.
    assert_eq!(children("ID0000002"), vec!["ID0000004", "ID0000005", "ID0000009"]);
    // mConcatFit -> mBgModel -> every mBackground.
    assert_eq!(children("ID0000006"), vec!["ID0000007"]);
    assert_eq!(children("ID0000007"), vec!["ID0000008", "ID0000009", "ID0000010"]);
    // mBackground -> mImgtbl and mAdd; mImgtbl -> mAdd -> mJPEG.
    assert_eq!(children("ID0000008"), vec!["ID0000011", "ID0000012"]);
    assert_eq!(children("ID0000011"), vec!["ID0000012"]);
    assert_eq!(children("ID0000012"), vec!["ID0000013"]);
    assert!(children("ID0000013").is_empty());
}

#[tokio::test]
async fn workflow_file_embeds_catalogs_and_dependencies() {
    let (wf, fs, _log) = Scenario::new()
        .with_band(&three_image_strip())
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    assert_eq!(wf.output_path, PathBuf::from(data_file("montage-workflow.yml")));
    let yaml = fs
        .contents(data_file("montage-workflow.yml"))
        .expect("workflow file");

    assert!(yaml.contains("name: montage"));
    assert!(yaml.contains("replicaCatalog:"));
    assert!(yaml.contains("transformationCatalog:"));
    assert!(yaml.contains("jobDependencies:"));
    assert!(yaml.contains("id: ID0000013"));
    assert!(yaml.contains("file:///work/data/region-oversized.hdr"));
    assert!(yaml.contains("stageOut: false"));
    assert!(!yaml.contains("registerReplica: false"));

    let rendered = document::to_yaml(&document::workflow_document(
        &wf.workflow,
        &wf.dependencies,
        Some(&wf.replicas),
        Some(&wf.transformations),
    ))
    .unwrap();
    assert_eq!(rendered, yaml);
}

#[tokio::test]
async fn band_without_overlaps_still_gets_fixed_jobs() {
    let fixture = BandFixture::new(1).with_image("lonely.fits");
    let (wf, fs, _log) = Scenario::new()
        .with_band(&fixture)
        .run("10.68 41.27", 0.2, &["dss:DSS2B:red"])
        .await
        .unwrap();

    assert_eq!(wf.workflow.len(), 7);
    assert_eq!(wf.workflow.count_of("mDiffFit"), 0);
    assert_eq!(input_names(jobs_of(&wf, "mConcatFit")[0]), vec!["1-stat.tbl"]);
    assert!(read_table(&fs, "1-stat.tbl").is_empty());
}

#[tokio::test]
async fn overlap_between_non_neighbours_is_fitted() {
    let fixture = BandFixture::new(1)
        .with_image("a.fits")
        .with_image("b.fits")
        .with_image("c.fits")
        .with_overlap(0, 2);
    let (wf, _fs, _log) = Scenario::new()
        .with_band(&fixture)
        .run("10.68 41.27", 0.5, &["dss:DSS2B:red"])
        .await
        .unwrap();

    assert_eq!(wf.workflow.len(), fixture.expected_jobs());
    let fit = jobs_of(&wf, "mDiffFit")[0];
    assert_eq!(
        &fit.arguments()[2..5],
        ["1-fit.000000.000002.txt", "pa.fits", "pc.fits"]
    );
    assert!(input_names(fit).contains(&"pc_area.fits".to_string()));
}

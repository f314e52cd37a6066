mod common;

use common::*;
use groundcheck::{OutputMode, Outcome, ReportError, ResourceKind, SampleState};

fn zoom_transcript() -> Vec<Turn> {
    vec![
        Turn::user("Where is the umbrella?"),
        Turn::assistant("focus on [10,20,40,60]"),
    ]
}

#[test]
fn end_to_end_success_sample() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "sample_1.png", (100, 100), &[[10.0, 20.0, 30.0, 40.0]]);

    let processor = SampleProcessor::new(reports.path());
    let record = make_record("sample_1.png", true, zoom_transcript());
    let source = SampleSource::in_dir(inputs.path(), "sample_1.png");

    let (path, outcome) = match processor.process(record, &source) {
        SampleOutcome::Written { path, outcome } => (path, outcome),
        other => panic!("expected a written report, got {other:?}"),
    };
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(path, reports.path().join("success").join("sample_1.pdf"));
    assert!(path.exists());
    assert!(!reports.path().join("fail").exists());

    // summary, original, gt overlay, 1 gt crop, zoom overlay, 1 zoom crop, 1 transcript page
    assert_eq!(pdf_page_count(&path), 7);

    // no temporary files left behind
    let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[test]
fn proposed_overlay_matches_ground_truth_box() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "sample_1.png", (100, 100), &[[10.0, 20.0, 30.0, 40.0]]);

    let processor = SampleProcessor::new(reports.path());
    let source = SampleSource::in_dir(inputs.path(), "sample_1.png");
    let sample = processor.load(make_record("sample_1.png", true, zoom_transcript()), &source)?;
    let annotated = processor.annotate(sample)?;

    assert_eq!(annotated.gt_boxes, vec![BoundingBox::new(10.0, 20.0, 40.0, 60.0)]);
    assert_eq!(annotated.proposed_boxes, annotated.gt_boxes);
    assert_eq!(annotated.proposed_crops.len(), 1);
    assert_eq!(annotated.proposed_crops[0].dimensions(), (30, 40));

    let overlay = &annotated.proposed_overlay;
    assert_eq!(*overlay.get_pixel(25, 20), RED);
    assert_eq!(*overlay.get_pixel(40, 40), RED);
    assert_eq!(*overlay.get_pixel(25, 60), RED);
    assert_eq!(overlay.get_pixel(25, 40), annotated.original.get_pixel(25, 40));
    assert_eq!(overlay.get_pixel(70, 70), annotated.original.get_pixel(70, 70));

    // gt overlay is green, the original is untouched
    assert_eq!(*annotated.gt_overlay.get_pixel(25, 20), GREEN);
    assert_ne!(*annotated.original.get_pixel(25, 20), RED);
    Ok(())
}

#[test]
fn failed_answers_go_to_fail_partition() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "wrong.png", (64, 48), &[[1.0, 1.0, 10.0, 10.0]]);

    let processor = SampleProcessor::new(reports.path());
    let outcome = processor.process(
        make_record("wrong.png", false, vec![Turn::assistant("no boxes here")]),
        &SampleSource::in_dir(inputs.path(), "wrong.png"),
    );

    assert_eq!(outcome.state(), SampleState::Written);
    assert!(reports.path().join("fail").join("wrong.pdf").exists());
    Ok(())
}

#[test]
fn missing_inputs_skip_the_sample() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    let processor = SampleProcessor::new(reports.path());

    let outcome = processor.process(
        make_record("absent.png", true, vec![]),
        &SampleSource::in_dir(inputs.path(), "absent.png"),
    );
    match outcome {
        SampleOutcome::Skipped(ReportError::ResourceMissing { kind, sample, .. }) => {
            assert_eq!(kind, ResourceKind::Image);
            assert_eq!(sample, "absent.png");
        }
        other => panic!("expected skip, got {other:?}"),
    }

    // image present, descriptor missing
    write_sample_files(inputs.path(), "half.png", (10, 10), &[]);
    std::fs::remove_file(inputs.path().join("half.json"))?;
    let outcome = processor.process(
        make_record("half.png", true, vec![]),
        &SampleSource::in_dir(inputs.path(), "half.png"),
    );
    assert!(matches!(
        outcome,
        SampleOutcome::Skipped(ReportError::ResourceMissing {
            kind: ResourceKind::GroundTruth,
            ..
        })
    ));

    assert_eq!(std::fs::read_dir(reports.path())?.count(), 0);
    Ok(())
}

#[test]
fn out_of_bounds_proposal_fails_without_artifact() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "small.png", (50, 50), &[[0.0, 0.0, 10.0, 10.0]]);

    let processor = SampleProcessor::new(reports.path());
    let outcome = processor.process(
        make_record("small.png", true, vec![Turn::assistant("zoom [10, 10, 500, 500]")]),
        &SampleSource::in_dir(inputs.path(), "small.png"),
    );

    assert_eq!(outcome.state(), SampleState::Failed);
    assert!(matches!(outcome, SampleOutcome::Failed(ReportError::Extraction { .. })));
    assert!(!reports.path().join("success").join("small.pdf").exists());
    Ok(())
}

#[test]
fn unwritable_destination_is_an_assembly_failure() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "blocked.png", (20, 20), &[]);
    // a plain file where the partition directory should be
    std::fs::write(reports.path().join("success"), b"not a directory")?;

    let processor = SampleProcessor::new(reports.path());
    let outcome = processor.process(
        make_record("blocked.png", true, vec![]),
        &SampleSource::in_dir(inputs.path(), "blocked.png"),
    );

    assert!(matches!(outcome, SampleOutcome::Failed(ReportError::Assembly { .. })));
    Ok(())
}

#[test]
fn asset_mode_writes_images_and_text_dump() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(
        inputs.path(),
        "assets.png",
        (80, 80),
        &[[0.0, 0.0, 20.0, 20.0], [30.0, 30.0, 10.0, 10.0]],
    );

    let processor = SampleProcessor::new(reports.path()).with_output_mode(OutputMode::WithAssets);
    let outcome = processor.process(
        make_record("assets.png", true, zoom_transcript()),
        &SampleSource::in_dir(inputs.path(), "assets.png"),
    );

    let dir = reports.path().join("success").join("assets");
    let SampleOutcome::Written { path, .. } = outcome else {
        panic!("expected a written report");
    };
    assert_eq!(path, dir.join("summary.pdf"));
    // same document as the default mode
    assert_eq!(pdf_page_count(&path), 8);

    for name in [
        "original.jpg",
        "original_with_gt_boxes.jpg",
        "original_with_zoom_boxes.jpg",
        "gt_crop_1.jpg",
        "gt_crop_2.jpg",
        "zoom_crop_1.jpg",
    ] {
        assert!(dir.join(name).exists(), "missing {name}");
    }

    let summary = std::fs::read_to_string(dir.join("summary.txt"))?;
    assert!(summary.starts_with("Image: assets.png\n"));
    assert!(summary.contains("Success!\n\nConversation:\n"));
    assert!(summary.contains("ASSISTANT: focus on [10,20,40,60]\n\n"));
    Ok(())
}

#[test]
fn failed_asset_export_removes_the_document() -> anyhow::Result<()> {
    let inputs = tempfile::TempDir::new()?;
    let reports = tempfile::TempDir::new()?;
    write_sample_files(inputs.path(), "assets.png", (80, 80), &[[0.0, 0.0, 20.0, 20.0]]);

    // a directory where the first asset should go makes that save fail
    let dir = reports.path().join("success").join("assets");
    std::fs::create_dir_all(dir.join("original.jpg"))?;

    let processor = SampleProcessor::new(reports.path()).with_output_mode(OutputMode::WithAssets);
    let outcome = processor.process(
        make_record("assets.png", true, zoom_transcript()),
        &SampleSource::in_dir(inputs.path(), "assets.png"),
    );

    assert!(matches!(outcome, SampleOutcome::Failed(ReportError::Assembly { .. })));
    assert!(!dir.join("summary.pdf").exists());
    Ok(())
}

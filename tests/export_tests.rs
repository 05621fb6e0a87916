mod common;

use common::RecordingNotifier;
use std::fs;
use tempfile::tempdir;
use tube_layout::config::Config;
use tube_layout::*;

fn sample_assignments() -> Vec<Assignment> {
    let features = vec![
        Feature::new(30, 30, 4),
        Feature::new(70, 31, 4),
        Feature::new(30, 70, 4),
    ];
    RowClusterer::default().assign(&features).unwrap()
}

#[test]
fn test_write_table_with_default_extension() {
    let dir = tempdir().unwrap();
    let exporter = TableExporter::default();

    let written = exporter.write(&sample_assignments(), &dir.path().join("layout")).unwrap();

    assert_eq!(written, dir.path().join("layout.csv"));
    let content = fs::read_to_string(&written).unwrap();
    assert_eq!(content, "row,tube\n1,1\n1,2\n2,1\n");
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.csv");
    fs::write(&path, "stale contents\n").unwrap();

    TableExporter::default().write(&sample_assignments(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("row,tube\n"));
    // Only the target remains; the temporary file was renamed into place.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_empty_assignments_never_touch_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let result = TableExporter::default().write(&[], &path);

    assert!(matches!(result, Err(PipelineError::EmptyFeatureSet)));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_write_failure_is_surfaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("layout.csv");

    let result = TableExporter::default().write(&sample_assignments(), &path);

    match result {
        Err(PipelineError::ExportWrite { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected ExportWrite, got {:?}", other),
    }
}

#[test]
fn test_pipeline_export_acknowledges_success_only() {
    let dir = tempdir().unwrap();
    let pipeline = TubeMapPipeline::new(Config::default());
    let assignments = sample_assignments();

    let mut notifier = RecordingNotifier::default();
    let mut picker = FixedDestination(Some(dir.path().join("ok")));
    let outcome = pipeline.export(&assignments, &mut picker, &mut notifier).unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: dir.path().join("ok.csv")
        }
    );
    assert_eq!(notifier.infos.len(), 1);
    assert!(notifier.infos[0].contains("2 rows, 3 tubes"));

    let mut notifier = RecordingNotifier::default();
    let outcome = pipeline
        .export(&assignments, &mut FixedDestination(None), &mut notifier)
        .unwrap();
    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert!(notifier.infos.is_empty());

    let mut notifier = RecordingNotifier::default();
    let mut picker = FixedDestination(Some(dir.path().join("missing/x.csv")));
    let result = pipeline.export(&assignments, &mut picker, &mut notifier);
    assert!(matches!(result, Err(PipelineError::ExportWrite { .. })));
    assert!(notifier.infos.is_empty());
}

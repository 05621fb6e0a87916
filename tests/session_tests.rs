mod common;

use common::synthetic_image::gray_canvas;
use opencv::core::{Mat, Vec3b, VecN};
use opencv::prelude::*;
use tempfile::tempdir;
use tube_layout::config::SessionConfig;
use tube_layout::*;

fn session_with(features: Vec<Feature>) -> EditSession {
    EditSession::new(gray_canvas(120, 80), features, SessionConfig::default())
}

fn pixel(mat: &Mat, x: i32, y: i32) -> [u8; 3] {
    let VecN(bgr) = *mat.at_2d::<Vec3b>(y, x).unwrap();
    bgr
}

#[test]
fn test_add_uses_default_radius_and_allows_overlap() {
    let mut session = session_with(vec![Feature::new(20, 20, 4)]);

    let added = session.add_feature(20, 20);
    assert_eq!(added, Feature::new(20, 20, 5));
    assert_eq!(session.features().len(), 2);
}

#[test]
fn test_add_then_remove_restores_prior_set() {
    let mut session = session_with(vec![Feature::new(10, 10, 4), Feature::new(90, 60, 3)]);
    let before = session.features().clone();

    session.add_feature(50, 40);
    let removed = session.remove_feature(50, 40);

    assert_eq!(removed, Some(Feature::new(50, 40, 5)));
    assert_eq!(session.features(), &before);
}

#[test]
fn test_remove_out_of_reach_is_noop() {
    let mut session = session_with(vec![Feature::new(10, 10, 5)]);
    let before = session.features().clone();

    // 5 + 10 px reach; (25, 10) is exactly 15 px away.
    assert!(session.remove_feature(25, 10).is_none());
    assert!(session.remove_feature(100, 70).is_none());
    assert_eq!(session.features(), &before);
    assert_eq!(session.summary().missed_removals, 2);
}

#[test]
fn test_remove_far_outside_the_image_is_noop() {
    let mut session = session_with(vec![Feature::new(10, 10, 5), Feature::new(110, 70, 4)]);
    let before = session.features().clone();

    assert!(session.remove_feature(i32::MIN, 0).is_none());
    assert!(session.remove_feature(i32::MAX, i32::MIN).is_none());
    assert!(session.apply(SessionEvent::Remove { x: i32::MIN, y: i32::MAX }));

    assert_eq!(session.features(), &before);
    assert_eq!(session.summary().missed_removals, 3);
}

#[test]
fn test_remove_takes_first_in_order_and_only_one() {
    let mut session = session_with(vec![
        Feature::new(30, 30, 4),
        Feature::new(22, 30, 4),
        Feature::new(24, 30, 4),
    ]);

    let removed = session.remove_feature(23, 30);
    assert_eq!(removed, Some(Feature::new(30, 30, 4)));
    assert_eq!(session.features().len(), 2);
}

#[test]
fn test_operations_on_empty_set() {
    let mut session = session_with(Vec::new());
    assert!(session.remove_feature(5, 5).is_none());
    session.add_feature(5, 5);
    assert!(session.remove_feature(5, 5).is_some());
    assert!(session.features().is_empty());
}

#[test]
fn test_render_draws_overlay_without_touching_source() {
    let session = session_with(vec![Feature::new(40, 40, 5)]);
    let frame = session.render().unwrap();

    // Center dot is red, outline ring is green, source stays gray.
    assert_eq!(pixel(&frame, 40, 40), [0, 0, 255]);
    assert_eq!(pixel(&frame, 45, 40), [0, 255, 0]);
    assert_eq!(pixel(&frame, 5, 5), [128, 128, 128]);
    assert_eq!(pixel(session.image(), 40, 40), [128, 128, 128]);
}

#[test]
fn test_run_applies_gestures_and_renders_each() {
    let mut session = session_with(vec![Feature::new(10, 10, 4), Feature::new(60, 10, 4)]);
    let mut surface = ScriptedSurface::new(vec![
        SessionEvent::Add { x: 100, y: 50 },
        SessionEvent::Remove { x: 11, y: 11 },
        SessionEvent::Remove { x: 300, y: 300 },
        SessionEvent::Finish,
        SessionEvent::Add { x: 1, y: 1 },
    ]);

    let summary = session.run(&mut surface).unwrap();

    assert_eq!(summary.initial, 2);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.missed_removals, 1);
    assert_eq!(summary.remaining, 2);
    // Initial frame plus one per applied gesture.
    assert_eq!(surface.frames_presented(), 4);
    assert_eq!(summary.frames, 4);
    // Gestures after Finish are never read.
    assert_eq!(surface.remaining_events(), 1);
    assert_eq!(
        session.into_features().into_vec(),
        vec![Feature::new(60, 10, 4), Feature::new(100, 50, 5)]
    );
}

#[test]
fn test_exhausted_script_finishes() {
    let mut session = session_with(vec![Feature::new(10, 10, 4)]);
    let mut surface = ScriptedSurface::default();

    let summary = session.run(&mut surface).unwrap();
    assert_eq!(summary.frames, 1);
    assert!(surface.last_frame().is_some());
}

#[test]
fn test_script_loaded_from_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edits.json");
    std::fs::write(
        &path,
        r#"[{"action": "add", "x": 3, "y": 4}, {"action": "remove", "x": 10, "y": 10}, {"action": "finish"}]"#,
    )
    .unwrap();

    let mut surface = ScriptedSurface::from_json_file(&path).unwrap();
    assert_eq!(surface.remaining_events(), 3);
    assert_eq!(surface.next_event().unwrap(), SessionEvent::Add { x: 3, y: 4 });
    assert_eq!(surface.next_event().unwrap(), SessionEvent::Remove { x: 10, y: 10 });
}

#[test]
fn test_malformed_script_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edits.json");
    std::fs::write(&path, r#"[{"action": "paint", "x": 1}]"#).unwrap();

    let result = ScriptedSurface::from_json_file(&path);
    assert!(matches!(result, Err(PipelineError::EditScript { .. })));

    let missing = ScriptedSurface::from_json_file(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(PipelineError::EditScript { .. })));
}

#[test]
fn test_save_overlay_writes_png() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("overlay.png");
    let session = session_with(vec![Feature::new(40, 40, 5)]);

    session.save_overlay(&path).unwrap();

    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (120, 80));
    assert_eq!(saved.get_pixel(40, 40).0, [255, 0, 0]);
}

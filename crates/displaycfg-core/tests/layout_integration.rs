//! Integration tests for the layout pipeline.
//!
//! These tests exercise `LayoutEngine` end-to-end against the in-memory
//! catalog and recording applier from `displaycfg_core::mock`.

use displaycfg_core::application::engine::{ApplyOutcome, ApplyPhase, EngineError, LayoutEngine};
use displaycfg_core::application::transaction::ApplyError;
use displaycfg_core::domain::device::{CatalogSnapshot, DeviceId};
use displaycfg_core::domain::frame::{Frame, Point, Size};
use displaycfg_core::domain::intent::LayoutIntent;
use displaycfg_core::domain::resolver::{resolve, resolve_grid, ResolveError};
use displaycfg_core::mock::{test_device, FailurePoint, MockCatalog, RecordingApplier};

fn placed(applier: &RecordingApplier) -> Vec<(u32, i32, i32, u32, u32)> {
    applier
        .frames()
        .into_iter()
        .map(|(id, Point { x, y }, Size { width, height })| (id.0, x, y, width, height))
        .collect()
}

// ── Worked examples ───────────────────────────────────────────────────────────

#[test]
fn test_two_by_two_wall_places_four_displays() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();
    let mut engine = LayoutEngine::new(&catalog, &mut applier);
    engine.set_columns(2);
    engine.set_rows(2);
    engine.set_resolution(1920, 1080);

    let outcome = engine.apply_layout_changes().expect("layout must apply");

    assert_eq!(outcome, ApplyOutcome::Committed { placed: 4, unplaced: vec![] });
    assert_eq!(
        placed(&applier),
        vec![
            (1, 0, 0, 1920, 1080),
            (2, 1920, 0, 1920, 1080),
            (3, 0, 1080, 1920, 1080),
            (4, 1920, 1080, 1920, 1080),
        ]
    );
    assert!(applier.committed());
}

#[test]
fn test_single_cell_grid_places_only_lowest_id() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();
    let mut engine = LayoutEngine::new(&catalog, &mut applier);
    engine.set_columns(1);
    engine.set_rows(1);
    engine.set_resolution(1920, 1080);

    let outcome = engine.apply_layout_changes().expect("layout must apply");

    assert_eq!(
        outcome,
        ApplyOutcome::Committed {
            placed: 1,
            unplaced: vec![DeviceId(2), DeviceId(3), DeviceId(4)],
        }
    );
    assert_eq!(placed(&applier), vec![(1, 0, 0, 1920, 1080)]);
}

#[test]
fn test_explicit_frame_for_absent_device_fails_without_applier_calls() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();
    let mut engine = LayoutEngine::new(&catalog, &mut applier);

    let result = engine.apply_changes(vec![Frame::new(5u32, 0, 0, 1920, 1080)]);

    assert_eq!(
        result,
        Err(EngineError::Resolve(ResolveError::UnknownDevice(DeviceId(5))))
    );
    assert!(applier.calls.is_empty(), "applier must never be invoked");
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn test_grid_placement_is_deterministic_across_shapes() {
    let snapshot = CatalogSnapshot::from_devices(
        [12u32, 4, 9, 1, 30, 7].iter().map(|&id| test_device(id, 2560, 1440)),
    );
    for (columns, rows) in [(6, 1), (1, 6), (2, 3), (3, 2), (4, 4)] {
        let mut intent = LayoutIntent::new();
        intent.set_columns(columns);
        intent.set_rows(rows);

        let (first, _) = resolve_grid(&intent, &snapshot).expect("resolve");
        let (second, _) = resolve_grid(&intent, &snapshot).expect("resolve");

        assert_eq!(first, second);
        assert_eq!(format!("{:?}", first.sorted()), format!("{:?}", second.sorted()));
    }
}

#[test]
fn test_grid_capacity_covers_first_devices_by_ascending_id() {
    let ids = [50u32, 10, 40, 20, 30];
    let snapshot = CatalogSnapshot::from_devices(ids.iter().map(|&id| test_device(id, 800, 600)));
    for (columns, rows) in [(1, 1), (2, 1), (1, 3), (2, 2)] {
        let mut intent = LayoutIntent::new();
        intent.set_columns(columns);
        intent.set_rows(rows);

        let (frames, unplaced) = resolve_grid(&intent, &snapshot).expect("resolve");

        let capacity = (columns * rows) as usize;
        let mut expected: Vec<u32> = ids.to_vec();
        expected.sort_unstable();
        let placed_ids: Vec<u32> = frames.sorted().iter().map(|f| f.device_id.0).collect();
        assert_eq!(placed_ids, expected[..capacity].to_vec());
        assert_eq!(unplaced.len(), ids.len() - capacity);
    }
}

#[test]
fn test_failure_at_any_frame_never_commits() {
    for k in 1..4 {
        let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
        let mut applier = RecordingApplier::failing_at(FailurePoint::SetFrame(k));
        let mut engine = LayoutEngine::new(&catalog, &mut applier);
        engine.set_columns(2);
        engine.set_rows(2);

        let result = engine.apply_layout_changes();

        assert!(matches!(
            result,
            Err(EngineError::Transaction(ApplyError::DeviceRejected { .. }))
        ));
        assert_eq!(engine.phase(), ApplyPhase::Cancelled);
        assert!(applier.cancelled(), "k={k}: cancel must be issued");
        assert!(!applier.committed(), "k={k}: commit must never be observed");
    }
}

#[test]
fn test_override_precedence_ignores_grid_settings() {
    let snapshot = CatalogSnapshot::from_devices((1..=4).map(|id| test_device(id, 1920, 1080)));

    let mut plain = LayoutIntent::new();
    plain.set_frame(DeviceId(3), Frame::new(3u32, 100, 100, 1024, 768));

    let mut noisy = plain.clone();
    noisy.set_columns(4);
    noisy.set_rows(3);
    noisy.set_resolution(3840, 2160);

    let a = resolve(&plain, &snapshot).expect("resolve");
    let b = resolve(&noisy, &snapshot).expect("resolve");
    assert_eq!(a.frames, b.frames);
}

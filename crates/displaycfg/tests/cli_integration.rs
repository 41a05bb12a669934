//! Integration tests for the command-line tool.
//!
//! Each test parses real argument vectors with clap and runs them through
//! `displaycfg::cli::run` against the in-memory collaborators from
//! `displaycfg_core::mock`, checking stdout, stderr, and the exit code the
//! binary would return.

use std::path::{Path, PathBuf};

use clap::Parser;
use uuid::Uuid;

use displaycfg::cli::{report_failure, run, Cli};
use displaycfg::error::EXIT_SUCCESS;
use displaycfg::infrastructure::config::{load_config, AppConfig};
use displaycfg_core::domain::device::DeviceId;
use displaycfg_core::domain::frame::{Point, Size};
use displaycfg_core::domain::intent::Persistence;
use displaycfg_core::mock::{ApplierCall, MockCatalog, RecordingApplier};

struct Invocation {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

fn invoke(
    args: &[&str],
    config: &mut AppConfig,
    config_path: &Path,
    catalog: &MockCatalog,
    applier: &mut RecordingApplier,
) -> Invocation {
    let cli = Cli::try_parse_from(std::iter::once("displaycfg").chain(args.iter().copied()))
        .expect("arguments parse");
    let mut out = Vec::new();
    let mut err = Vec::new();

    let exit_code = match run(&cli, config, config_path, catalog, applier, &mut out) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report_failure(&e, &mut out, &mut err);
            e.exit_code()
        }
    };

    Invocation {
        exit_code,
        stdout: String::from_utf8(out).expect("utf-8"),
        stderr: String::from_utf8(err).expect("utf-8"),
    }
}

fn invoke_default(args: &[&str], catalog: &MockCatalog, applier: &mut RecordingApplier) -> Invocation {
    let mut config = AppConfig::default();
    invoke(args, &mut config, Path::new("unused.toml"), catalog, applier)
}

fn temp_config_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("displaycfg_it_{}", Uuid::new_v4()))
        .join("config.toml")
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[test]
fn test_modes_for_missing_device_prints_message_and_exits_minus_one() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["--modes", "99"], &catalog, &mut applier);

    assert_eq!(result.exit_code, -1);
    assert_eq!(
        result.stdout,
        "There is no connected device with the device ID: 99\nQuery failed.\n"
    );
    assert!(applier.calls.is_empty());
}

#[test]
fn test_modes_for_connected_device_lists_modes() {
    let catalog = MockCatalog::with_ids(&[1, 2]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["-M", "1"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 0);
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("There are 3 display modes for display 1"));
    assert_eq!(lines[3], "\t1280x720 @ 60.00Hz (pixels 1280x720, id 3) usable");
}

#[test]
fn test_query_json_is_machine_readable() {
    let catalog = MockCatalog::with_ids(&[2, 1]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["--query", "--json"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 0);
    let value: serde_json::Value = serde_json::from_str(&result.stdout).expect("JSON");
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["id"], 1);
}

#[test]
fn test_query_on_failing_platform_exits_two() {
    let catalog = MockCatalog {
        should_fail: true,
        ..MockCatalog::empty()
    };
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["-Q"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 2);
    assert!(result.stderr.contains("unexpected failure"));
}

// ── Apply ─────────────────────────────────────────────────────────────────────

#[test]
fn test_grid_flags_arrange_display_wall() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(
        &["-C", "2", "-R", "2", "-S", "1920", "1080", "-P", "0"],
        &catalog,
        &mut applier,
    );

    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.is_empty());
    assert_eq!(applier.calls[1], ApplierCall::SetPersistence(Persistence::Session));
    assert_eq!(
        applier.frames(),
        vec![
            (DeviceId(1), Point { x: 0, y: 0 }, Size { width: 1920, height: 1080 }),
            (DeviceId(2), Point { x: 1920, y: 0 }, Size { width: 1920, height: 1080 }),
            (DeviceId(3), Point { x: 0, y: 1080 }, Size { width: 1920, height: 1080 }),
            (DeviceId(4), Point { x: 1920, y: 1080 }, Size { width: 1920, height: 1080 }),
        ]
    );
    assert!(applier.committed());
}

#[test]
fn test_display_for_absent_device_exits_one_without_applier_calls() {
    let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["-D", "5,0,0,1920,1080"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("there is no connected device with the device ID: 5"));
    assert!(applier.calls.is_empty());
}

#[test]
fn test_malformed_display_tuple_exits_one() {
    let catalog = MockCatalog::with_ids(&[1]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["-D", "1,0,0,1920"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.stderr, "Could not parse input display parameters.\n");
    assert!(applier.calls.is_empty());
}

#[test]
fn test_no_flags_prints_usage() {
    let catalog = MockCatalog::with_ids(&[1]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&[], &catalog, &mut applier);

    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.contains("Usage: displaycfg"));
    assert!(result.stdout.contains("--display"));
    assert!(applier.calls.is_empty());
}

// ── Saved layouts ─────────────────────────────────────────────────────────────

#[test]
fn test_save_layout_then_apply_from_config() {
    // Arrange
    let path = temp_config_path();
    let catalog = MockCatalog::with_ids(&[1, 2]);
    let mut config = AppConfig::default();

    // Act: apply two explicit frames and save them
    let mut first = RecordingApplier::new();
    let saved = invoke(
        &["-D", "1,0,0,1920,1080", "-D", "2,-1920,0,1920,1080", "--save-layout"],
        &mut config,
        &path,
        &catalog,
        &mut first,
    );

    // Assert: the file holds both frames tagged with serial numbers
    assert_eq!(saved.exit_code, 0);
    let on_disk = load_config(&path).expect("saved config loads");
    assert_eq!(on_disk.layout.displays.len(), 2);
    assert_eq!(on_disk.layout.displays[0].serial_number, Some(1001));
    assert_eq!(on_disk.layout.displays[1].x, -1920);

    // Act: re-apply from the file
    let mut reloaded = on_disk;
    let mut second = RecordingApplier::new();
    let applied = invoke(&["--from-config"], &mut reloaded, &path, &catalog, &mut second);

    // Assert: the same frames reach the applier
    assert_eq!(applied.exit_code, 0);
    assert_eq!(second.frames(), first.frames());
    assert!(second.committed());

    // Cleanup
    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

#[test]
fn test_from_config_follows_serial_when_device_id_changed() {
    // Arrange: saved under id 7, now connected as id 2 with the same serial
    let mut config: AppConfig = toml::from_str(
        r#"
[[layout.displays]]
device_id = 7
serial_number = 1002
x = 100
y = 0
width = 1920
height = 1080
"#,
    )
    .expect("config parses");
    let catalog = MockCatalog::with_ids(&[1, 2]);
    let mut applier = RecordingApplier::new();

    // Act
    let result = invoke(&["-L"], &mut config, Path::new("unused.toml"), &catalog, &mut applier);

    // Assert
    assert_eq!(result.exit_code, 0);
    assert_eq!(applier.frames()[0].0, DeviceId(2));
}

#[test]
fn test_from_config_without_saved_layout_exits_one() {
    let catalog = MockCatalog::with_ids(&[1]);
    let mut applier = RecordingApplier::new();

    let result = invoke_default(&["--from-config"], &catalog, &mut applier);

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.starts_with("no saved display layout"));
}

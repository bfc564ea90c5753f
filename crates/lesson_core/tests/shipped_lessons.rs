use std::{fs, path::PathBuf};

use lesson_core::{parse_lesson_toml, LessonController, LessonHost};
use shared::protocol::LessonEvent;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn read(relative: &str) -> String {
    fs::read_to_string(repo_root().join(relative)).expect("read repo file")
}

#[test]
fn every_shipped_lesson_validates_and_mounts() {
    let dir = repo_root().join("lessons");
    let mut seen = 0;
    for entry in fs::read_dir(&dir).expect("lessons dir") {
        let path = entry.expect("entry").path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let raw = fs::read_to_string(&path).expect("read lesson");
        let config = parse_lesson_toml(&raw)
            .unwrap_or_else(|err| panic!("{} is invalid: {err}", path.display()));
        LessonController::new(config).expect("mount");
        seen += 1;
    }
    assert!(seen >= 2, "expected shipped lessons in {}", dir.display());
}

#[test]
fn demo_replay_completes_pythagoras_practice() {
    let config = parse_lesson_toml(&read("lessons/pythagoras_practice.toml")).expect("lesson");
    let events: Vec<LessonEvent> =
        serde_json::from_str(&read("demos/pythagoras_events.json")).expect("events");

    let mut host = LessonHost::new(LessonController::new(config).expect("mount"));
    for event in events {
        host.apply(event).expect("event applies");
    }

    let snapshot = host.snapshot();
    assert_eq!(snapshot.score.correct, 4);
    assert_eq!(snapshot.score.attempted, 5);
    assert_eq!(snapshot.phase, "summary");
    assert!(snapshot.can_complete);
}

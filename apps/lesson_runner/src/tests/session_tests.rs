use super::*;

const LESSON: &str = r#"
title = "Right triangles"
scoring = true
completion = [{ rule = "score_threshold", required = 1 }, { rule = "terminal_phase" }]

[[phases]]
name = "hook"

[[phases]]
name = "practice"
exit = [{ rule = "answer_submitted" }]

[[phases]]
name = "summary"

[[examples]]
id = "hypotenuse"
steps = 2
answer = { mode = "numeric", value = 5 }
payload = { prompt = "Legs 3 and 4. Hypotenuse?", hints = ["a^2 + b^2 = c^2", "9 + 16 = 25"] }
"#;

fn host() -> TomlLessonHost {
    let config = lesson_core::parse_lesson_toml(LESSON).expect("lesson");
    mount(config).expect("mount")
}

fn run(script: &str) -> String {
    let mut host = host();
    let mut out = Vec::new();
    run_interactive(&mut host, script.as_bytes(), &mut out).expect("session");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn parses_learner_commands() {
    assert_eq!(
        parse_command("pick 2"),
        Ok(Command::Event(LessonEvent::SelectOption { position: 1 }))
    );
    assert_eq!(
        parse_command("answer  3/4 "),
        Ok(Command::Event(LessonEvent::SelectText {
            text: "3/4".into()
        }))
    );
    assert_eq!(parse_command("discover"), Ok(Command::DiscoverCurrent));
    assert_eq!(
        parse_command("discover median"),
        Ok(Command::Event(LessonEvent::MarkDiscovered {
            example_id: "median".into()
        }))
    );
    assert_eq!(
        parse_command("GOTO summary"),
        Ok(Command::Event(LessonEvent::GoToPhase {
            phase: "summary".into()
        }))
    );
    assert_eq!(parse_command("quit"), Ok(Command::Quit));
}

#[test]
fn rejects_bad_commands() {
    assert!(parse_command("").is_err());
    assert!(parse_command("pick 0").is_err());
    assert!(parse_command("seek two").is_err());
    assert!(parse_command("answer").is_err());
    assert!(parse_command("dance").is_err());
}

#[test]
fn reveals_hints_progressively() {
    let output = run("reveal\nreveal\nreveal\nquit\n");
    assert!(output.contains("- a^2 + b^2 = c^2"));
    assert!(output.contains("step 2 revealed (all steps shown)"));
    assert!(!output.contains("step 3"));
}

#[test]
fn full_walkthrough_reaches_completion() {
    let output = run(
        "next\nnext\nanswer five\nanswer 5\nsubmit\nnext\nnext\nquit\n",
    );
    assert!(output.contains("on to 'practice'"));
    assert!(output.contains("finish 'practice' first: answer submitted"));
    assert!(output.contains("not accepted: 'five' is not a number"));
    assert!(output.contains("correct!"));
    assert!(output.contains("on to 'summary'"));
    assert!(output.contains("ready to continue"));
    assert!(output.contains("this is the last phase"));
}

#[test]
fn integration_errors_are_reported_not_fatal() {
    let output = run("goto appendix\ngoto summary\nstatus\nquit\n");
    assert!(output.contains("error (UnknownPhase): unknown phase 'appendix'"));
    assert!(output.contains("error (PhaseLocked)"));
    assert!(output.contains("phase 1/3: hook"));
}

use super::*;

const QUARTILES: &str = r#"
title = "Finding quartiles"
scoring = true
completion = [
    { rule = "score_threshold", required = 2 },
    { rule = "terminal_phase" },
]

[[phases]]
name = "intro"

[[phases]]
name = "discover"
exit = [{ rule = "all_discovered" }]

[[phases]]
name = "summary"

[[examples]]
id = "median"
steps = 3
answer = { mode = "numeric", value = 7 }
payload = { data = [3, 5, 7, 9, 11] }

[[examples]]
id = "q1"
steps = 4
answer = { mode = "choice", index = 0, options = ["4", "5", "6"] }

[[examples]]
id = "range"
answer = { mode = "exact", value = "8" }
"#;

#[test]
fn parses_toml_lesson() {
    let config = parse_lesson_toml(QUARTILES).expect("valid lesson");

    assert_eq!(config.title, "Finding quartiles");
    assert_eq!(config.phases.len(), 3);
    assert_eq!(config.phases[1].exit, vec![GateRule::AllDiscovered]);
    assert_eq!(config.examples.len(), 3);
    assert_eq!(config.problem_count(), 3);
    assert!(config.discover_on_correct);
    assert_eq!(
        config.examples[0].answer,
        Some(ExpectedAnswer::Numeric {
            value: 7.0,
            tolerance: shared::domain::DEFAULT_NUMERIC_TOLERANCE
        })
    );
    assert!(config.examples[0].payload.contains_key("data"));
    assert!(config.examples[2].payload.is_empty());
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = parse_lesson_toml("phases = 3").unwrap_err();
    assert!(matches!(err, LessonError::InvalidConfig(ref message) if message.contains("malformed")));
}

#[test]
fn rejects_duplicate_phases_and_examples() {
    let dup_phase = LessonConfig::<NamedPhase, ()>::new(vec![
        NamedPhase::from("intro"),
        NamedPhase::from("intro"),
    ]);
    assert!(dup_phase.validate().is_err());

    let dup_example = LessonConfig::new(vec![NamedPhase::from("intro")])
        .with_examples(vec![Example::new("a", ()), Example::new("a", ())]);
    assert!(dup_example.validate().is_err());
}

#[test]
fn rejects_threshold_without_scoring_or_above_problem_count() {
    let base = || {
        LessonConfig::new(vec![NamedPhase::from("quiz")]).with_examples(vec![
            Example::new("a", ()).with_answer(ExpectedAnswer::numeric(1.0)),
            Example::new("b", ()).with_answer(ExpectedAnswer::numeric(2.0)),
        ])
    };

    let unscored = base().with_completion(vec![GateRule::ScoreThreshold { required: 1 }]);
    assert!(unscored.validate().is_err());

    let too_high = base()
        .with_scoring(true)
        .with_completion(vec![GateRule::ScoreThreshold { required: 3 }]);
    assert!(too_high.validate().is_err());

    let ok = base()
        .with_scoring(true)
        .with_completion(vec![GateRule::ScoreThreshold { required: 2 }]);
    assert!(ok.validate().is_ok());
}

#[test]
fn rejects_rules_that_cannot_hold() {
    let no_examples = LessonConfig::<NamedPhase, ()>::new(vec![NamedPhase::from("intro")])
        .with_completion(vec![GateRule::AllDiscovered]);
    assert!(no_examples.validate().is_err());

    let terminal_exit = LessonConfig::<NamedPhase, ()>::new(vec![
        NamedPhase::from("intro"),
        NamedPhase::from("summary"),
    ])
    .with_exit_rule(&NamedPhase::from("intro"), GateRule::TerminalPhase);
    assert!(terminal_exit.validate().is_err());
}

#[test]
fn rejects_bad_answers() {
    let out_of_range = LessonConfig::new(vec![NamedPhase::from("intro")]).with_examples(vec![
        Example::new("pick", ()).with_answer(ExpectedAnswer::choice(3, vec!["a".into()])),
    ]);
    assert!(out_of_range.validate().is_err());

    let negative_tolerance = LessonConfig::new(vec![NamedPhase::from("intro")]).with_examples(
        vec![Example::new("n", ()).with_answer(ExpectedAnswer::Numeric {
            value: 1.0,
            tolerance: -0.5,
        })],
    );
    assert!(negative_tolerance.validate().is_err());
}

#[test]
fn score_threshold_without_gradable_examples_is_rejected() {
    let raw = r#"
title = "Walkthrough"
scoring = true
completion = [{ rule = "score_threshold", required = 0 }]

[[phases]]
name = "explore"

[[examples]]
id = "demo"
steps = 2
"#;
    let err = parse_lesson_toml(raw).unwrap_err();
    assert!(matches!(err, LessonError::InvalidConfig(ref msg) if msg.contains("no example carries an answer")));
}

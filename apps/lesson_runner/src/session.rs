use std::io::{BufRead, Write};

use anyhow::Result;
use lesson_core::{EventOutcome, LessonHost, NamedLessonConfig, Transition};
use shared::{
    domain::{ExpectedAnswer, NamedPhase},
    error::LessonFault,
    protocol::LessonEvent,
};

pub type TomlLessonHost = LessonHost<NamedPhase, toml::Table>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(LessonEvent),
    DiscoverCurrent,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  pick <n>         choose option n (as listed)
  answer <text>    type an answer
  submit           check the answer
  reveal           show the next solution step
  discover [id]    mark an example (default: current) as discovered
  example          go to the next example
  seek <n>         jump to example n
  next             go to the next phase
  goto <phase>     jump to a reached phase
  reset            start the lesson step over
  status           show progress
  quit             leave";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "pick" => Command::Event(LessonEvent::SelectOption {
            position: parse_position(rest)?,
        }),
        "answer" => {
            if rest.is_empty() {
                return Err("usage: answer <text>".into());
            }
            Command::Event(LessonEvent::SelectText {
                text: rest.to_string(),
            })
        }
        "submit" | "check" => Command::Event(LessonEvent::Submit),
        "reveal" | "hint" => Command::Event(LessonEvent::Reveal),
        "discover" if rest.is_empty() => Command::DiscoverCurrent,
        "discover" => Command::Event(LessonEvent::MarkDiscovered {
            example_id: rest.into(),
        }),
        "example" => Command::Event(LessonEvent::NextExample),
        "seek" => Command::Event(LessonEvent::SeekExample {
            index: parse_position(rest)?,
        }),
        "next" | "continue" => Command::Event(LessonEvent::NextPhase),
        "goto" => {
            if rest.is_empty() {
                return Err("usage: goto <phase>".into());
            }
            Command::Event(LessonEvent::GoToPhase {
                phase: rest.to_string(),
            })
        }
        "reset" => Command::Event(LessonEvent::Reset),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => return Err("empty command".into()),
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(command)
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a number starting at 1, got '{raw}'")),
    }
}

pub fn describe_outcome(outcome: &EventOutcome<NamedPhase>) -> String {
    match outcome {
        EventOutcome::Selected { accepted: true } => "answer selected".into(),
        EventOutcome::Selected { accepted: false } => {
            "answer already checked; move on to change it".into()
        }
        EventOutcome::InputRejected { reason } => format!("not accepted: {reason}"),
        EventOutcome::Submitted(None) => "nothing to check yet".into(),
        EventOutcome::Submitted(Some(verdict)) if verdict.is_correct => "correct!".into(),
        EventOutcome::Submitted(Some(_)) => "not quite".into(),
        EventOutcome::Revealed(progress) if progress.exhausted => {
            format!("step {} revealed (all steps shown)", progress.count)
        }
        EventOutcome::Revealed(progress) => format!("step {} revealed", progress.count),
        EventOutcome::Discovered { newly: true } => "example discovered".into(),
        EventOutcome::Discovered { newly: false } => "already discovered".into(),
        EventOutcome::ExampleAdvanced(advance) if advance.done => "no more examples".into(),
        EventOutcome::ExampleAdvanced(advance) => format!("example {}", advance.index + 1),
        EventOutcome::ExampleSought { .. } => "example selected".into(),
        EventOutcome::Phase(transition) => describe_transition(transition),
        EventOutcome::Reset => "lesson step reset".into(),
    }
}

fn describe_transition(transition: &Transition<NamedPhase>) -> String {
    match transition {
        Transition::Advanced { to, .. } => format!("on to '{to}'"),
        Transition::Revisited { to, .. } => format!("back to '{to}'"),
        Transition::Stayed(phase) => format!("already in '{phase}'"),
        Transition::AtTerminal(_) => "this is the last phase".into(),
        Transition::Blocked { phase, unmet } => {
            let unmet: Vec<String> = unmet.iter().map(ToString::to_string).collect();
            format!("finish '{phase}' first: {}", unmet.join(", "))
        }
    }
}

pub fn render(host: &TomlLessonHost) -> String {
    let controller = host.controller();
    let snapshot = controller.snapshot();
    let mut out = format!(
        "[{}] phase {}/{}: {}",
        snapshot.title,
        snapshot.phase_index + 1,
        snapshot.phase_count,
        snapshot.phase
    );

    if let Ok(example) = controller.current_example() {
        out.push_str(&format!(
            "\n  example {}/{} ({})",
            snapshot.example_index + 1,
            snapshot.example_count,
            example.id
        ));
        if let Some(prompt) = example.payload.get("prompt").and_then(|v| v.as_str()) {
            out.push_str(&format!("\n  {prompt}"));
        }
        if let Some(toml::Value::Array(hints)) = example.payload.get("hints") {
            for hint in hints.iter().take(snapshot.reveal.count as usize) {
                if let Some(hint) = hint.as_str() {
                    out.push_str(&format!("\n    - {hint}"));
                }
            }
        }
        if let (Some(ExpectedAnswer::Choice { options, .. }), Some(order)) =
            (example.answer.as_ref(), controller.option_order())
        {
            for (position, option) in order.arrange(options.as_slice()).into_iter().enumerate() {
                out.push_str(&format!("\n    {}) {option}", position + 1));
            }
        }
    }

    if controller.is_scoring() {
        out.push_str(&format!(
            "\n  score {}/{} ({} attempted)",
            snapshot.score.correct, snapshot.score.total, snapshot.score.attempted
        ));
    }
    if snapshot.example_count > 0 {
        out.push_str(&format!(
            "\n  discovered {}/{}",
            snapshot.discovered.len(),
            snapshot.example_count
        ));
    }
    if snapshot.can_complete {
        out.push_str("\n  ready to continue");
    }
    out
}

pub fn mount(config: NamedLessonConfig) -> Result<TomlLessonHost> {
    let title = config.title.clone();
    let controller = lesson_core::LessonController::new(config)?;
    Ok(LessonHost::new(controller).with_on_complete(move || {
        println!("*** '{title}' complete ***");
    }))
}

pub fn run_interactive(
    host: &mut TomlLessonHost,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    writeln!(output, "{}", render(host))?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => writeln!(output, "{HELP}")?,
            Ok(Command::Status) => writeln!(output, "{}", render(host))?,
            Ok(Command::DiscoverCurrent) => {
                let event = host
                    .controller()
                    .current_example()
                    .map(|example| LessonEvent::MarkDiscovered {
                        example_id: example.id.clone(),
                    });
                match event {
                    Ok(event) => apply_and_report(host, event, &mut output)?,
                    Err(err) => writeln!(output, "error: {err}")?,
                }
            }
            Ok(Command::Event(event)) => apply_and_report(host, event, &mut output)?,
            Err(message) => writeln!(output, "{message}")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

fn apply_and_report(
    host: &mut TomlLessonHost,
    event: LessonEvent,
    output: &mut impl Write,
) -> Result<()> {
    let changes_view = !matches!(
        event,
        LessonEvent::Select { .. } | LessonEvent::SelectText { .. } | LessonEvent::SelectOption { .. }
    );
    match host.apply(event) {
        Ok(outcome) => {
            writeln!(output, "{}", describe_outcome(&outcome))?;
            if changes_view {
                writeln!(output, "{}", render(host))?;
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "lesson event rejected");
            let fault = LessonFault::from(&err);
            writeln!(output, "error ({:?}): {}", fault.code, fault.message)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

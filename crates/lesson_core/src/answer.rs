use shared::{
    domain::{Answer, ExpectedAnswer},
    protocol::{AnswerState, Verdict},
};
use tracing::debug;

/// Parses a typed numeric response.
///
/// Accepts plain decimals (`"12.5"`, `"-3"`), a decimal comma (`"2,5"`) and simple
/// fractions (`"3/4"`). Anything else, including empty input and non-finite values,
/// is treated as "no valid answer".
pub fn parse_numeric_input(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = if let Some((numerator, denominator)) = trimmed.split_once('/') {
        let numerator = parse_decimal(numerator)?;
        let denominator = parse_decimal(denominator)?;
        if denominator == 0.0 {
            return None;
        }
        numerator / denominator
    } else {
        parse_decimal(trimmed)?
    };

    value.is_finite().then_some(value)
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains(',') && !raw.contains('.') {
        return raw.replace(',', ".").parse::<f64>().ok();
    }
    raw.parse::<f64>().ok()
}

pub fn is_match(expected: &ExpectedAnswer, answer: &Answer) -> bool {
    match (expected, answer) {
        (ExpectedAnswer::Exact { value }, Answer::Text(text)) => text.trim() == value.trim(),
        (ExpectedAnswer::Exact { value }, Answer::Number(number)) => value
            .trim()
            .parse::<f64>()
            .map(|parsed| parsed == *number)
            .unwrap_or(false),
        (ExpectedAnswer::Numeric { value, tolerance }, Answer::Number(number)) => {
            within(*value, *number, *tolerance)
        }
        (ExpectedAnswer::Numeric { value, tolerance }, Answer::Text(text)) => {
            parse_numeric_input(text)
                .map(|parsed| within(*value, parsed, *tolerance))
                .unwrap_or(false)
        }
        (ExpectedAnswer::Choice { index, .. }, Answer::Choice(picked)) => index == picked,
        (ExpectedAnswer::Choice { index, options }, Answer::Text(text)) => options
            .get(*index)
            .map(|option| option.trim() == text.trim())
            .unwrap_or(false),
        _ => false,
    }
}

fn within(expected: f64, actual: f64, tolerance: f64) -> bool {
    (expected - actual).abs() <= tolerance
}

#[derive(Debug, Clone, Default)]
pub struct AnswerEvaluator {
    state: AnswerState,
}

impl AnswerEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnswerState {
        &self.state
    }

    pub fn is_submitted(&self) -> bool {
        self.state.submitted
    }

    pub fn select(&mut self, value: Answer) -> bool {
        if self.state.submitted {
            debug!(?value, "selection ignored: attempt already submitted");
            return false;
        }
        self.state.selected = Some(value);
        true
    }

    /// Grades the current selection against `expected`.
    ///
    /// With nothing selected this is a no-op returning `None`. A second submit returns the
    /// recorded verdict with `newly_recorded == false`.
    pub fn submit(&mut self, expected: &ExpectedAnswer) -> Option<Verdict> {
        if self.state.submitted {
            return self.state.is_correct.map(|is_correct| Verdict {
                is_correct,
                newly_recorded: false,
            });
        }

        let selected = self.state.selected.as_ref()?;
        let is_correct = is_match(expected, selected);
        self.state.submitted = true;
        self.state.is_correct = Some(is_correct);
        debug!(?selected, is_correct, "attempt submitted");

        Some(Verdict {
            is_correct,
            newly_recorded: true,
        })
    }

    pub fn reset_attempt(&mut self) {
        self.state = AnswerState::default();
    }
}

#[cfg(test)]
#[path = "tests/answer_tests.rs"]
mod tests;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Example, ExpectedAnswer, GateRule, NamedPhase, Phase},
    error::LessonError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec<P> {
    pub name: P,
    #[serde(default)]
    pub exit: Vec<GateRule>,
}

impl<P> PhaseSpec<P> {
    pub fn new(name: P) -> Self {
        Self {
            name,
            exit: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>, T: Deserialize<'de> + Default"))]
pub struct LessonConfig<P, T> {
    #[serde(default)]
    pub title: String,
    pub phases: Vec<PhaseSpec<P>>,
    #[serde(default = "Vec::new")]
    pub examples: Vec<Example<T>>,
    #[serde(default)]
    pub completion: Vec<GateRule>,
    #[serde(default)]
    pub scoring: bool,
    #[serde(default = "default_true")]
    pub discover_on_correct: bool,
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

pub type NamedLessonConfig = LessonConfig<NamedPhase, toml::Table>;

impl<P: Phase, T> LessonConfig<P, T> {
    pub fn new(phases: impl IntoIterator<Item = P>) -> Self {
        Self {
            title: String::new(),
            phases: phases.into_iter().map(PhaseSpec::new).collect(),
            examples: Vec::new(),
            completion: Vec::new(),
            scoring: false,
            discover_on_correct: true,
            shuffle_seed: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_examples(mut self, examples: Vec<Example<T>>) -> Self {
        self.examples = examples;
        self
    }

    pub fn with_completion(mut self, rules: Vec<GateRule>) -> Self {
        self.completion = rules;
        self
    }

    pub fn with_exit_rule(mut self, phase: &P, rule: GateRule) -> Self {
        if let Some(spec) = self.phases.iter_mut().find(|spec| &spec.name == phase) {
            spec.exit.push(rule);
        }
        self
    }

    pub fn with_scoring(mut self, scoring: bool) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_discover_on_correct(mut self, discover: bool) -> Self {
        self.discover_on_correct = discover;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn problem_count(&self) -> usize {
        self.examples
            .iter()
            .filter(|example| example.answer.is_some())
            .count()
    }

    pub fn validate(&self) -> Result<(), LessonError> {
        if self.phases.is_empty() {
            return Err(LessonError::invalid_config("phase list is empty"));
        }

        let mut phase_names = HashSet::new();
        for spec in &self.phases {
            if !phase_names.insert(&spec.name) {
                return Err(LessonError::invalid_config(format!(
                    "phase '{}' is listed more than once",
                    spec.name
                )));
            }
            if spec.exit.contains(&GateRule::TerminalPhase) {
                return Err(LessonError::invalid_config(format!(
                    "phase '{}' cannot require the terminal phase before it is left",
                    spec.name
                )));
            }
            self.validate_rules(&spec.exit)?;
        }

        let mut example_ids = HashSet::new();
        for example in &self.examples {
            if !example_ids.insert(&example.id) {
                return Err(LessonError::invalid_config(format!(
                    "example '{}' is listed more than once",
                    example.id
                )));
            }
            if let Some(answer) = &example.answer {
                validate_answer(&example.id.0, answer)?;
            }
        }

        self.validate_rules(&self.completion)
    }

    fn validate_rules(&self, rules: &[GateRule]) -> Result<(), LessonError> {
        for rule in rules {
            match rule {
                GateRule::AllDiscovered | GateRule::AllStepsRevealed | GateRule::AnswerSubmitted
                    if self.examples.is_empty() =>
                {
                    return Err(LessonError::invalid_config(format!(
                        "rule '{rule}' needs at least one example"
                    )));
                }
                GateRule::ScoreThreshold { .. } if !self.scoring => {
                    return Err(LessonError::invalid_config(
                        "score threshold configured but scoring is disabled",
                    ));
                }
                GateRule::ScoreThreshold { .. } if self.problem_count() == 0 => {
                    return Err(LessonError::invalid_config(
                        "score threshold configured but no example carries an answer",
                    ));
                }
                GateRule::ScoreThreshold { required } if *required as usize > self.problem_count() => {
                    return Err(LessonError::invalid_config(format!(
                        "score threshold {required} exceeds the {} gradable examples",
                        self.problem_count()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn validate_answer(example_id: &str, answer: &ExpectedAnswer) -> Result<(), LessonError> {
    match answer {
        ExpectedAnswer::Numeric { value, tolerance } => {
            if !value.is_finite() || !tolerance.is_finite() || *tolerance < 0.0 {
                return Err(LessonError::invalid_config(format!(
                    "example '{example_id}' has a non-finite value or negative tolerance"
                )));
            }
        }
        ExpectedAnswer::Choice { index, options } => {
            if !options.is_empty() && *index >= options.len() {
                return Err(LessonError::invalid_config(format!(
                    "example '{example_id}' expects option {index} but offers {}",
                    options.len()
                )));
            }
        }
        ExpectedAnswer::Exact { .. } => {}
    }
    Ok(())
}

pub fn parse_lesson_toml(raw: &str) -> Result<NamedLessonConfig, LessonError> {
    let config: NamedLessonConfig = toml::from_str(raw)
        .map_err(|err| LessonError::invalid_config(format!("malformed lesson file: {err}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

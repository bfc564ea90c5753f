use std::{fmt, hash::Hash};

use serde::{Deserialize, Serialize};

macro_rules! label_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

label_newtype!(ExampleId);
label_newtype!(NamedPhase);

pub trait Phase: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl Phase for NamedPhase {}

/// Declares a phase enum with a fixed order and display labels.
///
/// ```
/// shared::lesson_phases! {
///     pub enum QuartilePhase {
///         Intro => "intro",
///         Discover => "discover",
///         Pattern => "pattern",
///     }
/// }
///
/// assert_eq!(QuartilePhase::ALL.len(), 3);
/// assert_eq!(QuartilePhase::Discover.to_string(), "discover");
/// ```
#[macro_export]
macro_rules! lesson_phases {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl $crate::domain::Phase for $name {}
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    Number(f64),
    Choice(usize),
}

pub const DEFAULT_NUMERIC_TOLERANCE: f64 = 1e-9;

fn default_tolerance() -> f64 {
    DEFAULT_NUMERIC_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExpectedAnswer {
    Exact {
        value: String,
    },
    Numeric {
        value: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    Choice {
        index: usize,
        #[serde(default)]
        options: Vec<String>,
    },
}

impl ExpectedAnswer {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact {
            value: value.into(),
        }
    }

    pub fn numeric(value: f64) -> Self {
        Self::Numeric {
            value,
            tolerance: DEFAULT_NUMERIC_TOLERANCE,
        }
    }

    pub fn choice(index: usize, options: Vec<String>) -> Self {
        Self::Choice { index, options }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }

    pub fn option_count(&self) -> usize {
        match self {
            Self::Choice { options, .. } => options.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example<T> {
    pub id: ExampleId,
    #[serde(default)]
    pub steps: u32,
    #[serde(default)]
    pub answer: Option<ExpectedAnswer>,
    #[serde(default)]
    pub payload: T,
}

impl<T> Example<T> {
    pub fn new(id: impl Into<ExampleId>, payload: T) -> Self {
        Self {
            id: id.into(),
            steps: 0,
            answer: None,
            payload,
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_answer(mut self, answer: ExpectedAnswer) -> Self {
        self.answer = Some(answer);
        self
    }
}

impl From<String> for ExampleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GateRule {
    AllDiscovered,
    ScoreThreshold { required: u32 },
    TerminalPhase,
    AllStepsRevealed,
    AnswerSubmitted,
}

impl fmt::Display for GateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllDiscovered => f.write_str("all examples discovered"),
            Self::ScoreThreshold { required } => write!(f, "at least {required} correct"),
            Self::TerminalPhase => f.write_str("last phase reached"),
            Self::AllStepsRevealed => f.write_str("all steps revealed"),
            Self::AnswerSubmitted => f.write_str("answer submitted"),
        }
    }
}

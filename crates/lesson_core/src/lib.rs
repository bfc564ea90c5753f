//! Generic lesson-step progression engine.

pub mod answer;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod gate;
pub mod host;
pub mod options;
pub mod phase;
pub mod reveal;
pub mod schedule;

pub use answer::{is_match, parse_numeric_input, AnswerEvaluator};
pub use config::{parse_lesson_toml, LessonConfig, NamedLessonConfig, PhaseSpec};
pub use controller::LessonController;
pub use cursor::ExampleCursor;
pub use gate::{CompletionGate, GateContext, ScoreBoard};
pub use host::{EventOutcome, LessonHost};
pub use options::OptionOrder;
pub use phase::{PhaseController, Transition};
pub use reveal::RevealSequencer;
pub use schedule::StepSchedule;

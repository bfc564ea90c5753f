use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ExampleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownPhase,
    EmptyExampleList,
    UnknownExample,
    ExampleOutOfRange,
    PhaseLocked,
    InvalidConfig,
}

/// Integration errors raised by the lesson engine.
///
/// Learner-driven edge cases (double submit, exhausted reveal, `next` on the
/// last phase) are no-ops and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LessonError {
    #[error("unknown phase '{phase}'")]
    UnknownPhase { phase: String },
    #[error("lesson has no examples configured")]
    EmptyExampleList,
    #[error("unknown example '{id}'")]
    UnknownExample { id: ExampleId },
    #[error("example index {index} out of range for {len} examples")]
    ExampleOutOfRange { index: usize, len: usize },
    #[error("phase '{phase}' is locked until '{frontier}' is completed")]
    PhaseLocked { phase: String, frontier: String },
    #[error("invalid lesson config: {0}")]
    InvalidConfig(String),
}

impl LessonError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownPhase { .. } => ErrorCode::UnknownPhase,
            Self::EmptyExampleList => ErrorCode::EmptyExampleList,
            Self::UnknownExample { .. } => ErrorCode::UnknownExample,
            Self::ExampleOutOfRange { .. } => ErrorCode::ExampleOutOfRange,
            Self::PhaseLocked { .. } => ErrorCode::PhaseLocked,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonFault {
    pub code: ErrorCode,
    pub message: String,
}

impl LessonFault {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&LessonError> for LessonFault {
    fn from(value: &LessonError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

impl From<LessonError> for LessonFault {
    fn from(value: LessonError) -> Self {
        Self::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_keeps_code_and_message() {
        let err = LessonError::UnknownPhase {
            phase: "summary".into(),
        };
        let fault = LessonFault::from(&err);
        assert_eq!(fault.code, ErrorCode::UnknownPhase);
        assert_eq!(fault.message, "unknown phase 'summary'");

        let json = serde_json::to_string(&fault).expect("serialize");
        assert!(json.contains("\"unknown_phase\""));
    }
}

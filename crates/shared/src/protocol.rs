use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Answer, ExampleId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum LessonEvent {
    Select {
        answer: Answer,
    },
    SelectText {
        text: String,
    },
    SelectOption {
        position: usize,
    },
    Submit,
    Reveal,
    MarkDiscovered {
        example_id: ExampleId,
    },
    NextExample,
    SeekExample {
        index: usize,
    },
    NextPhase,
    GoToPhase {
        phase: String,
    },
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerState {
    pub selected: Option<Answer>,
    pub submitted: bool,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealProgress {
    pub count: u32,
    pub exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_correct: bool,
    /// False when the attempt was already submitted and this call changed nothing.
    pub newly_recorded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub done: bool,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct: u32,
    pub attempted: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonSnapshot {
    pub mount_id: Uuid,
    pub title: String,
    pub phase: String,
    pub phase_index: usize,
    pub furthest_phase_index: usize,
    pub phase_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_id: Option<ExampleId>,
    pub example_index: usize,
    pub example_count: usize,
    pub reveal: RevealProgress,
    pub answer: AnswerState,
    pub score: ScoreSummary,
    pub discovered: Vec<ExampleId>,
    pub can_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_type_and_payload_tags() {
        let raw = r#"[
            {"type": "select", "payload": {"answer": {"kind": "choice", "value": 2}}},
            {"type": "select_text", "payload": {"text": "3/4"}},
            {"type": "submit"},
            {"type": "go_to_phase", "payload": {"phase": "summary"}}
        ]"#;
        let events: Vec<LessonEvent> = serde_json::from_str(raw).expect("parse events");
        assert_eq!(
            events,
            vec![
                LessonEvent::Select {
                    answer: Answer::Choice(2)
                },
                LessonEvent::SelectText {
                    text: "3/4".into()
                },
                LessonEvent::Submit,
                LessonEvent::GoToPhase {
                    phase: "summary".into()
                },
            ]
        );
    }
}

//! The step model: a typed union of message/action units held by a node.

pub mod kind;
pub mod payload;
pub mod validation;

pub use kind::*;
pub use payload::*;
pub use validation::*;

use serde::{Deserialize, Serialize};

/// A single content or action unit inside a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identity; assigned by the graph mutator when the step is added.
    #[serde(default)]
    pub id: String,
    pub kind: StepKind,
    /// Text or caption. May contain `{{contact.*}}` and `{{vars.*}}` tokens.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub payload: StepPayload,
}

impl Step {
    pub fn new(kind: StepKind, content: Option<String>, payload: StepPayload) -> Self {
        Self {
            id: String::new(),
            kind,
            content,
            payload,
        }
    }

    pub fn text(content: &str) -> Self {
        Self::new(StepKind::Text, Some(content.to_string()), StepPayload::None)
    }

    /// Image, video, audio or file step referencing a media library item.
    pub fn media(kind: StepKind, media_id: &str, caption: Option<&str>) -> Self {
        Self::new(
            kind,
            caption.map(str::to_string),
            StepPayload::Media(MediaPayload {
                media_id: media_id.to_string(),
            }),
        )
    }

    pub fn quick_reply(content: &str, labels: &[&str]) -> Self {
        let buttons = labels
            .iter()
            .map(|label| ReplyButton {
                label: label.to_string(),
            })
            .collect();
        Self::new(
            StepKind::QuickReply,
            Some(content.to_string()),
            StepPayload::QuickReply(QuickReplyPayload { buttons }),
        )
    }

    pub fn list_menu(content: &str, button_label: &str, titles: &[&str]) -> Self {
        let options = titles
            .iter()
            .map(|title| ListOption {
                title: title.to_string(),
                description: None,
            })
            .collect();
        Self::new(
            StepKind::ListMenu,
            Some(content.to_string()),
            StepPayload::ListMenu(ListMenuPayload {
                button_label: button_label.to_string(),
                options,
            }),
        )
    }

    /// An input-collecting step storing the answer in `variable`.
    pub fn input(kind: StepKind, prompt: &str, variable: &str) -> Self {
        Self::new(
            kind,
            Some(prompt.to_string()),
            StepPayload::Input(InputPayload {
                variable: variable.to_string(),
                validation: ValidationRule::default(),
            }),
        )
    }

    pub fn subflow_jump(target_flow_id: &str, target_node_id: Option<&str>) -> Self {
        Self::new(
            StepKind::SubflowJump,
            None,
            StepPayload::SubflowJump(SubflowJumpPayload {
                target_flow_id: target_flow_id.to_string(),
                target_node_id: target_node_id.map(str::to_string),
            }),
        )
    }

    /// Number of selectable outcomes for quick reply and list steps.
    pub fn outcome_count(&self) -> Option<usize> {
        match &self.payload {
            StepPayload::QuickReply(p) if self.kind == StepKind::QuickReply => {
                Some(p.buttons.len())
            }
            StepPayload::ListMenu(p) if self.kind == StepKind::ListMenu => Some(p.options.len()),
            _ if self.kind.is_multi_outcome() => Some(0),
            _ => None,
        }
    }

    /// The declared output variable, if this is an input step with a non-empty name.
    pub fn output_variable(&self) -> Option<&str> {
        match &self.payload {
            StepPayload::Input(input) if self.kind.is_input() => {
                let name = input.variable.trim();
                (!name.is_empty()).then_some(name)
            }
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<crate::error::StepViolation>> {
        validate_step(self)
    }
}

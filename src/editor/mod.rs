//! Import of graphs saved by the visual flow editor.

pub mod types;

pub use types::*;

use crate::error::ImportError;
use crate::graph::{Edge, Graph, IntoGraph, Node, SourcePort};
use crate::step::*;
use serde_json::Value;
use tracing::debug;

const DEFAULT_FLOW_NAME: &str = "Chatbot Flow 1";
const WEBSITE_PATTERN: &str = r"^https?://\S+$";

impl EditorGraph {
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        serde_json::from_str(json).map_err(|e| ImportError::JsonParseError(e.to_string()))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl IntoGraph for EditorGraph {
    fn into_graph(self) -> Result<Graph, ImportError> {
        let name = self.name.unwrap_or_else(|| DEFAULT_FLOW_NAME.to_string());

        let nodes = self
            .nodes
            .into_iter()
            .map(|node| -> Result<Node, ImportError> {
                let steps = node
                    .data
                    .steps
                    .into_iter()
                    .enumerate()
                    .map(|(index, step)| convert_step(&node.id, index, step))
                    .collect::<Result<Vec<_>, ImportError>>()?;
                Ok(Node {
                    id: node.id,
                    label: node.data.label,
                    is_entry: node.data.is_start,
                    steps,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|edge| -> Result<Edge, ImportError> {
                let source_port = SourcePort::from_editor_handle(edge.source_handle.as_deref())
                    .map_err(|_| ImportError::InvalidHandle {
                        node_id: edge.source.clone(),
                        handle: edge.source_handle.clone().unwrap_or_default(),
                    })?;
                Ok(Edge {
                    source_node_id: edge.source,
                    source_port,
                    target_node_id: edge.target,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;

        debug!(nodes = nodes.len(), edges = edges.len(), "Imported editor graph");
        Ok(Graph::from_parts(&name, nodes, edges)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn as_f64(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn convert_validation(validation: Option<EditorValidation>) -> ValidationRule {
    let Some(validation) = validation else {
        return ValidationRule::default();
    };
    let defaults = ValidationRule::default();
    ValidationRule {
        max_retries: as_f64(&validation.max_retries)
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u8::MAX))
            .map_or(defaults.max_retries, |n| n as u8),
        min: as_f64(&validation.min),
        max: as_f64(&validation.max),
        regex: non_empty(validation.regex),
        error_message: non_empty(validation.error_message),
    }
}

fn convert_step(node_id: &str, index: usize, raw: EditorStep) -> Result<Step, ImportError> {
    let website = raw.step_type == "Website Input";
    let kind = if website {
        StepKind::TextInput
    } else {
        StepKind::from_editor_label(&raw.step_type).ok_or_else(|| ImportError::UnknownStepType {
            node_id: node_id.to_string(),
            type_name: raw.step_type.clone(),
        })?
    };

    let payload = match kind {
        StepKind::Text => StepPayload::None,
        StepKind::Image | StepKind::Video | StepKind::Audio | StepKind::File => {
            StepPayload::Media(MediaPayload {
                media_id: raw.media_id.unwrap_or_default(),
            })
        }
        StepKind::Location => StepPayload::Location(LocationPayload {
            latitude: raw.latitude.unwrap_or_default(),
            longitude: raw.longitude.unwrap_or_default(),
            name: non_empty(raw.name),
            address: non_empty(raw.address),
        }),
        StepKind::YouTubeLink | StepKind::Link => StepPayload::Link(LinkPayload {
            url: raw.url.unwrap_or_default(),
            label: None,
        }),
        StepKind::QuickReply => StepPayload::QuickReply(QuickReplyPayload {
            buttons: raw
                .buttons
                .unwrap_or_default()
                .into_iter()
                .map(|b| ReplyButton { label: b.label })
                .collect(),
        }),
        StepKind::ListMenu => StepPayload::ListMenu(ListMenuPayload {
            button_label: non_empty(raw.button_text)
                .unwrap_or_else(|| ListMenuPayload::default().button_label),
            options: raw
                .options
                .unwrap_or_default()
                .into_iter()
                .map(|o| ListOption {
                    title: o.title,
                    description: non_empty(o.description),
                })
                .collect(),
        }),
        StepKind::TextInput
        | StepKind::NumberInput
        | StepKind::EmailInput
        | StepKind::PhoneInput
        | StepKind::DateInput
        | StepKind::TimeInput => {
            let mut validation = convert_validation(raw.validation);
            if website && validation.regex.is_none() {
                validation.regex = Some(WEBSITE_PATTERN.to_string());
            }
            StepPayload::Input(InputPayload {
                variable: raw.variable.unwrap_or_default().trim().to_string(),
                validation,
            })
        }
        StepKind::Condition => StepPayload::Condition(ConditionPayload {
            subject: raw.subject.unwrap_or_default(),
            operator: raw
                .operator
                .and_then(|op| serde_json::from_value(Value::String(op)).ok())
                .unwrap_or_default(),
            value: raw.value.unwrap_or_default(),
        }),
        StepKind::SubflowJump => StepPayload::SubflowJump(SubflowJumpPayload {
            target_flow_id: raw.target_flow_id.unwrap_or_default(),
            target_node_id: non_empty(raw.target_node_id),
        }),
        StepKind::Webhook => StepPayload::Webhook(WebhookPayload {
            url: raw.url.unwrap_or_default(),
            method: raw
                .method
                .and_then(|m| serde_json::from_value(Value::String(m.to_uppercase())).ok())
                .unwrap_or_default(),
        }),
    };

    Ok(Step {
        id: format!("{}:{}", node_id, index),
        kind,
        content: raw.content,
        payload,
    })
}

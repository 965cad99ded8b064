use crate::graph::SourcePort;
use crate::step::{ConditionOperator, HttpMethod, StepKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Format marker written into every compiled document.
pub const FLOW_DOCUMENT_VERSION: &str = "3.0";

/// The compiled, runtime-consumable form of a conversation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    pub version: String,
    /// First screen after the entry node, if the entry is connected.
    pub start: Option<String>,
    /// One screen per non-entry node, in node insertion order.
    pub screens: Vec<Screen>,
}

impl FlowDocument {
    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub title: String,
    /// True when the node has nothing connected to its unlabeled port.
    pub terminal: bool,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub steps: Vec<RenderedStep>,
    /// Node-level actions: a single navigate or complete action.
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedStep {
    pub step_id: String,
    pub kind: StepKind,
    pub body: Option<String>,
    pub content: StepContent,
}

/// Kind-specific rendering of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepContent {
    Message,
    Media {
        media_id: String,
    },
    Location {
        latitude: String,
        longitude: String,
        name: Option<String>,
        address: Option<String>,
    },
    Link {
        url: String,
        label: Option<String>,
    },
    Choices {
        button_label: Option<String>,
        options: Vec<RenderedOption>,
        /// Transition for the step's `default` port.
        default_transition: Option<Action>,
    },
    Input {
        variable: Option<String>,
        max_retries: u8,
        min: Option<f64>,
        max: Option<f64>,
        regex: Option<String>,
        error_message: Option<String>,
    },
    Condition {
        subject: String,
        operator: ConditionOperator,
        value: String,
    },
    SubflowJump {
        flow_id: String,
        node_id: Option<String>,
    },
    Webhook {
        url: String,
        method: HttpMethod,
    },
}

/// A selectable option of a quick reply or list step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedOption {
    pub port: SourcePort,
    pub title: String,
    pub description: Option<String>,
    /// `None` means no explicit transition: the runtime falls through to the
    /// node's unlabeled port, or completes the flow if that is unconnected.
    pub on_select: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Navigate {
        label: String,
        next: String,
    },
    Complete {
        label: String,
        /// Variable name to substitution token.
        payload: IndexMap<String, String>,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Navigate { .. } => "navigate",
            Action::Complete { .. } => "complete",
        }
    }

    /// Target screen of a navigate action.
    pub fn next(&self) -> Option<&str> {
        match self {
            Action::Navigate { next, .. } => Some(next),
            Action::Complete { .. } => None,
        }
    }
}

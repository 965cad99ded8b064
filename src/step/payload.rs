use serde::{Deserialize, Serialize};

/// Kind-specific data carried by a step. Holds plain data only; display
/// metadata (icons, colors) never appears here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPayload {
    /// Text and other content-only steps.
    #[default]
    None,
    Media(MediaPayload),
    Location(LocationPayload),
    Link(LinkPayload),
    QuickReply(QuickReplyPayload),
    ListMenu(ListMenuPayload),
    Input(InputPayload),
    Condition(ConditionPayload),
    SubflowJump(SubflowJumpPayload),
    Webhook(WebhookPayload),
}

impl StepPayload {
    /// Short name of the payload shape, used in mismatch diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            StepPayload::None => "none",
            StepPayload::Media(_) => "media",
            StepPayload::Location(_) => "location",
            StepPayload::Link(_) => "link",
            StepPayload::QuickReply(_) => "quick_reply",
            StepPayload::ListMenu(_) => "list_menu",
            StepPayload::Input(_) => "input",
            StepPayload::Condition(_) => "condition",
            StepPayload::SubflowJump(_) => "subflow_jump",
            StepPayload::Webhook(_) => "webhook",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPayload {
    /// Opaque reference into the external media library.
    pub media_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPayload {
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickReplyPayload {
    #[serde(default)]
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOption {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMenuPayload {
    #[serde(default = "default_list_button")]
    pub button_label: String,
    #[serde(default)]
    pub options: Vec<ListOption>,
}

impl Default for ListMenuPayload {
    fn default() -> Self {
        Self {
            button_label: default_list_button(),
            options: Vec::new(),
        }
    }
}

fn default_list_button() -> String {
    "Select an option".to_string()
}

/// Retry and acceptance rules for input-collecting steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Default for ValidationRule {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            min: None,
            max: None,
            regex: None,
            error_message: None,
        }
    }
}

fn default_max_retries() -> u8 {
    3
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputPayload {
    /// Output variable name; empty means the answer is not stored.
    #[serde(default)]
    pub variable: String,
    #[serde(default)]
    pub validation: ValidationRule,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionPayload {
    /// Token or literal compared on the left-hand side, e.g. `{{vars.age}}`.
    pub subject: String,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubflowJumpPayload {
    pub target_flow_id: String,
    /// Node inside the target flow; `None` starts from its entry.
    #[serde(default)]
    pub target_node_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
}

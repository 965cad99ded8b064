use serde::Deserialize;
use serde_json::Value;

/// Validation settings as the editor stores them. Numeric inputs are kept as
/// whatever the form produced, which may be a number or a numeric string.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EditorValidation {
    #[serde(alias = "maxRetries")]
    pub max_retries: Option<Value>,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub regex: Option<String>,
    #[serde(alias = "errorMessage")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorButton {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One step as stored by the editor. Render-only fields (`icon`, `iconBg`,
/// `iconColor`) are not declared and are dropped on parse.
#[derive(Debug, Deserialize, Clone)]
pub struct EditorStep {
    #[serde(rename = "type")]
    pub step_type: String,
    pub content: Option<String>,
    pub buttons: Option<Vec<EditorButton>>,
    pub options: Option<Vec<EditorOption>>,
    #[serde(alias = "buttonText")]
    pub button_text: Option<String>,
    #[serde(alias = "mediaId")]
    pub media_id: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub variable: Option<String>,
    pub validation: Option<EditorValidation>,
    pub subject: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    #[serde(alias = "targetFlowId")]
    pub target_flow_id: Option<String>,
    #[serde(alias = "targetNodeId")]
    pub target_node_id: Option<String>,
}

/// Node data block; `onDelete` and other callbacks never survive serialization.
#[derive(Debug, Deserialize, Clone)]
pub struct EditorNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "isStart")]
    pub is_start: bool,
    #[serde(default)]
    pub steps: Vec<EditorStep>,
}

/// Editor node; canvas position and styling are ignored.
#[derive(Debug, Deserialize)]
pub struct EditorNode {
    pub id: String,
    pub data: EditorNodeData,
}

#[derive(Debug, Deserialize)]
pub struct EditorEdge {
    pub source: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    pub target: String,
}

/// The editor's saved `graph_data` document.
#[derive(Debug, Deserialize)]
pub struct EditorGraph {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<EditorNode>,
    #[serde(default)]
    pub edges: Vec<EditorEdge>,
}

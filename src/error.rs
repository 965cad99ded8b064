use crate::graph::SourcePort;
use crate::step::StepKind;
use itertools::Itertools;
use thiserror::Error;

/// The two failure families of graph editing: shape of the graph versus
/// content of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structural,
    Payload,
}

/// A single rule broken by a step's content or payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepViolation {
    #[error("A {kind} step cannot carry a '{found}' payload")]
    PayloadMismatch { kind: StepKind, found: &'static str },

    #[error("Required field '{field}' is missing or blank")]
    MissingField { field: String },

    #[error("'{field}' has {count} entries, but at most {max} are allowed")]
    TooMany {
        field: String,
        count: usize,
        max: usize,
    },

    #[error("'{field}' is {length} characters long, but at most {max} are allowed")]
    TooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("'{field}' has value '{value}', expected {expected}")]
    OutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    #[error("'{field}' does not apply to {kind} steps")]
    NotApplicable { field: String, kind: StepKind },

    #[error("Regex '{pattern}' does not compile: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("'{name}' is not a valid variable name")]
    InvalidVariableName { name: String },

    #[error("'{url}' is not an http(s) URL")]
    InvalidUrl { url: String },

    #[error("Field '{field}' cannot be edited")]
    ReadOnlyField { field: String },

    #[error("Malformed step: {reason}")]
    Malformed { reason: String },
}

fn describe(violations: &[StepViolation]) -> String {
    violations.iter().map(ToString::to_string).join("; ")
}

/// Errors raised by graph queries and mutator operations. A failed operation
/// leaves its input graph untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{node_id}' is the entry node and cannot be {action}")]
    EntryNodeProtected { node_id: String, action: &'static str },

    #[error("Reference to '{reference}' does not exist (from {context})")]
    DanglingReference { reference: String, context: String },

    #[error("Port '{port}' on node '{node_id}' already routes to '{target_node_id}'")]
    PortAlreadyConnected {
        node_id: String,
        port: SourcePort,
        target_node_id: String,
    },

    #[error("Node '{node_id}' has no step at index {index}")]
    StepNotFound { node_id: String, index: usize },

    #[error("Invalid payload for step {index} of node '{node_id}': {}", describe(.violations))]
    InvalidStepPayload {
        node_id: String,
        index: usize,
        violations: Vec<StepViolation>,
    },

    #[error("Node id '{0}' is used more than once")]
    DuplicateNodeId(String),

    #[error("Graph has no entry node")]
    NoEntryNode,

    #[error("Graph has more than one entry node: {}", .0.join(", "))]
    MultipleEntryNodes(Vec<String>),
}

impl GraphError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GraphError::InvalidStepPayload { .. } => ErrorCategory::Payload,
            _ => ErrorCategory::Structural,
        }
    }
}

/// Errors that can occur while compiling a graph into a flow document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Graph has no entry node")]
    NoEntryNode,

    #[error("Graph has more than one entry node: {}", .0.join(", "))]
    MultipleEntryNodes(Vec<String>),

    #[error("Invalid payload for step {index} of node '{node_id}': {}", describe(.violations))]
    InvalidStepPayload {
        node_id: String,
        index: usize,
        violations: Vec<StepViolation>,
    },

    #[error("Reference to '{reference}' does not exist (from {context})")]
    DanglingReference { reference: String, context: String },

    #[error("Node id '{0}' is used more than once")]
    DuplicateNodeId(String),

    #[error("Entry node '{node_id}' cannot be {action}")]
    EntryNodeProtected { node_id: String, action: &'static str },

    #[error("Port '{port}' on node '{node_id}' has more than one outgoing edge")]
    AmbiguousRoute { node_id: String, port: SourcePort },

    #[error("Variable '{name}' is declared by more than one step: {}", .step_ids.join(", "))]
    DuplicateVariable { name: String, step_ids: Vec<String> },
}

impl CompileError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompileError::InvalidStepPayload { .. } | CompileError::DuplicateVariable { .. } => {
                ErrorCategory::Payload
            }
            _ => ErrorCategory::Structural,
        }
    }
}

impl From<GraphError> for CompileError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NoEntryNode => CompileError::NoEntryNode,
            GraphError::MultipleEntryNodes(ids) => CompileError::MultipleEntryNodes(ids),
            GraphError::InvalidStepPayload {
                node_id,
                index,
                violations,
            } => CompileError::InvalidStepPayload {
                node_id,
                index,
                violations,
            },
            GraphError::DanglingReference { reference, context } => {
                CompileError::DanglingReference { reference, context }
            }
            GraphError::DuplicateNodeId(id) => CompileError::DuplicateNodeId(id),
            GraphError::EntryNodeProtected { node_id, action } => {
                CompileError::EntryNodeProtected { node_id, action }
            }
            GraphError::PortAlreadyConnected { node_id, port, .. } => {
                CompileError::AmbiguousRoute { node_id, port }
            }
            GraphError::StepNotFound { node_id, index } => CompileError::DanglingReference {
                reference: format!("{}#{}", node_id, index),
                context: "step index".to_string(),
            },
        }
    }
}

/// Errors that can occur when converting an editor format into a `Graph`.
#[derive(Error, Debug, Clone)]
pub enum ImportError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' has a step of unknown type '{type_name}'")]
    UnknownStepType { node_id: String, type_name: String },

    #[error("Edge from '{node_id}' uses an unrecognized handle '{handle}'")]
    InvalidHandle { node_id: String, handle: String },

    #[error("Imported graph is inconsistent: {0}")]
    Graph(#[from] GraphError),
}

/// Errors raised by flow store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Flow '{0}' not found")]
    NotFound(String),

    #[error("Flow '{id}' could not be (de)serialized: {message}")]
    Serialization { id: String, message: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from encoding or decoding the binary flow document artifact.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("{0}")]
    Generic(String),

    #[error("Unsupported document version '{found}', expected '{expected}'")]
    VersionMismatch { found: String, expected: String },
}

/// A source port string that matches none of the accepted spellings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized source port '{0}'")]
pub struct PortParseError(pub String);

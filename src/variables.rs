//! Derives the substitution tokens available to message editors.
//!
//! Variables are never stored: they are recomputed from input-collecting
//! steps every time they are needed.

use crate::graph::Graph;
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const CONTACT_NAMESPACE: &str = "contact";
pub const VARS_NAMESPACE: &str = "vars";

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(contact|vars)\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("token pattern is a valid regex")
});

/// A variable declared by an input step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub declaring_step_id: String,
    /// The node holding the declaring step.
    pub node_id: String,
    pub token: String,
}

/// A variable that is always available, independent of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemVariable {
    pub label: &'static str,
    pub field: &'static str,
}

impl SystemVariable {
    pub fn token(&self) -> String {
        contact_token(self.field)
    }
}

const SYSTEM_VARIABLES: [SystemVariable; 4] = [
    SystemVariable {
        label: "Name",
        field: "name",
    },
    SystemVariable {
        label: "First Name",
        field: "first_name",
    },
    SystemVariable {
        label: "Phone Number",
        field: "phone",
    },
    SystemVariable {
        label: "WhatsApp ID",
        field: "wa_id",
    },
];

/// Namespace and name of a token found in message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub namespace: String,
    pub name: String,
}

pub fn vars_token(name: &str) -> String {
    format!("{{{{{}.{}}}}}", VARS_NAMESPACE, name)
}

pub fn contact_token(field: &str) -> String {
    format!("{{{{{}.{}}}}}", CONTACT_NAMESPACE, field)
}

/// The contact fields the messaging runtime always substitutes.
pub fn system_variables() -> &'static [SystemVariable] {
    &SYSTEM_VARIABLES
}

/// Declared variables in node insertion order, then step order. Duplicate
/// names are reported as they occur.
pub fn collect_variables(graph: &Graph) -> Vec<Variable> {
    graph
        .nodes()
        .iter()
        .flat_map(|node| {
            node.steps.iter().filter_map(move |step| {
                step.output_variable().map(|name| Variable {
                    name: name.to_string(),
                    declaring_step_id: step.id.clone(),
                    node_id: node.id.clone(),
                    token: vars_token(name),
                })
            })
        })
        .collect()
}

/// Names declared by more than one step, in order of first repetition.
pub fn duplicate_names(graph: &Graph) -> Vec<String> {
    collect_variables(graph)
        .into_iter()
        .map(|v| v.name)
        .duplicates()
        .collect()
}

/// Every token an editor may offer: system tokens first, then graph variables
/// with duplicates collapsed.
pub fn available_tokens(graph: &Graph) -> Vec<String> {
    system_variables()
        .iter()
        .map(SystemVariable::token)
        .chain(collect_variables(graph).into_iter().map(|v| v.token))
        .unique()
        .collect()
}

/// Tokens referenced in a piece of message text, in order of appearance.
pub fn referenced_tokens(text: &str) -> Vec<TokenRef> {
    TOKEN_PATTERN
        .captures_iter(text)
        .map(|caps| TokenRef {
            namespace: caps[1].to_string(),
            name: caps[2].to_string(),
        })
        .collect()
}

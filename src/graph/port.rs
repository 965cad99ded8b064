use crate::error::PortParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named exit point on a node.
///
/// Every node has one unlabeled `Default` port. Quick reply and list steps add
/// one port per option plus a per-step `default` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourcePort {
    Default,
    Option { step: usize, option: usize },
    StepDefault { step: usize },
}

impl SourcePort {
    /// The step this port belongs to, if any.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            SourcePort::Default => None,
            SourcePort::Option { step, .. } | SourcePort::StepDefault { step } => Some(*step),
        }
    }

    /// Same port with its step index replaced.
    pub fn with_step(self, new_step: usize) -> Self {
        match self {
            SourcePort::Default => SourcePort::Default,
            SourcePort::Option { option, .. } => SourcePort::Option {
                step: new_step,
                option,
            },
            SourcePort::StepDefault { .. } => SourcePort::StepDefault { step: new_step },
        }
    }

    /// Parses the visual editor's handle ids: `handle-<step>-<option>`,
    /// `handle-<step>-default`, or no handle at all for the node output.
    pub fn from_editor_handle(handle: Option<&str>) -> Result<Self, PortParseError> {
        let Some(handle) = handle.filter(|h| !h.is_empty()) else {
            return Ok(SourcePort::Default);
        };
        let rest = handle
            .strip_prefix("handle-")
            .ok_or_else(|| PortParseError(handle.to_string()))?;
        let (step, outcome) = rest
            .split_once('-')
            .ok_or_else(|| PortParseError(handle.to_string()))?;
        Self::from_parts(step, outcome).ok_or_else(|| PortParseError(handle.to_string()))
    }

    fn from_parts(step: &str, outcome: &str) -> Option<Self> {
        let step = step.parse().ok()?;
        if outcome == "default" {
            Some(SourcePort::StepDefault { step })
        } else {
            let option = outcome.parse().ok()?;
            Some(SourcePort::Option { step, option })
        }
    }
}

impl fmt::Display for SourcePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePort::Default => write!(f, "default"),
            SourcePort::Option { step, option } => write!(f, "step:{}:{}", step, option),
            SourcePort::StepDefault { step } => write!(f, "step:{}:default", step),
        }
    }
}

impl FromStr for SourcePort {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "default" {
            return Ok(SourcePort::Default);
        }
        if s.starts_with("handle-") {
            return Self::from_editor_handle(Some(s));
        }
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("step"), Some(step), Some(outcome), None) => {
                Self::from_parts(step, outcome).ok_or_else(|| PortParseError(s.to_string()))
            }
            _ => Err(PortParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SourcePort {
    type Error = PortParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourcePort> for String {
    fn from(port: SourcePort) -> Self {
        port.to_string()
    }
}

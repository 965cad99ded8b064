//! Pure editing operations over a [`Graph`].
//!
//! Each operation borrows the current graph and either returns a new graph or
//! fails with the input untouched. Invariants hold for every graph produced
//! here: exactly one step-less entry node, unique ids, and at most one edge per
//! source port, with no edge pointing at a missing node or port.

use super::model::{Edge, Graph, Node, node_has_port};
use super::SourcePort;
use crate::error::{GraphError, StepViolation};
use crate::step::Step;
use serde_json::Value;
use tracing::debug;

impl Graph {
    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("{}-{}", prefix, self.next_id);
            self.next_id += 1;
            let taken = self.nodes.iter().any(|n| {
                n.id == candidate || n.steps.iter().any(|s| s.id == candidate)
            });
            if !taken {
                return candidate;
            }
        }
    }

    fn node_position(&self, node_id: &str) -> Result<usize, GraphError> {
        self.nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::DanglingReference {
                reference: node_id.to_string(),
                context: "node lookup".to_string(),
            })
    }

    /// Position of a node that is allowed to hold steps.
    fn editable_node(&self, node_id: &str) -> Result<usize, GraphError> {
        let position = self.node_position(node_id)?;
        if self.nodes[position].is_entry {
            return Err(GraphError::EntryNodeProtected {
                node_id: node_id.to_string(),
                action: "given steps",
            });
        }
        Ok(position)
    }

    fn check_step_index(&self, position: usize, index: usize) -> Result<(), GraphError> {
        let node = &self.nodes[position];
        if index < node.steps.len() {
            Ok(())
        } else {
            Err(GraphError::StepNotFound {
                node_id: node.id.clone(),
                index,
            })
        }
    }

    /// Drops edges of `node_id` whose port no longer exists on the node.
    fn prune_ports(&mut self, node_id: &str) {
        let Some(node) = self.nodes.iter().find(|n| n.id == node_id) else {
            return;
        };
        let before = self.edges.len();
        let node = node.clone();
        self.edges
            .retain(|e| e.source_node_id != node_id || node_has_port(&node, e.source_port));
        if self.edges.len() != before {
            debug!(
                node_id,
                removed = before - self.edges.len(),
                "Pruned edges on ports that no longer exist"
            );
        }
    }

    /// Adds a node holding `initial_steps`, labeled `Group #<n>`. Returns the
    /// new graph and the generated node id.
    pub fn add_node(&self, initial_steps: Vec<Step>) -> Result<(Graph, String), GraphError> {
        let group_number = self.nodes.iter().filter(|n| !n.is_entry).count() + 1;
        self.add_labeled_node(&format!("Group #{}", group_number), initial_steps)
    }

    pub fn add_labeled_node(
        &self,
        label: &str,
        initial_steps: Vec<Step>,
    ) -> Result<(Graph, String), GraphError> {
        let mut next = self.clone();
        let node_id = next.fresh_id("node");
        let mut steps = Vec::with_capacity(initial_steps.len());
        for (index, mut step) in initial_steps.into_iter().enumerate() {
            step.validate()
                .map_err(|violations| GraphError::InvalidStepPayload {
                    node_id: node_id.clone(),
                    index,
                    violations,
                })?;
            step.id = next.fresh_id("step");
            steps.push(step);
        }
        next.nodes.push(Node {
            id: node_id.clone(),
            label: label.to_string(),
            is_entry: false,
            steps,
        });
        debug!(node_id = %node_id, label, "Added node");
        Ok((next, node_id))
    }

    /// Removes a node and every edge touching it. The entry node is protected.
    pub fn remove_node(&self, node_id: &str) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        if self.nodes[position].is_entry {
            return Err(GraphError::EntryNodeProtected {
                node_id: node_id.to_string(),
                action: "removed",
            });
        }
        let mut next = self.clone();
        next.nodes.remove(position);
        next.edges
            .retain(|e| e.source_node_id != node_id && e.target_node_id != node_id);
        debug!(node_id, "Removed node");
        Ok(next)
    }

    pub fn rename_node(&self, node_id: &str, label: &str) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        let mut next = self.clone();
        next.nodes[position].label = label.to_string();
        Ok(next)
    }

    /// Appends a validated step to a node.
    pub fn add_step(&self, node_id: &str, mut step: Step) -> Result<Graph, GraphError> {
        let position = self.editable_node(node_id)?;
        let index = self.nodes[position].steps.len();
        step.validate()
            .map_err(|violations| GraphError::InvalidStepPayload {
                node_id: node_id.to_string(),
                index,
                violations,
            })?;
        let mut next = self.clone();
        step.id = next.fresh_id("step");
        debug!(node_id, step_id = %step.id, kind = %step.kind, "Added step");
        next.nodes[position].steps.push(step);
        Ok(next)
    }

    /// Removes a step, drops edges on its ports, and shifts the ports of later
    /// steps down by one so port indices stay contiguous.
    pub fn remove_step(&self, node_id: &str, step_index: usize) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        self.check_step_index(position, step_index)?;

        let mut next = self.clone();
        next.nodes[position].steps.remove(step_index);
        next.edges.retain(|e| {
            e.source_node_id != node_id || e.source_port.step_index() != Some(step_index)
        });
        for edge in next.edges.iter_mut().filter(|e| e.source_node_id == node_id) {
            if let Some(step) = edge.source_port.step_index().filter(|&s| s > step_index) {
                edge.source_port = edge.source_port.with_step(step - 1);
            }
        }
        debug!(node_id, step_index, "Removed step");
        Ok(next)
    }

    /// Reorders the steps of a node. `order[i]` is the current index of the
    /// step that should end up at position `i`; edges follow their steps.
    pub fn reorder_steps(&self, node_id: &str, order: &[usize]) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        let len = self.nodes[position].steps.len();
        let mut seen = vec![false; len];
        for &old in order {
            if old >= len || std::mem::replace(&mut seen[old], true) {
                return Err(GraphError::StepNotFound {
                    node_id: node_id.to_string(),
                    index: old,
                });
            }
        }
        if order.len() != len {
            return Err(GraphError::StepNotFound {
                node_id: node_id.to_string(),
                index: order.len(),
            });
        }

        let mut new_index = vec![0; len];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }

        let mut next = self.clone();
        let old_steps = std::mem::take(&mut next.nodes[position].steps);
        let mut slots: Vec<Option<Step>> = old_steps.into_iter().map(Some).collect();
        next.nodes[position].steps = order
            .iter()
            .filter_map(|&old| slots[old].take())
            .collect();
        for edge in next.edges.iter_mut().filter(|e| e.source_node_id == node_id) {
            if let Some(old) = edge.source_port.step_index() {
                edge.source_port = edge.source_port.with_step(new_index[old]);
            }
        }
        Ok(next)
    }

    /// Moves one step from `from` to `to`, shifting the steps in between.
    pub fn move_step(&self, node_id: &str, from: usize, to: usize) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        self.check_step_index(position, from)?;
        self.check_step_index(position, to)?;
        let mut order: Vec<usize> = (0..self.nodes[position].steps.len()).collect();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder_steps(node_id, &order)
    }

    /// Replaces a step wholesale, keeping its id.
    pub fn update_step(&self, node_id: &str, step_index: usize, mut step: Step) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        self.check_step_index(position, step_index)?;
        step.validate()
            .map_err(|violations| GraphError::InvalidStepPayload {
                node_id: node_id.to_string(),
                index: step_index,
                violations,
            })?;

        let mut next = self.clone();
        step.id = next.nodes[position].steps[step_index].id.clone();
        next.nodes[position].steps[step_index] = step;
        next.prune_ports(node_id);
        Ok(next)
    }

    /// Sets one field of a step and re-validates it before committing.
    ///
    /// `field` is `content` or a dotted path into the payload, e.g. `buttons`,
    /// `variable` or `validation.max_retries`. Shrinking a quick reply or list
    /// drops the edges of the options that disappeared.
    pub fn update_step_field(
        &self,
        node_id: &str,
        step_index: usize,
        field: &str,
        value: Value,
    ) -> Result<Graph, GraphError> {
        let position = self.node_position(node_id)?;
        self.check_step_index(position, step_index)?;
        let current = &self.nodes[position].steps[step_index];

        let invalid = |violation: StepViolation| GraphError::InvalidStepPayload {
            node_id: node_id.to_string(),
            index: step_index,
            violations: vec![violation],
        };

        let updated = set_step_field(current, field, value).map_err(invalid)?;
        self.update_step(node_id, step_index, updated)
    }

    /// Routes `source_port` of `source_node_id` to `target_node_id`.
    pub fn connect(
        &self,
        source_node_id: &str,
        source_port: SourcePort,
        target_node_id: &str,
    ) -> Result<Graph, GraphError> {
        let source = self.get_node(source_node_id)?;
        let target = self.get_node(target_node_id)?;
        if target.is_entry {
            return Err(GraphError::EntryNodeProtected {
                node_id: target_node_id.to_string(),
                action: "the target of an edge",
            });
        }
        if !node_has_port(source, source_port) {
            return Err(GraphError::DanglingReference {
                reference: format!("{}/{}", source_node_id, source_port),
                context: "connect".to_string(),
            });
        }
        if let Some(existing) = self.edge_at(source_node_id, source_port) {
            return Err(GraphError::PortAlreadyConnected {
                node_id: source_node_id.to_string(),
                port: source_port,
                target_node_id: existing.target_node_id.clone(),
            });
        }

        let mut next = self.clone();
        next.edges.push(Edge {
            source_node_id: source_node_id.to_string(),
            source_port,
            target_node_id: target_node_id.to_string(),
        });
        debug!(source_node_id, port = %source_port, target_node_id, "Connected");
        Ok(next)
    }

    /// Removes the edge on `source_port`. Succeeds without change if the port
    /// is not connected.
    pub fn disconnect(&self, source_node_id: &str, source_port: SourcePort) -> Result<Graph, GraphError> {
        let mut next = self.clone();
        next.edges
            .retain(|e| !(e.source_node_id == source_node_id && e.source_port == source_port));
        Ok(next)
    }

    pub fn rename(&self, new_name: &str) -> Result<Graph, GraphError> {
        let mut next = self.clone();
        next.name = new_name.to_string();
        Ok(next)
    }
}

/// Applies a field edit through the serialized form of the step, so the same
/// deserialization rules used for stored graphs decide what is well-formed.
fn set_step_field(step: &Step, field: &str, value: Value) -> Result<Step, StepViolation> {
    let malformed = |e: serde_json::Error| StepViolation::Malformed {
        reason: e.to_string(),
    };
    let mut doc = serde_json::to_value(step).map_err(malformed)?;
    let segments: Vec<&str> = field.split('.').filter(|s| !s.is_empty()).collect();

    let target = match segments.as_slice() {
        [] | ["id"] | ["kind"] => {
            return Err(StepViolation::ReadOnlyField {
                field: field.to_string(),
            });
        }
        ["content"] => {
            doc["content"] = value;
            return serde_json::from_value(doc).map_err(malformed);
        }
        path => {
            // Payloads serialize as `{"<shape>": {..fields..}}`.
            let inner = doc
                .get_mut("payload")
                .and_then(Value::as_object_mut)
                .and_then(|map| map.values_mut().next())
                .ok_or_else(|| StepViolation::Malformed {
                    reason: format!("{} steps have no payload field '{}'", step.kind, field),
                })?;
            (inner, path)
        }
    };

    let (mut cursor, path) = target;
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| StepViolation::ReadOnlyField {
            field: field.to_string(),
        })?;
    for segment in parents {
        cursor = cursor
            .get_mut(*segment)
            .filter(|v| v.is_object())
            .ok_or_else(|| unknown_field(step, field))?;
    }
    let object = cursor
        .as_object_mut()
        .filter(|o| o.contains_key(*last))
        .ok_or_else(|| unknown_field(step, field))?;
    object.insert(last.to_string(), value);

    serde_json::from_value(doc).map_err(malformed)
}

fn unknown_field(step: &Step, field: &str) -> StepViolation {
    StepViolation::Malformed {
        reason: format!("{} steps have no payload field '{}'", step.kind, field),
    }
}

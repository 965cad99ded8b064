use super::SourcePort;
use crate::error::{GraphError, ImportError};
use crate::step::Step;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Id and label of the entry node every new graph starts with.
pub const ENTRY_NODE_ID: &str = "start";
pub const ENTRY_NODE_LABEL: &str = "Start";

/// A named vertex holding an ordered sequence of steps (a "group" in the editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A directed transition leaving `source_port` of one node for another node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source_node_id: String,
    pub source_port: SourcePort,
    pub target_node_id: String,
}

/// The conversation graph: nodes in insertion order plus routing edges.
///
/// A `Graph` is an immutable value. Every mutator operation returns a new
/// graph and leaves `self` untouched, so history can be layered on top by
/// keeping old values around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    pub(crate) nodes: Vec<Node>,
    #[serde(default)]
    pub(crate) edges: Vec<Edge>,
    /// Counter for generated node and step ids.
    #[serde(default)]
    pub(crate) next_id: u64,
}

impl Graph {
    /// Creates a graph holding only the entry node.
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            nodes: vec![Node {
                id: ENTRY_NODE_ID.to_string(),
                label: ENTRY_NODE_LABEL.to_string(),
                is_entry: true,
                steps: Vec::new(),
            }],
            edges: Vec::new(),
            next_id: 1,
        }
    }

    /// Assembles a graph from parts and checks every invariant.
    pub fn from_parts(name: &str, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let graph = Self {
            id: None,
            name: name.to_string(),
            nodes,
            edges,
            next_id: 1,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Parses a graph from its serialized form. The result is NOT validated:
    /// graphs coming from storage are untrusted until `validate` or the
    /// compiler has checked them.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        serde_json::from_str(json).map_err(|e| ImportError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Attaches the id the flow store assigned to this graph.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Like [`Graph::node`], but a missing node is a `DanglingReference`.
    pub fn get_node(&self, node_id: &str) -> Result<&Node, GraphError> {
        self.node(node_id)
            .ok_or_else(|| GraphError::DanglingReference {
                reference: node_id.to_string(),
                context: "node lookup".to_string(),
            })
    }

    pub fn is_entry(&self, node_id: &str) -> bool {
        self.node(node_id).is_some_and(|n| n.is_entry)
    }

    /// The single entry node. Fails if there is none or more than one.
    pub fn entry(&self) -> Result<&Node, GraphError> {
        let mut entries = self.nodes.iter().filter(|n| n.is_entry);
        let first = entries.next().ok_or(GraphError::NoEntryNode)?;
        if entries.next().is_some() {
            let ids = self
                .nodes
                .iter()
                .filter(|n| n.is_entry)
                .map(|n| n.id.clone())
                .collect();
            return Err(GraphError::MultipleEntryNodes(ids));
        }
        Ok(first)
    }

    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source_node_id == node_id)
    }

    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target_node_id == node_id)
    }

    /// The edge leaving `port` of `node_id`, if the port is connected.
    pub fn edge_at(&self, node_id: &str, port: SourcePort) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source_node_id == node_id && e.source_port == port)
    }

    /// Ports contributed by one step: one per option plus a `default` port for
    /// quick reply and list steps, the node's unlabeled port for everything else.
    pub fn step_ports(&self, node_id: &str, step_index: usize) -> Result<Vec<SourcePort>, GraphError> {
        let node = self.get_node(node_id)?;
        let step = node
            .steps
            .get(step_index)
            .ok_or_else(|| GraphError::StepNotFound {
                node_id: node_id.to_string(),
                index: step_index,
            })?;
        Ok(ports_of_step(step, step_index))
    }

    /// Every port a node exposes: its unlabeled port followed by the ports of
    /// its multi-outcome steps in step order.
    pub fn node_ports(&self, node_id: &str) -> Result<Vec<SourcePort>, GraphError> {
        let node = self.get_node(node_id)?;
        Ok(ports_of_node(node))
    }

    pub fn has_port(&self, node_id: &str, port: SourcePort) -> bool {
        self.node(node_id).is_some_and(|node| node_has_port(node, port))
    }

    /// Ids of the nodes reachable from the entry node, in breadth-first order.
    pub fn reachable_from_entry(&self) -> Vec<&str> {
        let Ok(entry) = self.entry() else {
            return Vec::new();
        };
        let mut successors: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for edge in &self.edges {
            successors
                .entry(edge.source_node_id.as_str())
                .or_default()
                .push(edge.target_node_id.as_str());
        }

        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([entry.id.as_str()]);
        seen.insert(entry.id.as_str());
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &next in successors.get(current).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Checks every structural and payload invariant of the graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        let entry = self.entry()?;
        if !entry.steps.is_empty() {
            return Err(GraphError::EntryNodeProtected {
                node_id: entry.id.clone(),
                action: "given steps",
            });
        }

        let mut node_index: AHashMap<&str, &Node> = AHashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node_index.insert(node.id.as_str(), node).is_some() {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
            for (index, step) in node.steps.iter().enumerate() {
                step.validate()
                    .map_err(|violations| GraphError::InvalidStepPayload {
                        node_id: node.id.clone(),
                        index,
                        violations,
                    })?;
            }
        }

        let mut routed: AHashMap<(&str, SourcePort), &str> = AHashMap::new();
        for edge in &self.edges {
            let source = node_index
                .get(edge.source_node_id.as_str())
                .ok_or_else(|| GraphError::DanglingReference {
                    reference: edge.source_node_id.clone(),
                    context: format!("edge to '{}'", edge.target_node_id),
                })?;
            let target = node_index
                .get(edge.target_node_id.as_str())
                .ok_or_else(|| GraphError::DanglingReference {
                    reference: edge.target_node_id.clone(),
                    context: format!("edge from '{}'", edge.source_node_id),
                })?;
            if target.is_entry {
                return Err(GraphError::EntryNodeProtected {
                    node_id: target.id.clone(),
                    action: "the target of an edge",
                });
            }
            if !node_has_port(source, edge.source_port) {
                return Err(GraphError::DanglingReference {
                    reference: format!("{}/{}", edge.source_node_id, edge.source_port),
                    context: "edge source port".to_string(),
                });
            }
            if let Some(existing) = routed.insert(
                (edge.source_node_id.as_str(), edge.source_port),
                edge.target_node_id.as_str(),
            ) {
                return Err(GraphError::PortAlreadyConnected {
                    node_id: edge.source_node_id.clone(),
                    port: edge.source_port,
                    target_node_id: existing.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn ports_of_step(step: &Step, step_index: usize) -> Vec<SourcePort> {
    match step.outcome_count() {
        Some(count) => (0..count)
            .map(|option| SourcePort::Option {
                step: step_index,
                option,
            })
            .chain(std::iter::once(SourcePort::StepDefault { step: step_index }))
            .collect(),
        None => vec![SourcePort::Default],
    }
}

pub(crate) fn ports_of_node(node: &Node) -> Vec<SourcePort> {
    let mut ports = vec![SourcePort::Default];
    for (index, step) in node.steps.iter().enumerate() {
        if step.kind.is_multi_outcome() {
            ports.extend(ports_of_step(step, index));
        }
    }
    ports
}

pub(crate) fn node_has_port(node: &Node, port: SourcePort) -> bool {
    match port {
        SourcePort::Default => true,
        SourcePort::StepDefault { step } => node
            .steps
            .get(step)
            .is_some_and(|s| s.kind.is_multi_outcome()),
        SourcePort::Option { step, option } => node
            .steps
            .get(step)
            .and_then(Step::outcome_count)
            .is_some_and(|count| option < count),
    }
}

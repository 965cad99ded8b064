use super::rendering::{RenderContext, StepRenderer};
use crate::document::{Action, Layout, RenderedStep, Screen};
use crate::error::{CompileError, StepViolation};
use crate::graph::{Edge, Node, SourcePort};
use crate::step::StepKind;
use crate::variables::vars_token;
use ahash::AHashMap;
use indexmap::IndexMap;
use tracing::debug;

/// Edge lookup by source node, then port.
pub(crate) struct RouteTable<'a> {
    routes: AHashMap<&'a str, AHashMap<SourcePort, &'a str>>,
}

impl<'a> RouteTable<'a> {
    pub(super) fn new(edges: &'a [Edge]) -> Self {
        let mut routes: AHashMap<&'a str, AHashMap<SourcePort, &'a str>> = AHashMap::new();
        for edge in edges {
            routes
                .entry(edge.source_node_id.as_str())
                .or_default()
                .insert(edge.source_port, edge.target_node_id.as_str());
        }
        Self { routes }
    }

    pub(crate) fn target(&self, node_id: &str, port: SourcePort) -> Option<&'a str> {
        self.routes
            .get(node_id)
            .and_then(|ports| ports.get(&port))
            .copied()
    }
}

/// Assembles one screen per node from its steps and routes.
pub(super) struct ScreenBuilder<'a> {
    routes: &'a RouteTable<'a>,
    registry: &'a AHashMap<StepKind, Box<dyn StepRenderer>>,
    continue_label: &'a str,
    submit_label: &'a str,
}

impl<'a> ScreenBuilder<'a> {
    pub(super) fn new(
        routes: &'a RouteTable<'a>,
        registry: &'a AHashMap<StepKind, Box<dyn StepRenderer>>,
        continue_label: &'a str,
        submit_label: &'a str,
    ) -> Self {
        Self {
            routes,
            registry,
            continue_label,
            submit_label,
        }
    }

    pub(super) fn build(&self, node: &Node) -> Result<Screen, CompileError> {
        let steps = node
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let renderer = self.registry.get(&step.kind).ok_or_else(|| {
                    CompileError::InvalidStepPayload {
                        node_id: node.id.clone(),
                        index,
                        violations: vec![StepViolation::Malformed {
                            reason: format!("no renderer registered for {} steps", step.kind),
                        }],
                    }
                })?;
                let ctx = RenderContext::new(&node.id, index, self.routes, self.continue_label);
                Ok(RenderedStep {
                    step_id: step.id.clone(),
                    kind: step.kind,
                    body: step.content.clone(),
                    content: renderer.render(step, &ctx)?,
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        let successor = self.routes.target(&node.id, SourcePort::Default);
        let action = match successor {
            Some(next) => Action::Navigate {
                label: self.continue_label.to_string(),
                next: next.to_string(),
            },
            None => Action::Complete {
                label: self.submit_label.to_string(),
                payload: completion_payload(node),
            },
        };
        debug!(
            node_id = %node.id,
            steps = steps.len(),
            terminal = successor.is_none(),
            "Built screen"
        );

        Ok(Screen {
            id: node.id.clone(),
            title: node.label.clone(),
            terminal: successor.is_none(),
            layout: Layout {
                steps,
                actions: vec![action],
            },
        })
    }
}

/// `{name: token}` for the variables the node's own input steps declare,
/// first declaration wins.
fn completion_payload(node: &Node) -> IndexMap<String, String> {
    let mut payload = IndexMap::new();
    for name in node.steps.iter().filter_map(|step| step.output_variable()) {
        payload
            .entry(name.to_string())
            .or_insert_with(|| vars_token(name));
    }
    payload
}

use crate::document::{FLOW_DOCUMENT_VERSION, FlowDocument};
use crate::error::CompileError;
use crate::graph::{Graph, SourcePort};
use crate::step::StepKind;
use crate::variables::{self, VARS_NAMESPACE, Variable};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info, warn};

mod builder;
pub mod rendering;

use builder::{RouteTable, ScreenBuilder};
use rendering::*;

/// What to do when two input steps declare the same variable name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVariablePolicy {
    /// Log a warning and compile; both steps write the same token.
    #[default]
    Merge,
    /// Fail with [`CompileError::DuplicateVariable`].
    Reject,
}

/// Compiler settings. Every field has a default, so a partial JSON object is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub version: String,
    pub continue_label: String,
    pub submit_label: String,
    pub duplicate_variables: DuplicateVariablePolicy,
    pub warn_unreachable: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            version: FLOW_DOCUMENT_VERSION.to_string(),
            continue_label: "Continue".to_string(),
            submit_label: "Submit".to_string(),
            duplicate_variables: DuplicateVariablePolicy::Merge,
            warn_unreachable: true,
        }
    }
}

impl CompilerOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Turns a [`Graph`] into a [`FlowDocument`].
///
/// Compilation is a pure function of the graph and the options: the same
/// input always yields the same document.
///
/// ```
/// use kaiwa::prelude::*;
///
/// let graph = Graph::new("Greeting");
/// let (graph, hello) = graph.add_node(vec![Step::text("Hello {{contact.first_name}}")]).unwrap();
/// let graph = graph.connect("start", SourcePort::Default, &hello).unwrap();
///
/// let document = Compiler::builder(&graph).build().compile().unwrap();
/// assert_eq!(document.start.as_deref(), Some(hello.as_str()));
/// assert!(document.screens[0].terminal);
/// ```
pub struct Compiler<'g> {
    graph: &'g Graph,
    options: CompilerOptions,
    registry: AHashMap<StepKind, Box<dyn StepRenderer>>,
}

pub struct CompilerBuilder<'g> {
    graph: &'g Graph,
    options: CompilerOptions,
    registry: AHashMap<StepKind, Box<dyn StepRenderer>>,
}

impl<'g> CompilerBuilder<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut registry: AHashMap<StepKind, Box<dyn StepRenderer>> = AHashMap::new();
        register_default_renderers(&mut registry);
        Self {
            graph,
            options: CompilerOptions::default(),
            registry,
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_continue_label(mut self, label: &str) -> Self {
        self.options.continue_label = label.to_string();
        self
    }

    pub fn with_submit_label(mut self, label: &str) -> Self {
        self.options.submit_label = label.to_string();
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateVariablePolicy) -> Self {
        self.options.duplicate_variables = policy;
        self
    }

    /// Replaces the renderer for the kind the given renderer reports.
    pub fn with_custom_renderer(mut self, renderer: Box<dyn StepRenderer>) -> Self {
        self.registry.insert(renderer.kind(), renderer);
        self
    }

    pub fn build(self) -> Compiler<'g> {
        Compiler {
            graph: self.graph,
            options: self.options,
            registry: self.registry,
        }
    }
}

impl<'g> Compiler<'g> {
    pub fn builder(graph: &'g Graph) -> CompilerBuilder<'g> {
        CompilerBuilder::new(graph)
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn compile(&self) -> Result<FlowDocument, CompileError> {
        let graph = self.graph;

        // Entry errors take precedence over anything else that is wrong.
        let entry = graph.entry()?;
        graph.validate()?;

        let declared = variables::collect_variables(graph);
        self.check_duplicates(&declared)?;
        let declared_names: AHashSet<&str> = declared.iter().map(|v| v.name.as_str()).collect();

        if self.options.warn_unreachable {
            warn_unreachable(graph);
        }
        warn_undeclared_references(graph, &declared_names);

        let routes = RouteTable::new(graph.edges());
        let screen_builder = ScreenBuilder::new(
            &routes,
            &self.registry,
            &self.options.continue_label,
            &self.options.submit_label,
        );

        let screens = graph
            .nodes()
            .iter()
            .filter(|node| !node.is_entry)
            .map(|node| screen_builder.build(node))
            .collect::<Result<Vec<_>, CompileError>>()?;

        let start = routes
            .target(&entry.id, SourcePort::Default)
            .map(str::to_string);

        info!(
            graph = graph.name(),
            screens = screens.len(),
            variables = declared_names.len(),
            "Compiled flow document"
        );

        Ok(FlowDocument {
            version: self.options.version.clone(),
            start,
            screens,
        })
    }

    fn check_duplicates(&self, declared: &[Variable]) -> Result<(), CompileError> {
        let mut by_name: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for variable in declared {
            by_name
                .entry(variable.name.as_str())
                .or_default()
                .push(variable.declaring_step_id.as_str());
        }

        for (name, step_ids) in by_name.iter().filter(|(_, ids)| ids.len() > 1) {
            match self.options.duplicate_variables {
                DuplicateVariablePolicy::Merge => {
                    warn!(variable = %name, steps = ?step_ids, "Variable declared more than once");
                }
                DuplicateVariablePolicy::Reject => {
                    return Err(CompileError::DuplicateVariable {
                        name: name.to_string(),
                        step_ids: step_ids.iter().map(|id| id.to_string()).collect(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn warn_unreachable(graph: &Graph) {
    let reachable: AHashSet<&str> = graph.reachable_from_entry().into_iter().collect();
    for node in graph.nodes().iter().filter(|n| !reachable.contains(n.id.as_str())) {
        warn!(node_id = %node.id, label = %node.label, "Node is unreachable from the entry node");
    }
}

fn warn_undeclared_references(graph: &Graph, declared: &AHashSet<&str>) {
    for node in graph.nodes() {
        for step in &node.steps {
            let Some(content) = step.content.as_deref() else {
                continue;
            };
            for token in variables::referenced_tokens(content) {
                if token.namespace == VARS_NAMESPACE && !declared.contains(token.name.as_str()) {
                    warn!(
                        node_id = %node.id,
                        step_id = %step.id,
                        variable = %token.name,
                        "Content references a variable no step declares"
                    );
                }
            }
        }
    }
    debug!(nodes = graph.nodes().len(), "Checked token references");
}

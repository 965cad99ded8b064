use super::model::Graph;
use crate::error::ImportError;

/// A trait for editor or storage formats that can be converted into a `Graph`.
///
/// This is the seam between the compiler and whatever shape a UI shell saves
/// its canvas in. The crate ships one implementation for the visual editor's
/// `graph_data` format ([`crate::editor::EditorGraph`]).
///
/// # Example
///
/// ```rust,no_run
/// use kaiwa::error::ImportError;
/// use kaiwa::graph::{ENTRY_NODE_ID, Graph, IntoGraph, SourcePort};
/// use kaiwa::step::Step;
///
/// struct Outline {
///     name: String,
///     messages: Vec<String>,
/// }
///
/// impl IntoGraph for Outline {
///     fn into_graph(self) -> Result<Graph, ImportError> {
///         let mut graph = Graph::new(&self.name);
///         let mut previous = ENTRY_NODE_ID.to_string();
///         for message in &self.messages {
///             let (next, node_id) = graph.add_node(vec![Step::text(message)])?;
///             graph = next.connect(&previous, SourcePort::Default, &node_id)?;
///             previous = node_id;
///         }
///         Ok(graph)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a validated graph.
    fn into_graph(self) -> Result<Graph, ImportError>;
}

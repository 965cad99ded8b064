//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kaiwa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let editor_json = std::fs::read_to_string("path/to/graph_data.json")?;
//! let graph = EditorGraph::from_json(&editor_json)?.into_graph()?;
//!
//! let document = Compiler::builder(&graph).build().compile()?;
//! println!("{}", document.to_json()?);
//! # Ok(())
//! # }
//! ```

// Graph editing and compilation
pub use crate::compiler::{Compiler, CompilerOptions, DuplicateVariablePolicy};
pub use crate::graph::{ENTRY_NODE_ID, Edge, Graph, IntoGraph, Node, SourcePort};

// Steps
pub use crate::step::{Step, StepKind, StepPayload};

// Variables
pub use crate::variables::{Variable, available_tokens, collect_variables};

// Documents and formats
pub use crate::document::{Action, FlowDocument, Screen};
pub use crate::editor::EditorGraph;

// Persistence
pub use crate::store::{DirectoryFlowStore, FlowStore, MemoryFlowStore};

// Error types
pub use crate::error::{CompileError, GraphError, ImportError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

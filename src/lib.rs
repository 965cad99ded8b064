//! # Kaiwa - Conversation Flow Compiler
//!
//! **Kaiwa** turns node-based chatbot conversation graphs into portable flow
//! documents for a messaging runtime. Graphs are edited as immutable values
//! through a mutator that never lets an invalid state in, and compilation is
//! deterministic: an unchanged graph always produces the same document.
//!
//! ## Core Workflow
//!
//! 1.  **Build or Load a Graph**: Start from `Graph::new`, load a stored graph
//!     with `Graph::from_json`, or convert an editor format through the
//!     `IntoGraph` trait (the visual editor's format ships as `EditorGraph`).
//! 2.  **Edit**: Every mutator call (`add_node`, `add_step`, `connect`, ...)
//!     returns a new graph or an error, leaving the input untouched.
//! 3.  **Resolve Variables**: `variables::collect_variables` and
//!     `variables::available_tokens` list the `{{vars.*}}` and `{{contact.*}}`
//!     tokens message editors may insert.
//! 4.  **Compile**: `Compiler::builder(&graph).build().compile()` produces a
//!     `FlowDocument`, which can be written as JSON or as a compact binary artifact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let graph = Graph::new("Signup");
//!
//!     // Ask for an email address, then thank the contact by name.
//!     let (graph, ask) = graph.add_node(vec![Step::input(
//!         StepKind::EmailInput,
//!         "What is your email?",
//!         "user_email",
//!     )])?;
//!     let (graph, thanks) = graph.add_node(vec![Step::text(
//!         "Thanks {{contact.first_name}}, we will write to {{vars.user_email}}.",
//!     )])?;
//!     let graph = graph
//!         .connect(ENTRY_NODE_ID, SourcePort::Default, &ask)?
//!         .connect(&ask, SourcePort::Default, &thanks)?;
//!
//!     for variable in collect_variables(&graph) {
//!         println!("{} -> {}", variable.name, variable.token);
//!     }
//!
//!     let document = Compiler::builder(&graph)
//!         .with_submit_label("Finish")
//!         .build()
//!         .compile()?;
//!     println!("{}", document.to_json_pretty()?);
//!
//!     document.save("signup.flow")?;
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod document;
pub mod editor;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod step;
pub mod store;
pub mod variables;

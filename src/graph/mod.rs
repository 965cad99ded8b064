//! The conversation graph: nodes of steps joined by port-addressed edges.

pub mod conversion;
pub mod model;
pub mod mutator;
pub mod port;

pub use conversion::*;
pub use model::*;
pub use port::*;

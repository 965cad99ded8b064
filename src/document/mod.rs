pub mod artifact;
pub mod types;

pub use types::*;

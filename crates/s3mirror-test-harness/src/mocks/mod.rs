//! Mock collaborators.

pub mod doubles;
pub mod network;

pub use doubles::*;
pub use network::*;

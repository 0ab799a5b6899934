//! Configuration types for s3mirror.
//!
//! Settings come from `.s3mirror/config.yaml` (with `${VAR}` expansion), then
//! from well-known environment variables, then are validated.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;

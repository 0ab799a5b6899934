//! Synchronous mirroring of storage operations to an external function.
//!
//! Each mutating storage call is packaged with the caller's credential and
//! the content hash, sent to the configured function exactly once, and
//! classified into a [`MirrorOutcome`]. Callers at the storage-API boundary
//! only see [`StorageError::BackendDown`]; the detailed [`MirrorError`] is
//! kept for logs.

pub mod announce;
pub mod context;
pub mod credentials;
pub mod error;
pub mod function;
pub mod hash;
pub mod invoker;
pub mod model;

pub use announce::GatewayAnnouncer;
pub use context::RequestContext;
pub use credentials::{extract_auth_token, AUTH_KEY};
pub use error::{InvokeError, MirrorError, MirrorOutcome, StorageError};
pub use function::{FunctionInvoker, HttpFunctionInvoker, InvokeOutput};
pub use hash::convert_to_hash_v0;
pub use invoker::MirrorInvoker;
pub use model::{
    FunctionResponse, MirrorEntry, MirrorRequest, StorageOperation, HASH_MARKER_HEADER,
};

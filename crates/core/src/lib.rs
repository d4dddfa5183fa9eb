//! Domain primitives shared by every Alms crate.
//!
//! Nothing in here performs I/O: status constants, validation helpers,
//! money conversion and the [`error::CoreError`] type used across the
//! database, gateway and API layers.

pub mod aid_request;
pub mod cause;
pub mod donation;
pub mod error;
pub mod money;
pub mod pagination;
pub mod roles;
pub mod storage;
pub mod types;

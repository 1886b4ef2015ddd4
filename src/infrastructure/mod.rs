//! Store adapters implementing the domain ports.
//!
//! `in_memory` keeps state for the lifetime of the process; `json_file` adds durable,
//! human-readable files replaced atomically on every write. `data_lock` keeps writers in
//! separate processes from overlapping on the same files.

pub mod data_lock;
pub mod in_memory;
pub mod json_file;

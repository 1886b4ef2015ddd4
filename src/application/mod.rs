//! Application layer: order validation, stock commit and the processor that
//! sequences them against the catalog and ledger ports.

pub mod committer;
pub mod processor;
pub mod validator;

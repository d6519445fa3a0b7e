//! Host-facing wire contract and the stdin/stdout bridge.

pub mod contract;
pub mod stdio;

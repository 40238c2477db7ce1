//! Core models for the mock price oracle
//!
//! This crate defines the wire types shared by the server and its callers:
//! - JSON-RPC 2.0 request/response envelopes and error codes
//! - Foreign call requests issued by the circuit toolchain
//! - Foreign call results and the values they carry

mod foreign_call;
mod jsonrpc;

pub use foreign_call::*;
pub use jsonrpc::*;

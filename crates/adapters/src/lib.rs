//! ig-poster adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `graph_api`: HTTPS and offline implementations of the Graph API port
//! - `env_file`: Shell env file written by the setup flow

pub mod env_file;
pub mod graph_api;

pub use graph_api::{HttpGraphApi, RecordedCall, StubGraphApi};

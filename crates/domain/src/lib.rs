//! ig-poster domain crate
//!
//! This crate contains the core publishing logic following hexagonal architecture:
//! - `model`: Messages, client configuration and response types
//! - `policy`: Image reference rules applied before anything touches the network
//! - `ports`: The Graph API boundary implemented by adapters
//! - `usecases`: Publishing (`InstagramClient`) and onboarding (`SetupFlow`)

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use usecases::{InstagramClient, SetupFlow};

//! Application use cases / business logic

pub mod client;
pub mod setup;

pub use client::InstagramClient;
pub use setup::{SetupFlow, select_page};

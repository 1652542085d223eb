//! Core domain models and business logic for the schema designer

pub mod cloud;
pub mod config;
pub mod connectors;
pub mod events;
pub mod notification;
pub mod reconcile;
mod schema;
pub mod session;
mod store;
#[cfg(test)]
mod tests;

pub use schema::*;
pub use store::*;

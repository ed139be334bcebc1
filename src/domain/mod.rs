//! # Domain Layer
//!
//! Sessions, messages, response events and answers.
//! This layer is independent of the model provider and the transports.

mod error;
pub mod models;

pub use error::*;
pub use models::*;

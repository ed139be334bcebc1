//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Model backends (Gemini over HTTP, offline mock, scripted replies)
//! - Session storage (in-memory)
//! - Reference text (local file)
//!
//! and the transports built on top of them: the command router, the HTTP
//! API and the interactive terminal loop.

pub mod adapter;
pub mod api;
pub mod http;
pub mod terminal;

pub use adapter::*;

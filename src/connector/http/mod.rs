//! HTTP API: `GET /` and `POST /chat`.

mod server;
mod types;

pub use server::*;
pub use types::*;

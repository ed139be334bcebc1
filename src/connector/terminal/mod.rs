//! Interactive question loop on stdin/stdout.

mod chat_loop;

pub use chat_loop::*;

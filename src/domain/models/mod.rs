mod agent;
mod answer;
mod event;
mod message;
mod reference;
mod session;

pub use agent::*;
pub use answer::*;
pub use event::*;
pub use message::*;
pub use reference::*;
pub use session::*;

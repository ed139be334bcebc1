mod model_backend;
mod reference_source;
mod session_repository;

pub use model_backend::*;
pub use reference_source::*;
pub use session_repository::*;

mod file_reference_source;
mod gemini_backend;
mod in_memory_session_repository;
mod mock_model_backend;
mod scripted_model_backend;

pub use file_reference_source::*;
pub use gemini_backend::*;
pub use in_memory_session_repository::*;
pub use mock_model_backend::*;
pub use scripted_model_backend::*;

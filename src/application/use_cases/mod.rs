mod answer_question;
mod ask_agent;
mod compose_prompt;

pub use answer_question::*;
pub use ask_agent::*;
pub use compose_prompt::*;

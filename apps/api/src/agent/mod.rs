//! Agent layer: intent classification, session memory, tools, the bounded
//! reasoning loop, and the dispatcher tying them together.

pub mod intent;
pub mod prompts;
pub mod reasoning;
pub mod router;
pub mod session;
pub mod tools;

//! Chat handling - the tool-calling round trip behind the HTTP endpoint

mod orchestrator;

pub use orchestrator::{ChatOrchestrator, ChatReply, HONORED_INVOCATION};

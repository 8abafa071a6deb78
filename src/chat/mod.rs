//! The interactive chat core: command parsing, config and session
//! persistence, in-memory conversation state, and topic-based session
//! naming.  The `gpterm` binary wires these together into a REPL.

pub mod commands;
pub mod config;
pub mod session;
pub mod store;
pub mod topic;

pub use commands::{Command, help_text, parse_command};
pub use config::{ChatArgs, Config, ConfigStore, SetOption, normalize_history};
pub use session::ChatSession;
pub use store::SessionStore;
pub use topic::{TopicNamer, TopicOutcome};

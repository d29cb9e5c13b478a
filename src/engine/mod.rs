//! Engine collaborators the bridge can drive.
//!
//! [`Engine`] is the seam; [`ProcessEngine`] talks to an external executable
//! and [`ScriptedEngine`] answers in-process from canned responses.

mod capture;
mod error;
mod process;
mod protocol;
mod scripted;

pub use capture::CapturedOutput;
pub use error::EngineError;
pub use process::{
    ProcessConfig, ProcessEngine, DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_SEARCH_GRACE_MS,
};
pub use protocol::Engine;
pub use scripted::{FailMode, ScriptedEngine};

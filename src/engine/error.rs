//! Error types for engine collaborators.

use std::fmt;
use std::io;

/// Error type for engine session failures
#[derive(Debug)]
pub enum EngineError {
    /// `run` called without a successful `init`
    NotInitialized,
    /// Engine executable could not be started
    Spawn { program: String, source: io::Error },
    /// Reading from or writing to the engine failed
    Io(io::Error),
    /// Engine stopped answering before acknowledging a handshake step
    Handshake { expected: &'static str },
    /// No answer before the deadline
    Timeout { after_ms: u64 },
    /// Engine process terminated unsuccessfully before reporting a move
    Exited { code: Option<i32> },
    /// Engine refused the session
    Rejected(String),
    /// Engine code panicked while running
    Panicked(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotInitialized => write!(f, "Engine was not initialized"),
            EngineError::Spawn { program, source } => {
                write!(f, "Failed to start engine '{program}': {source}")
            }
            EngineError::Io(e) => write!(f, "Engine I/O error: {e}"),
            EngineError::Handshake { expected } => {
                write!(f, "Engine closed its output before sending '{expected}'")
            }
            EngineError::Timeout { after_ms } => {
                write!(f, "Engine did not answer within {after_ms} ms")
            }
            EngineError::Exited { code: Some(code) } => {
                write!(f, "Engine exited with status {code}")
            }
            EngineError::Exited { code: None } => write!(f, "Engine was terminated by a signal"),
            EngineError::Rejected(reason) => write!(f, "Engine rejected the session: {reason}"),
            EngineError::Panicked(msg) => write!(f, "Engine panicked: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Spawn { source, .. } => Some(source),
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_errors_keep_their_source() {
        let err = EngineError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Engine I/O error: pipe closed");
    }

    #[test]
    fn exit_status_is_reported() {
        assert_eq!(
            EngineError::Exited { code: Some(3) }.to_string(),
            "Engine exited with status 3"
        );
        assert_eq!(
            EngineError::Exited { code: None }.to_string(),
            "Engine was terminated by a signal"
        );
    }
}

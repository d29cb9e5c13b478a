use std::fmt;

/// The two protocol lines a query feeds to the engine.
///
/// Both the position and the time budget are embedded verbatim. No `quit`
/// follows: the engine's loop ends when its input runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScript {
    position: String,
    go: String,
}

impl CommandScript {
    /// Build the script for one query.
    ///
    /// A position containing a line break is rejected, since it would turn into
    /// extra protocol commands.
    pub fn new(position: &str, movetime_ms: i64) -> Result<Self, ScriptError> {
        if let Some(offset) = position.find(['\n', '\r']) {
            return Err(ScriptError::LineBreak { offset });
        }
        Ok(CommandScript {
            position: format!("position fen {position}"),
            go: format!("go movetime {movetime_ms}"),
        })
    }

    #[must_use]
    pub fn lines(&self) -> [&str; 2] {
        [&self.position, &self.go]
    }

    /// Newline-terminated text of the script, ready to be read as a stream.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.position, self.go)
    }
}

impl fmt::Display for CommandScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.position, self.go)
    }
}

/// Error type for command script construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Position contains a line break at the given byte offset
    LineBreak { offset: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::LineBreak { offset } => {
                write!(f, "Position contains a line break at byte {offset}")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

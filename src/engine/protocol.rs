//! The seam between the bridge and an engine speaking the line protocol.

use std::io::{BufRead, Write};

use super::EngineError;
use crate::uci::EngineOptions;

/// A chess engine reached through a line-oriented text protocol.
///
/// A query calls [`Engine::init`] and then [`Engine::run`] exactly once, in
/// that order, while holding exclusive access to the engine.
pub trait Engine: Send {
    /// Engine name (for logging/debugging)
    fn name(&self) -> &str;

    /// Reset engine-wide state and apply `options`.
    ///
    /// Runs before every query; implementations must not carry state from
    /// a previous session past this call.
    fn init(&mut self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Run the command loop over `input` until it is exhausted, writing every
    /// protocol line the engine emits to `output`.
    ///
    /// End of input is an implicit terminate. A search started by `go` is
    /// allowed to finish and report before the call returns.
    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        (**self).init(options)
    }

    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<(), EngineError> {
        (**self).run(input, output)
    }
}

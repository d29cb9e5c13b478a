//! One-shot best-move queries against an engine collaborator.
//!
//! A query reinitializes the engine, feeds it a two-line command script,
//! captures everything it prints and picks the move out of the first
//! `bestmove` line. Queries on one adapter are serialized.

use std::any::Any;
use std::fmt;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, trace, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::engine::{CapturedOutput, Engine, EngineError};
use crate::uci::{scan_bestmove, BestMove, CommandScript, EngineOptions, ReportError, ScriptError};

/// Result token standing in for every kind of failure.
pub const SENTINEL: &str = "error";

/// Why a query produced no move.
#[derive(Debug)]
pub enum QueryError {
    /// Position cannot be embedded in a single protocol line
    MalformedInput(ScriptError),
    /// Engine output contained no `bestmove` line
    NoResult,
    /// The first `bestmove` line could not be parsed
    MalformedReport(ReportError),
    /// Engine failed, panicked or could not be started
    EngineFault(EngineError),
    /// Another query holds the engine (only from `try_query`)
    Busy,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::MalformedInput(e) => write!(f, "Malformed input: {e}"),
            QueryError::NoResult => write!(f, "Engine reported no best move"),
            QueryError::MalformedReport(e) => write!(f, "Malformed engine report: {e}"),
            QueryError::EngineFault(e) => write!(f, "Engine fault: {e}"),
            QueryError::Busy => write!(f, "Another query is in progress"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::MalformedInput(e) => Some(e),
            QueryError::MalformedReport(e) => Some(e),
            QueryError::EngineFault(e) => Some(e),
            QueryError::NoResult | QueryError::Busy => None,
        }
    }
}

impl From<ScriptError> for QueryError {
    fn from(e: ScriptError) -> Self {
        QueryError::MalformedInput(e)
    }
}

impl From<ReportError> for QueryError {
    fn from(e: ReportError) -> Self {
        QueryError::MalformedReport(e)
    }
}

impl From<EngineError> for QueryError {
    fn from(e: EngineError) -> Self {
        QueryError::EngineFault(e)
    }
}

/// Serialized access to one engine for best-move queries.
pub struct QueryAdapter<E> {
    engine: Mutex<E>,
    options: EngineOptions,
}

impl<E: Engine> QueryAdapter<E> {
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, EngineOptions::new())
    }

    /// Adapter applying `options` on every initialization.
    ///
    /// The thread count is always forced to one.
    #[must_use]
    pub fn with_options(engine: E, mut options: EngineOptions) -> Self {
        if options.threads != 1 {
            debug!("ignoring threads={} for engine '{}'", options.threads, engine.name());
            options.threads = 1;
        }
        QueryAdapter {
            engine: Mutex::new(engine),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Exclusive access to the engine; queries block while the guard lives.
    pub fn engine(&self) -> MutexGuard<'_, E> {
        self.engine.lock()
    }

    /// Ask for the best move in `position` (FEN) within `movetime_ms`.
    ///
    /// Blocks until any in-flight query on this adapter completes.
    pub fn query(&self, position: &str, movetime_ms: i64) -> Result<BestMove, QueryError> {
        let mut engine = self.engine.lock();
        self.query_locked(&mut engine, position, movetime_ms)
    }

    /// Like [`query`](Self::query) but fails with [`QueryError::Busy`] instead
    /// of waiting for another query.
    pub fn try_query(&self, position: &str, movetime_ms: i64) -> Result<BestMove, QueryError> {
        let mut engine = self.engine.try_lock().ok_or(QueryError::Busy)?;
        self.query_locked(&mut engine, position, movetime_ms)
    }

    /// Best move token, or [`SENTINEL`] on any failure.
    ///
    /// The sentinel does not tell apart a missing report, malformed input or
    /// an engine crash; use [`query`](Self::query) when the cause matters.
    pub fn query_best_move(&self, position: &str, movetime_ms: i64) -> String {
        match self.query(position, movetime_ms) {
            Ok(best) => best.mv,
            Err(e) => {
                warn!("best move query failed: {e}");
                SENTINEL.to_string()
            }
        }
    }

    fn query_locked(
        &self,
        engine: &mut E,
        position: &str,
        movetime_ms: i64,
    ) -> Result<BestMove, QueryError> {
        let script = CommandScript::new(position, movetime_ms)?;

        engine.init(&self.options)?;
        debug!("querying '{}': {script}", engine.name());

        let text = execute(engine, &script)?.into_text();
        for line in text.lines() {
            trace!("captured: {line}");
        }

        let best = scan_bestmove(&text).ok_or(QueryError::NoResult)??;
        debug!("engine '{}' answered {best}", engine.name());
        Ok(best)
    }
}

/// Run `script` through the engine's command loop into a fresh capture.
///
/// The capture is dropped on failure; a panic inside the engine becomes
/// [`EngineError::Panicked`].
fn execute<E: Engine>(engine: &mut E, script: &CommandScript) -> Result<CapturedOutput, EngineError> {
    let mut capture = CapturedOutput::new();
    let mut input = Cursor::new(script.render());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.run(&mut input, &mut capture)));
    match outcome {
        Ok(Ok(())) => Ok(capture),
        Ok(Err(e)) => Err(e),
        Err(payload) => Err(EngineError::Panicked(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FailMode, ScriptedEngine};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn extracts_move_from_report() {
        let adapter =
            QueryAdapter::new(ScriptedEngine::new().with_bestmove(START_FEN, "e2e4 ponder e7e5"));
        let best = adapter.query(START_FEN, 100).unwrap();
        assert_eq!(best.mv, "e2e4");
        assert_eq!(best.ponder.as_deref(), Some("e7e5"));
        assert_eq!(adapter.query_best_move(START_FEN, 100), "e2e4");
    }

    #[test]
    fn sends_exactly_the_two_script_lines() {
        let adapter = QueryAdapter::new(ScriptedEngine::new().with_fallback("a2a3"));
        adapter.query(START_FEN, 250).unwrap();

        let engine = adapter.engine();
        assert_eq!(
            engine.commands_seen(),
            [format!("position fen {START_FEN}"), "go movetime 250".to_string()]
        );
    }

    #[test]
    fn initializes_on_every_query_with_one_thread() {
        let mut options = EngineOptions::new().with_hash_mb(16);
        options.threads = 8;
        let adapter = QueryAdapter::with_options(ScriptedEngine::new().with_fallback("e2e4"), options);
        assert_eq!(adapter.options().threads, 1);

        for _ in 0..3 {
            adapter.query(START_FEN, 10).unwrap();
        }
        let engine = adapter.engine();
        assert_eq!(engine.init_count(), 3);
        assert_eq!(engine.threads(), 1);
        assert_eq!(engine.options().hash_mb, Some(16));
    }

    #[test]
    fn missing_report_is_no_result() {
        let adapter = QueryAdapter::new(
            ScriptedEngine::new().with_raw_output(START_FEN, &["info depth 1", "info string stop"]),
        );
        assert!(matches!(adapter.query(START_FEN, 10), Err(QueryError::NoResult)));
        assert_eq!(adapter.query_best_move(START_FEN, 10), SENTINEL);
    }

    #[test]
    fn first_report_wins() {
        let adapter = QueryAdapter::new(
            ScriptedEngine::new().with_raw_output(START_FEN, &["bestmove g1f3", "bestmove e2e4"]),
        );
        assert_eq!(adapter.query_best_move(START_FEN, 10), "g1f3");
    }

    #[test]
    fn empty_report_is_malformed() {
        let adapter =
            QueryAdapter::new(ScriptedEngine::new().with_raw_output(START_FEN, &["bestmove"]));
        assert!(matches!(
            adapter.query(START_FEN, 10),
            Err(QueryError::MalformedReport(ReportError::MissingMove { .. }))
        ));
    }

    #[test]
    fn line_breaks_never_reach_the_engine() {
        let adapter = QueryAdapter::new(ScriptedEngine::new().with_fallback("e2e4"));
        let err = adapter.query("8/8/8/8/8/8/8/8 w - -\nquit", 10).unwrap_err();
        assert!(matches!(err, QueryError::MalformedInput(_)));
        assert_eq!(adapter.engine().init_count(), 0);
    }

    #[test]
    fn engine_errors_and_panics_are_faults() {
        let adapter = QueryAdapter::new(ScriptedEngine::new().failing(FailMode::Error));
        assert!(matches!(
            adapter.query(START_FEN, 10),
            Err(QueryError::EngineFault(EngineError::Rejected(_)))
        ));

        let adapter = QueryAdapter::new(ScriptedEngine::new().failing(FailMode::Panic));
        match adapter.query(START_FEN, 10) {
            Err(QueryError::EngineFault(EngineError::Panicked(msg))) => {
                assert_eq!(msg, "scripted engine fault");
            }
            other => panic!("expected panic fault, got {other:?}"),
        }
        assert_eq!(adapter.query_best_move(START_FEN, 10), SENTINEL);
    }

    #[test]
    fn try_query_reports_busy() {
        let adapter = QueryAdapter::new(ScriptedEngine::new().with_fallback("e2e4"));
        let guard = adapter.engine();
        assert!(matches!(adapter.try_query(START_FEN, 10), Err(QueryError::Busy)));
        drop(guard);
        assert_eq!(adapter.try_query(START_FEN, 10).unwrap().mv, "e2e4");
    }

    #[test]
    fn panic_payloads_are_described() {
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}

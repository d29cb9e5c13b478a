//! Universal Chess Interface (UCI) protocol pieces used by the bridge.
//!
//! Outbound: the per-query [`CommandScript`] and engine [`EngineOptions`].
//! Inbound: command parsing for in-process engines and the `bestmove` report.

pub mod command;
pub mod options;
pub mod report;
pub mod script;

pub use command::{parse_uci_command, UciCommand};
pub use options::{parse_setoption, EngineOptions, DEFAULT_THREADS};
pub use report::{find_bestmove_line, scan_bestmove, BestMove, ReportError, BESTMOVE_MARKER};
pub use script::{CommandScript, ScriptError};

//! Synchronous best-move queries against UCI chess engines.
//!
//! [`QueryAdapter`] turns a FEN position and a time budget into a single move
//! token by running one search on an [`Engine`]. The [`ffi`] module exposes
//! the same operation over a C ABI.

pub mod adapter;
pub mod engine;
pub mod ffi;
pub mod uci;

pub use adapter::{QueryAdapter, QueryError, SENTINEL};
pub use engine::{Engine, EngineError, FailMode, ProcessConfig, ProcessEngine, ScriptedEngine};
pub use uci::{BestMove, CommandScript, EngineOptions};

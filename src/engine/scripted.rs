//! In-process engine answering searches from a table of canned responses.
//!
//! Speaks enough of the protocol to stand in for a real engine: handshake,
//! options, `position` and `go`. Used by tests, benchmarks and the
//! `scripted_engine` binary.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use log::debug;

use super::{Engine, EngineError};
use crate::uci::command::{go_movetime, position_key};
use crate::uci::{parse_setoption, parse_uci_command, EngineOptions, UciCommand};

/// How a scripted engine misbehaves when asked to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailMode {
    #[default]
    None,
    /// `run` returns [`EngineError::Rejected`]
    Error,
    /// `run` panics
    Panic,
}

#[derive(Debug, Clone)]
enum Response {
    /// Body of the `bestmove` line, e.g. `e2e4 ponder e7e5`
    BestMove(String),
    /// Lines emitted as-is instead of a `bestmove` report
    Raw(Vec<String>),
}

pub struct ScriptedEngine {
    responses: HashMap<String, Response>,
    fallback: Option<String>,
    chatter: bool,
    echo: bool,
    silent: bool,
    fail: FailMode,
    reject_negative_movetime: bool,
    options: EngineOptions,
    position: Option<String>,
    initialized: bool,
    init_count: usize,
    commands_seen: Vec<String>,
}

impl ScriptedEngine {
    /// An engine answering `bestmove (none)` for every position.
    #[must_use]
    pub fn new() -> Self {
        ScriptedEngine {
            responses: HashMap::new(),
            fallback: None,
            chatter: false,
            echo: false,
            silent: false,
            fail: FailMode::None,
            reject_negative_movetime: true,
            options: EngineOptions::new(),
            position: None,
            initialized: false,
            init_count: 0,
            commands_seen: Vec::new(),
        }
    }

    /// Answer `bestmove <body>` when searching `fen`.
    #[must_use]
    pub fn with_bestmove(mut self, fen: &str, body: impl Into<String>) -> Self {
        self.responses
            .insert(normalize(fen), Response::BestMove(body.into()));
        self
    }

    /// Emit `lines` verbatim when searching `fen`.
    #[must_use]
    pub fn with_raw_output(mut self, fen: &str, lines: &[&str]) -> Self {
        let lines = lines.iter().map(|l| (*l).to_string()).collect();
        self.responses.insert(normalize(fen), Response::Raw(lines));
        self
    }

    /// Answer `bestmove <body>` for positions without a specific response.
    #[must_use]
    pub fn with_fallback(mut self, body: impl Into<String>) -> Self {
        self.fallback = Some(body.into());
        self
    }

    /// Emit `info` lines ahead of each report.
    #[must_use]
    pub fn with_chatter(mut self) -> Self {
        self.chatter = true;
        self
    }

    /// Repeat every received line as `info string received <line>`.
    #[must_use]
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Never report a best move.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    #[must_use]
    pub fn failing(mut self, mode: FailMode) -> Self {
        self.fail = mode;
        self
    }

    /// Search even when `movetime` is negative.
    #[must_use]
    pub fn accept_negative_movetime(mut self) -> Self {
        self.reject_negative_movetime = false;
        self
    }

    /// Number of `init` calls so far.
    #[must_use]
    pub fn init_count(&self) -> usize {
        self.init_count
    }

    /// Search threads currently configured.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.options.threads
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Every non-blank line received by `run` since the last `init`.
    #[must_use]
    pub fn commands_seen(&self) -> &[String] {
        &self.commands_seen
    }

    fn handle_position(&mut self, parts: &[String], output: &mut dyn Write) -> Result<(), EngineError> {
        self.position = position_key(parts).filter(|key| {
            key == "startpos" || key.starts_with("startpos ") || key.split_whitespace().count() >= 4
        });
        if self.position.is_none() {
            emit(output, &format!("info string Error: invalid position '{}'", parts.join(" ")))?;
        }
        Ok(())
    }

    fn handle_go(&mut self, parts: &[String], output: &mut dyn Write) -> Result<(), EngineError> {
        match self.fail {
            FailMode::None => {}
            FailMode::Error => return Err(EngineError::Rejected("scripted failure".to_string())),
            FailMode::Panic => panic!("scripted engine fault"),
        }

        if let Some(raw) = go_movetime(parts) {
            match raw.parse::<i64>() {
                Ok(ms) if ms >= 0 || !self.reject_negative_movetime => {}
                _ => {
                    return emit(output, &format!("info string Error: invalid movetime '{raw}'"));
                }
            }
        }

        let Some(position) = self.position.as_deref() else {
            return emit(output, "info string Error: no position set");
        };

        let body = match self.responses.get(position) {
            Some(Response::Raw(lines)) => {
                for line in lines {
                    emit(output, line)?;
                }
                return Ok(());
            }
            Some(Response::BestMove(body)) => body.clone(),
            None => self.fallback.clone().unwrap_or_else(|| "(none)".to_string()),
        };

        if self.chatter {
            let mv = body.split_whitespace().next().unwrap_or_default();
            emit(output, &format!("info depth 1 seldepth 1 score cp 0 nodes 1 time 0 pv {mv}"))?;
            emit(output, &format!("info string threads {}", self.options.threads))?;
        }
        if self.silent {
            return Ok(());
        }
        emit(output, &format!("bestmove {body}"))
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn init(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.options = options.clone();
        self.position = None;
        self.commands_seen.clear();
        self.initialized = true;
        self.init_count += 1;
        debug!("scripted engine initialized with {} thread(s)", self.options.threads);
        Ok(())
    }

    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let Some(cmd) = parse_uci_command(&line) else {
                continue;
            };
            let received = line.trim_end_matches(['\r', '\n']);
            if self.echo {
                emit(output, &format!("info string received {received}"))?;
            }
            self.commands_seen.push(received.to_string());

            match cmd {
                UciCommand::Uci => {
                    emit(output, "id name ScriptedEngine")?;
                    emit(output, "uciok")?;
                }
                UciCommand::IsReady => emit(output, "readyok")?,
                UciCommand::UciNewGame => self.position = None,
                UciCommand::SetOption(parts) => {
                    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                    if let Some((name, value)) = parse_setoption(&parts) {
                        self.options.apply_setoption(&name, value.as_deref());
                    }
                }
                UciCommand::Position(parts) => self.handle_position(&parts, output)?,
                UciCommand::Go(parts) => self.handle_go(&parts, output)?,
                UciCommand::Stop => {}
                UciCommand::Quit => break,
                UciCommand::Unknown(text) => {
                    emit(output, &format!("info string Unknown command: {text}"))?;
                }
            }
        }
        Ok(())
    }
}

fn normalize(fen: &str) -> String {
    fen.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn emit(output: &mut dyn Write, line: &str) -> Result<(), EngineError> {
    writeln!(output, "{line}")?;
    output.flush()?;
    Ok(())
}

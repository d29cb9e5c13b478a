//! Engine collaborator backed by an external UCI executable.
//!
//! Every query starts a fresh process: `init` spawns it and completes the
//! `uci`/`isready` handshake, `run` forwards the query's commands, waits for
//! the `bestmove` report, then closes the engine's input and reaps it.

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Engine, EngineError};
use crate::uci::command::go_movetime;
use crate::uci::report::is_bestmove_line;
use crate::uci::{parse_uci_command, EngineOptions, UciCommand};

/// Default limit on each handshake step (5 s)
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5_000;

/// Default time allowed past the requested movetime (2 s)
pub const DEFAULT_SEARCH_GRACE_MS: u64 = 2_000;

/// How to start and supervise the engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Limit on the wait for `uciok` and for `readyok`
    pub handshake_timeout_ms: u64,
    /// Added to the `go movetime` budget before the search is abandoned
    pub search_grace_ms: u64,
}

impl ProcessConfig {
    #[must_use]
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessConfig {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            search_grace_ms: DEFAULT_SEARCH_GRACE_MS,
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_handshake_timeout_ms(mut self, ms: u64) -> Self {
        self.handshake_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn with_search_grace_ms(mut self, ms: u64) -> Self {
        self.search_grace_ms = ms;
        self
    }
}

pub struct ProcessEngine {
    config: ProcessConfig,
    name: String,
    session: Option<Session>,
}

impl ProcessEngine {
    #[must_use]
    pub fn new(config: ProcessConfig) -> Self {
        let name = config.program.display().to_string();
        ProcessEngine {
            config,
            name,
            session: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    fn handshake_deadline(&self) -> Deadline {
        Deadline::after_ms(self.config.handshake_timeout_ms)
    }
}

impl Engine for ProcessEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        // Drop any leftover session so its process is killed first.
        self.session = None;

        let mut session = Session::spawn(&self.config)?;

        session.send("uci")?;
        let deadline = self.handshake_deadline();
        while let Some(line) = session.read_line(Some(deadline))? {
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.trim().to_string();
            }
            if line.trim() == "uciok" {
                break;
            }
        }
        if !session.saw_last("uciok") {
            return Err(EngineError::Handshake { expected: "uciok" });
        }

        for line in options.setoption_lines() {
            session.send(&line)?;
        }

        session.send("isready")?;
        let deadline = self.handshake_deadline();
        session.wait_for("readyok", deadline)?;

        debug!("engine '{}' ready with {} thread(s)", self.name, options.threads);
        self.session = Some(session);
        Ok(())
    }

    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<(), EngineError> {
        let mut session = self.session.take().ok_or(EngineError::NotInitialized)?;

        let mut search_deadline = None;
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let command = line.trim_end_matches(['\r', '\n']);
            match parse_uci_command(command) {
                None => continue,
                Some(UciCommand::Go(parts)) => {
                    let budget = go_movetime(&parts)
                        .and_then(|v| v.parse::<i64>().ok())
                        .unwrap_or(0)
                        .max(0)
                        .unsigned_abs();
                    search_deadline = Some(Deadline::after_ms(
                        budget.saturating_add(self.config.search_grace_ms),
                    ));
                }
                Some(_) => {}
            }
            session.send(command)?;
        }

        // End of input: let a pending search report before shutting down.
        // Past the deadline the search ends unreported, as at end of input.
        let mut reported = false;
        if let Some(deadline) = search_deadline {
            loop {
                match session.read_line(Some(deadline)) {
                    Ok(Some(line)) => {
                        writeln!(output, "{line}")?;
                        if is_bestmove_line(&line) {
                            reported = true;
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(EngineError::Timeout { after_ms }) => {
                        warn!("engine '{}' sent no bestmove within {after_ms} ms", self.name);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        session.close_input();
        let drain_deadline = Deadline::after_ms(self.config.search_grace_ms);
        loop {
            match session.read_line(Some(drain_deadline)) {
                Ok(Some(line)) => writeln!(output, "{line}")?,
                Ok(None) => break,
                Err(e @ EngineError::Timeout { .. }) => {
                    warn!("engine '{}' did not exit after end of input", self.name);
                    if reported {
                        return Ok(());
                    }
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        output.flush()?;

        let status = session.finish()?;
        if !status.success() && !reported {
            return Err(EngineError::Exited {
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Point in time a wait gives up, with the full wait it stands for.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget_ms: u64,
}

impl Deadline {
    fn after_ms(budget_ms: u64) -> Self {
        Deadline {
            at: Instant::now() + Duration::from_millis(budget_ms),
            budget_ms,
        }
    }
}

/// A running engine process with a background reader on its stdout.
struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<io::Result<String>>,
    reader: Option<JoinHandle<()>>,
    last: Option<String>,
}

impl Session {
    fn spawn(config: &ProcessConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: config.program.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "engine stdout unavailable"))
        })?;

        let (tx, rx) = mpsc::channel();
        let reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });

        Ok(Session {
            child,
            stdin,
            lines: rx,
            reader: Some(reader),
            last: None,
        })
    }

    fn send(&mut self, line: &str) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            EngineError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "engine input closed"))
        })?;
        debug!("> {line}");
        writeln!(stdin, "{line}")?;
        stdin.flush()?;
        Ok(())
    }

    /// Next output line, or `None` once the engine closed its stdout.
    fn read_line(&mut self, deadline: Option<Deadline>) -> Result<Option<String>, EngineError> {
        let received = match deadline {
            Some(deadline) => {
                let remaining = deadline.at.saturating_duration_since(Instant::now());
                match self.lines.recv_timeout(remaining) {
                    Ok(line) => Some(line),
                    Err(RecvTimeoutError::Disconnected) => None,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(EngineError::Timeout {
                            after_ms: deadline.budget_ms,
                        });
                    }
                }
            }
            None => self.lines.recv().ok(),
        };

        match received {
            Some(Ok(line)) => {
                trace!("< {line}");
                self.last = Some(line.clone());
                Ok(Some(line))
            }
            Some(Err(e)) => Err(EngineError::Io(e)),
            None => Ok(None),
        }
    }

    fn saw_last(&self, token: &str) -> bool {
        self.last.as_deref().map(str::trim) == Some(token)
    }

    fn wait_for(&mut self, token: &'static str, deadline: Deadline) -> Result<(), EngineError> {
        while let Some(line) = self.read_line(Some(deadline))? {
            if line.trim() == token {
                return Ok(());
            }
        }
        Err(EngineError::Handshake { expected: token })
    }

    fn close_input(&mut self) {
        self.stdin = None;
    }

    fn finish(mut self) -> Result<ExitStatus, EngineError> {
        self.close_input();
        let status = self.child.wait()?;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        Ok(status)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stdin = None;
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builders() {
        let config = ProcessConfig::new("/usr/bin/stockfish")
            .with_args(["--quiet"])
            .with_handshake_timeout_ms(100)
            .with_search_grace_ms(50);
        assert_eq!(config.program, PathBuf::from("/usr/bin/stockfish"));
        assert_eq!(config.args, vec!["--quiet".to_string()]);
        assert_eq!(config.handshake_timeout_ms, 100);
        assert_eq!(config.search_grace_ms, 50);
    }

    #[test]
    fn run_without_init_is_rejected() {
        let mut engine = ProcessEngine::new(ProcessConfig::new("unused"));
        let mut input = io::Cursor::new("go movetime 1\n");
        let mut output = Vec::new();
        assert!(matches!(
            engine.run(&mut input, &mut output),
            Err(EngineError::NotInitialized)
        ));
    }

    #[test]
    fn missing_executable_fails_to_spawn() {
        let mut engine = ProcessEngine::new(ProcessConfig::new("/nonexistent/uci-engine"));
        let err = engine.init(&EngineOptions::new()).unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }), "{err}");
        assert_eq!(engine.name(), "/nonexistent/uci-engine");
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Worker threads every query runs the engine search with.
pub const DEFAULT_THREADS: usize = 1;

/// Engine-wide settings applied during initialization.
///
/// These are delivered to the engine as `setoption` lines before any search
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineOptions {
    pub threads: usize,
    pub hash_mb: Option<usize>,
    /// Additional `(name, value)` pairs, sent in insertion order.
    pub extra: Vec<(String, String)>,
}

impl EngineOptions {
    #[must_use]
    pub fn new() -> Self {
        EngineOptions {
            threads: DEFAULT_THREADS,
            hash_mb: None,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hash_mb(mut self, mb: usize) -> Self {
        self.hash_mb = Some(mb.max(1));
        self
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// The `setoption` lines describing these options, `Threads` first.
    #[must_use]
    pub fn setoption_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("setoption name Threads value {}", self.threads)];
        if let Some(mb) = self.hash_mb {
            lines.push(format!("setoption name Hash value {mb}"));
        }
        for (name, value) in &self.extra {
            lines.push(format!("setoption name {name} value {value}"));
        }
        lines
    }

    /// Apply a parsed `setoption`, as received by an engine.
    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "threads" => {
                if let Some(v) = value.and_then(|v| v.parse::<usize>().ok()) {
                    self.threads = v.max(1);
                }
            }
            "hash" => {
                if let Some(v) = value.and_then(|v| v.parse::<usize>().ok()) {
                    self.hash_mb = Some(v.max(1));
                }
            }
            _ => {
                let name = name.trim();
                let value = value.unwrap_or_default().to_string();
                match self.extra.iter().position(|(n, _)| n.eq_ignore_ascii_case(name)) {
                    Some(i) => self.extra[i].1 = value,
                    None => self.extra.push((name.to_string(), value)),
                }
            }
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}

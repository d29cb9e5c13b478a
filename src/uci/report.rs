//! Recognition of the engine's `bestmove` report in captured output.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First token of the line announcing the end of a search.
pub const BESTMOVE_MARKER: &str = "bestmove";

/// The move an engine settled on, with its optional ponder suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestMove {
    pub mv: String,
    pub ponder: Option<String>,
}

impl BestMove {
    #[must_use]
    pub fn new(mv: impl Into<String>) -> Self {
        BestMove {
            mv: mv.into(),
            ponder: None,
        }
    }

    /// Parse a `bestmove <move> [ponder <move>]` line.
    ///
    /// Tokens after the ponder move are ignored.
    pub fn parse(line: &str) -> Result<Self, ReportError> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(BESTMOVE_MARKER) {
            return Err(ReportError::NotBestMove {
                line: line.to_string(),
            });
        }
        let mv = tokens.next().ok_or_else(|| ReportError::MissingMove {
            line: line.to_string(),
        })?;
        let ponder = match tokens.next() {
            Some("ponder") => tokens.next().map(str::to_string),
            _ => None,
        };
        Ok(BestMove {
            mv: mv.to_string(),
            ponder,
        })
    }

    /// True for the tokens engines use when no legal move exists.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.mv == "(none)" || self.mv == "0000"
    }
}

impl fmt::Display for BestMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BESTMOVE_MARKER} {}", self.mv)?;
        if let Some(ponder) = &self.ponder {
            write!(f, " ponder {ponder}")?;
        }
        Ok(())
    }
}

/// Error type for `bestmove` line parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Line does not start with the `bestmove` token
    NotBestMove { line: String },
    /// `bestmove` token with nothing after it
    MissingMove { line: String },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::NotBestMove { line } => write!(f, "Not a bestmove line: '{line}'"),
            ReportError::MissingMove { line } => {
                write!(f, "bestmove line carries no move: '{line}'")
            }
        }
    }
}

impl std::error::Error for ReportError {}

#[must_use]
pub fn is_bestmove_line(line: &str) -> bool {
    line.split_whitespace().next() == Some(BESTMOVE_MARKER)
}

/// First line of `output` whose first token is `bestmove`.
#[must_use]
pub fn find_bestmove_line(output: &str) -> Option<&str> {
    output.lines().find(|line| is_bestmove_line(line))
}

/// Scan captured output for the search result.
///
/// `None` when no line carries the marker. Only the first marker line is
/// considered, even when it turns out to be malformed.
#[must_use]
pub fn scan_bestmove(output: &str) -> Option<Result<BestMove, ReportError>> {
    find_bestmove_line(output).map(BestMove::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_move_and_ponder() {
        let best = BestMove::parse("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(best.mv, "e2e4");
        assert_eq!(best.ponder.as_deref(), Some("e7e5"));
        assert_eq!(best.to_string(), "bestmove e2e4 ponder e7e5");
    }

    #[test]
    fn ignores_unknown_trailing_tokens() {
        let best = BestMove::parse("bestmove   g1f3\tdraw offer").unwrap();
        assert_eq!(best, BestMove::new("g1f3"));
    }

    #[test]
    fn marker_must_be_a_whole_token() {
        assert!(!is_bestmove_line("bestmoves e2e4"));
        assert!(!is_bestmove_line("info string bestmove e2e4"));
        assert!(is_bestmove_line("  bestmove e2e4"));
        assert_eq!(
            BestMove::parse("info depth 1"),
            Err(ReportError::NotBestMove {
                line: "info depth 1".to_string()
            })
        );
    }

    #[test]
    fn scan_returns_none_without_marker() {
        let output = "info depth 1 score cp 13 pv e2e4\ninfo string done\n";
        assert_eq!(scan_bestmove(output), None);
        assert_eq!(scan_bestmove(""), None);
    }

    #[test]
    fn scan_honors_only_the_first_marker_line() {
        let output = "info depth 3\nbestmove d2d4\nbestmove e2e4 ponder e7e5\n";
        assert_eq!(scan_bestmove(output), Some(Ok(BestMove::new("d2d4"))));
    }

    #[test]
    fn malformed_first_marker_is_not_skipped() {
        let output = "bestmove\nbestmove e2e4\n";
        assert_eq!(
            scan_bestmove(output),
            Some(Err(ReportError::MissingMove {
                line: "bestmove".to_string()
            }))
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        let output = "info depth 1\r\nbestmove a7a8q\r\n";
        assert_eq!(scan_bestmove(output), Some(Ok(BestMove::new("a7a8q"))));
    }

    #[test]
    fn null_moves_are_recognized() {
        assert!(BestMove::new("(none)").is_null());
        assert!(BestMove::new("0000").is_null());
        assert!(!BestMove::new("b1b2").is_null());
    }
}

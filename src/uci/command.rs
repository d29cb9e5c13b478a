/// A single inbound protocol line, split into its whitespace-delimited parts.
///
/// `Position`, `Go` and `SetOption` keep every part including the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(Vec<String>),
    SetOption(Vec<String>),
    Stop,
    Quit,
    Unknown(String),
}

pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned_parts()),
        "go" => UciCommand::Go(owned_parts()),
        "setoption" => UciCommand::SetOption(owned_parts()),
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}

/// Raw value following `movetime` in a `go` command, if present.
#[must_use]
pub fn go_movetime(parts: &[String]) -> Option<&str> {
    parts
        .iter()
        .position(|p| p == "movetime")
        .and_then(|i| parts.get(i + 1))
        .map(String::as_str)
}

/// Key identifying the position named by a `position` command.
///
/// `position startpos` yields `"startpos"`, `position fen <fields>` yields the
/// FEN fields joined by single spaces. Any trailing `moves` list is appended
/// as ` moves <m1> <m2> ...`.
#[must_use]
pub fn position_key(parts: &[String]) -> Option<String> {
    let mut key = match parts.get(1).map(String::as_str) {
        Some("startpos") => "startpos".to_string(),
        Some("fen") => {
            let fields: Vec<&str> = parts[2..]
                .iter()
                .map(String::as_str)
                .take_while(|p| *p != "moves")
                .collect();
            if fields.is_empty() {
                return None;
            }
            fields.join(" ")
        }
        _ => return None,
    };

    if let Some(i) = parts.iter().position(|p| p == "moves") {
        if i + 1 < parts.len() {
            key.push_str(" moves ");
            key.push_str(&parts[i + 1..].join(" "));
        }
    }

    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn blank_lines_are_not_commands() {
        assert_eq!(parse_uci_command("   "), None);
        assert_eq!(parse_uci_command(""), None);
    }

    #[test]
    fn parses_known_keywords() {
        assert_eq!(parse_uci_command("uci"), Some(UciCommand::Uci));
        assert_eq!(parse_uci_command(" isready \n"), Some(UciCommand::IsReady));
        assert_eq!(
            parse_uci_command("go movetime 100"),
            Some(UciCommand::Go(parts("go movetime 100")))
        );
        assert_eq!(
            parse_uci_command("frobnicate now"),
            Some(UciCommand::Unknown("frobnicate now".to_string()))
        );
    }

    #[test]
    fn extracts_movetime() {
        assert_eq!(go_movetime(&parts("go movetime 250")), Some("250"));
        assert_eq!(go_movetime(&parts("go depth 3 movetime -5")), Some("-5"));
        assert_eq!(go_movetime(&parts("go movetime")), None);
        assert_eq!(go_movetime(&parts("go infinite")), None);
    }

    #[test]
    fn position_key_normalizes_fen_spacing() {
        let key = position_key(&parts(
            "position fen  8/8/8/8/8/2K5/1Q6/1k6   b - - 14 9",
        ));
        assert_eq!(key.as_deref(), Some("8/8/8/8/8/2K5/1Q6/1k6 b - - 14 9"));
    }

    #[test]
    fn position_key_handles_startpos_and_moves() {
        assert_eq!(
            position_key(&parts("position startpos moves e2e4 e7e5")).as_deref(),
            Some("startpos moves e2e4 e7e5")
        );
        assert_eq!(position_key(&parts("position fen")), None);
        assert_eq!(position_key(&parts("position")), None);
    }
}

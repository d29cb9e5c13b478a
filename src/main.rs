use std::env;
use std::process::ExitCode;

use uci_bridge::{ProcessConfig, ProcessEngine, QueryAdapter, SENTINEL};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: uci_bridge <engine-path> <movetime-ms> <fen...>");
        return ExitCode::from(2);
    }

    let movetime = match args[2].parse::<i64>() {
        Ok(ms) => ms,
        Err(e) => {
            eprintln!("Error: invalid movetime '{}': {e}", args[2]);
            return ExitCode::from(2);
        }
    };
    let fen = args[3..].join(" ");

    let adapter = QueryAdapter::new(ProcessEngine::new(ProcessConfig::new(&args[1])));
    match adapter.query(&fen, movetime) {
        Ok(best) => {
            println!("{}", best.mv);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            println!("{SENTINEL}");
            ExitCode::FAILURE
        }
    }
}

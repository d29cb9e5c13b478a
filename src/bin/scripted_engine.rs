use std::env;
use std::io;
use std::process;
use std::thread;
use std::time::Duration;

use uci_bridge::{Engine, EngineOptions, FailMode, ScriptedEngine};

fn main() {
    let mut engine = ScriptedEngine::new();
    let mut linger = false;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        engine = match arg.as_str() {
            "--bestmove" => match args.next() {
                Some(body) => engine.with_fallback(body),
                None => usage(),
            },
            "--chatter" => engine.with_chatter(),
            "--echo" => engine.with_echo(),
            "--linger" => {
                linger = true;
                engine
            }
            "--silent" => engine.silent(),
            "--fail" => engine.failing(FailMode::Error),
            _ => usage(),
        };
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = engine
        .init(&EngineOptions::new())
        .and_then(|()| engine.run(&mut stdin.lock(), &mut stdout.lock()));
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(3);
    }
    // Keep running after end of input, like an engine that ignores it.
    if linger {
        thread::sleep(Duration::from_secs(60));
    }
}

fn usage() -> ! {
    eprintln!("usage: scripted_engine [--bestmove <move> [ponder <move>]] [--chatter] [--echo] [--silent] [--fail] [--linger]");
    process::exit(2);
}

//! Serialization of configuration and results (requires the `serde` feature).

#![cfg(feature = "serde")]

use uci_bridge::{BestMove, EngineOptions, ProcessConfig};

#[test]
fn engine_options_round_trip_through_json() {
    let options = EngineOptions::new()
        .with_hash_mb(32)
        .with_option("Move Overhead", "20");
    let json = serde_json::to_string(&options).unwrap();
    let back: EngineOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn process_config_reads_from_json() {
    let json = r#"{
        "program": "/usr/local/bin/stockfish",
        "args": [],
        "handshake_timeout_ms": 1000,
        "search_grace_ms": 250
    }"#;
    let config: ProcessConfig = serde_json::from_str(json).unwrap();
    assert_eq!(
        config,
        ProcessConfig::new("/usr/local/bin/stockfish")
            .with_handshake_timeout_ms(1000)
            .with_search_grace_ms(250)
    );
}

#[test]
fn best_move_serializes_fields() {
    let best = BestMove {
        mv: "e2e4".to_string(),
        ponder: Some("e7e5".to_string()),
    };
    let value = serde_json::to_value(&best).unwrap();
    assert_eq!(value["mv"], "e2e4");
    assert_eq!(value["ponder"], "e7e5");
}

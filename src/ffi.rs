//! C ABI entry points for foreign (managed-runtime) callers.
//!
//! One process-wide adapter serves every call. Strings returned to the caller
//! are owned by Rust and must be released with [`uci_bridge_free_string`].

use std::ffi::{c_char, CStr, CString};
use std::panic;

use log::warn;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::adapter::{panic_message, QueryAdapter, SENTINEL};
use crate::engine::{Engine, ProcessConfig, ProcessEngine};

type SharedAdapter = QueryAdapter<Box<dyn Engine>>;

static BRIDGE: Lazy<RwLock<Option<SharedAdapter>>> = Lazy::new(|| RwLock::new(None));

/// Route all subsequent queries to `engine`, replacing any previous one.
pub fn install_engine<E: Engine + 'static>(engine: E) {
    let adapter = QueryAdapter::new(Box::new(engine) as Box<dyn Engine>);
    *BRIDGE.write() = Some(adapter);
}

/// Route all subsequent queries to an external engine executable.
pub fn configure_process(config: ProcessConfig) {
    install_engine(ProcessEngine::new(config));
}

/// Drop the installed engine; later queries answer the sentinel.
pub fn reset() {
    *BRIDGE.write() = None;
}

/// Best move for `position` from the installed engine, or the sentinel.
///
/// Never panics: faults inside the engine, including panics, collapse to
/// [`SENTINEL`].
pub fn get_best_move(position: &str, search_time_millis: i32) -> String {
    let outcome = panic::catch_unwind(|| {
        let bridge = BRIDGE.read();
        match bridge.as_ref() {
            Some(adapter) => adapter.query_best_move(position, i64::from(search_time_millis)),
            None => {
                warn!("no engine configured");
                SENTINEL.to_string()
            }
        }
    });
    outcome.unwrap_or_else(|payload| {
        warn!("best move query panicked: {}", panic_message(payload.as_ref()));
        SENTINEL.to_string()
    })
}

/// Configure the bridge to run the engine executable at `program`.
///
/// Returns 0 on success and -1 when `program` is null or not UTF-8.
///
/// # Safety
///
/// `program` must be null or point to a NUL-terminated string valid for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn uci_bridge_configure(program: *const c_char) -> i32 {
    if program.is_null() {
        return -1;
    }
    match CStr::from_ptr(program).to_str() {
        Ok(path) => {
            configure_process(ProcessConfig::new(path));
            0
        }
        Err(_) => -1,
    }
}

/// Best move for the FEN `position`, searched for `search_time_millis`.
///
/// Always returns a non-null string: a move token, or `"error"`.
///
/// # Safety
///
/// `position` must be null or point to a NUL-terminated string valid for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn uci_bridge_get_best_move(
    position: *const c_char,
    search_time_millis: i32,
) -> *mut c_char {
    let token = if position.is_null() {
        warn!("null position");
        SENTINEL.to_string()
    } else {
        match CStr::from_ptr(position).to_str() {
            Ok(position) => get_best_move(position, search_time_millis),
            Err(e) => {
                warn!("position is not UTF-8: {e}");
                SENTINEL.to_string()
            }
        }
    };

    CString::new(token)
        .unwrap_or_else(|_| c"error".to_owned())
        .into_raw()
}

/// Release a string returned by [`uci_bridge_get_best_move`].
///
/// # Safety
///
/// `s` must be null or a pointer obtained from this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn uci_bridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

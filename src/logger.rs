//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted output with colored module prefixes
//! - `debug!` macro for decisions only worth seeing with `--verbose`
//!
//! Native targets write to stdout. On `wasm32` the same lines go to the
//! browser console, uncolored.
//!
//! # Example
//!
//! ```ignore
//! log!("nav"; "fetch failed, navigating to {}", url);
//! debug!("cache"; "evicted {}", key);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when verbose mode is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[cfg(not(target_arch = "wasm32"))]
pub fn log(module: &str, message: &str) {
    use crossterm::{
        execute,
        terminal::{Clear, ClearType},
    };
    use std::io::{Write, stdout};

    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Log a message to the browser console
#[cfg(target_arch = "wasm32")]
pub fn log(module: &str, message: &str) {
    let line = format!("[{module}] {message}");
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&line));
}

/// Apply color to a module prefix based on module type
#[cfg(not(target_arch = "wasm32"))]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    use owo_colors::OwoColorize;

    let prefix = format!("[{module}]");
    match module_lower {
        "nav" => prefix.bright_blue().bold().to_string(),
        "cache" => prefix.bright_green().bold().to_string(),
        "head" => prefix.bright_magenta().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated by the global verbose flag
//! - `StepCounter` for a one-line `published(3) skipped(5)` summary
//!
//! # Example
//!
//! ```ignore
//! log!("publish"; "{} -> {}", bundle, url);
//! debug!("resolve"; "order: {:?}", order);
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

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

/// Log a debug message (only shown when --verbose is enabled)
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
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "publish" => prefix.bright_blue().bold().to_string(),
        "register" => prefix.bright_green().bold().to_string(),
        "fragment" => prefix.bright_magenta().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Step Counter (single-line summary)
// ============================================================================

/// Named counters printed as a single summary line.
///
/// Displays: `[publish] published(3) skipped(5) linked(1)`
///
/// Counters are atomic so parallel publish workers can share one instance.
pub struct StepCounter {
    module: &'static str,
    counters: Vec<(&'static str, AtomicUsize)>,
}

impl StepCounter {
    pub fn new(module: &'static str, names: &[&'static str]) -> Self {
        Self {
            module,
            counters: names.iter().map(|n| (*n, AtomicUsize::new(0))).collect(),
        }
    }

    /// Increment the counter with the given name. Unknown names are ignored.
    #[inline]
    pub fn inc(&self, name: &str) {
        if let Some((_, counter)) = self.counters.iter().find(|(n, _)| *n == name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(0, |(_, c)| c.load(Ordering::Relaxed))
    }

    /// Render the summary without printing it.
    pub fn line(&self) -> String {
        self.counters
            .iter()
            .map(|(name, c)| format!("{}({})", name, c.load(Ordering::Relaxed)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Print the summary line.
    pub fn finish(self) {
        log(self.module, &self.line());
    }
}

// ============================================================================
// Tests
// ============================================================================

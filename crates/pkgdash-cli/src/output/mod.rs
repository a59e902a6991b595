//! Terminal output helpers.
//!
//! Color and glyph support are decided once by [`init`] and read back through
//! [`colors_enabled`] and [`unicode_enabled`]. Diagnostics go to stderr so
//! that stdout carries only command output.

pub mod colors;
pub mod spinner;
pub mod style;
pub mod table;

pub use spinner::Spinner;
pub use style::{Icon, OutputMode, Theme};

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static COLORS: AtomicBool = AtomicBool::new(false);
static UNICODE: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Detect terminal capabilities. `force_ansi` overrides color detection.
pub fn init(force_ansi: Option<bool>, quiet: bool) {
    let term = console::Term::stderr();
    let colors = force_ansi.unwrap_or_else(|| term.features().colors_supported());
    console::set_colors_enabled(colors);
    console::set_colors_enabled_stderr(colors);

    COLORS.store(colors, Ordering::Relaxed);
    UNICODE.store(term.features().wants_emoji(), Ordering::Relaxed);
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

pub fn unicode_enabled() -> bool {
    UNICODE.load(Ordering::Relaxed)
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print an error. Always shown, even in quiet mode.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", Icon::Error.red().bold(), message.red());
    } else {
        eprintln!("{} {}", Icon::Error, message);
    }
}

pub fn warning(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", Icon::Warning.yellow().bold(), message.yellow());
    } else {
        eprintln!("{} {}", Icon::Warning, message);
    }
}

pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", Icon::Success.green().bold(), message);
    } else {
        eprintln!("{} {}", Icon::Success, message);
    }
}

/// Print a section heading to stdout.
pub fn header(text: &str) {
    if colors_enabled() {
        println!("\n{}", text.cyan().bold());
    } else {
        println!("\n{text}");
    }
}

/// Render a duration the way humans read it: `850ms`, `2.31s`, `1m 05s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Thousands separators for large counts.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

//! Terminal spinner driven by the loading coordinator.
//!
//! One spinner is shared by every request a command makes. It also receives
//! error messages so they can be printed without tearing the spinner line.

use crate::output::{Icon, Theme, format_duration};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use pkgdash_client::{LoadingIndicator, MessageSink};
use std::time::{Duration, Instant};
use tracing::debug;

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒", " "];
const ASCII_FRAMES: &[&str] = &["|", "/", "-", "\\", " "];
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

struct Active {
    bar: ProgressBar,
    started: Instant,
}

/// Spinner on stderr; hidden when progress output is off.
pub struct Spinner {
    message: String,
    visible: bool,
    active: Mutex<Option<Active>>,
}

impl std::fmt::Debug for Spinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spinner")
            .field("message", &self.message)
            .field("visible", &self.visible)
            .field("spinning", &self.is_spinning())
            .finish()
    }
}

impl Spinner {
    pub fn new(message: impl Into<String>, visible: bool) -> Self {
        Self {
            message: message.into(),
            visible,
            active: Mutex::new(None),
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.active.lock().is_some()
    }

    fn spinner_style() -> ProgressStyle {
        let frames = if crate::output::unicode_enabled() {
            SPINNER_FRAMES
        } else {
            ASCII_FRAMES
        };
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(frames)
    }

    fn stop(&self, ok: bool) {
        let Some(Active { bar, started }) = self.active.lock().take() else {
            return;
        };
        let elapsed = format_duration(started.elapsed());
        debug!(ok, elapsed = %elapsed, "spinner stopped");

        let theme = Theme::from_env();
        let line = if ok {
            format!(
                "{} {}",
                theme.success(theme.icon(Icon::Success)),
                theme.dim(&format!("loaded in {elapsed}"))
            )
        } else {
            format!(
                "{} {}",
                theme.error(theme.icon(Icon::Error)),
                theme.error(&format!("failed after {elapsed}"))
            )
        };
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }
        bar.finish_with_message(line);
    }
}

impl LoadingIndicator for Spinner {
    fn start(&self) {
        let bar = if self.visible {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::spinner_style());
            bar.enable_steady_tick(SPINNER_INTERVAL);
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(self.message.clone());
        *self.active.lock() = Some(Active {
            bar,
            started: Instant::now(),
        });
    }

    fn finish(&self) {
        self.stop(true);
    }

    fn error(&self) {
        self.stop(false);
    }
}

impl MessageSink for Spinner {
    fn error(&self, message: &str) {
        let active = self.active.lock();
        match active.as_ref() {
            Some(Active { bar, .. }) => bar.suspend(|| crate::output::error(message)),
            None => crate::output::error(message),
        }
    }
}

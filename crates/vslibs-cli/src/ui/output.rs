//! Terminal implementation of the core `Reporter`.
//!
//! Progress lines are redrawn in place when stdout is a terminal and
//! skipped otherwise, so redirected output stays readable.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::QueueableCommand;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use vslibs_core::Reporter;

use super::theme::{Glyph, Theme, format_download_progress, human_size};

#[derive(Debug, Default)]
struct State {
    /// A progress line is drawn without a trailing newline
    progress_active: bool,
}

/// A cloneable handle for styled terminal output.
#[derive(Debug, Clone)]
pub struct Output {
    theme: Arc<Theme>,
    is_tty: bool,
    state: Arc<Mutex<State>>,
}

impl Output {
    /// Create an output handle for stdout.
    pub fn new() -> Self {
        Self::with_tty(io::stdout().is_terminal())
    }

    /// Create an output handle with explicit terminal detection.
    pub fn with_tty(is_tty: bool) -> Self {
        Self {
            theme: Arc::new(Theme::default()),
            is_tty,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Terminate a pending progress line so the next print starts clean.
    fn end_progress(&self, state: &mut State) {
        if state.progress_active {
            let mut stdout = io::stdout();
            let _ = stdout.queue(Clear(ClearType::CurrentLine));
            let _ = write!(stdout, "\r");
            let _ = stdout.flush();
            state.progress_active = false;
        }
    }

    fn progress(&self, name: &str, status: &str) {
        if !self.is_tty {
            return;
        }
        let mut state = self.lock();
        let colors = &self.theme.colors;
        let mut stdout = io::stdout();
        let _ = write!(stdout, "\r");
        let _ = stdout.queue(Clear(ClearType::CurrentLine));
        let _ = write!(
            stdout,
            "  {} {} {}",
            self.theme.badge(Glyph::Active),
            format!("{name:<32}").with(colors.name),
            status.with(colors.secondary)
        );
        let _ = stdout.flush();
        state.progress_active = true;
    }

    fn line(&self, icon: &str, msg: &str) {
        let mut state = self.lock();
        self.end_progress(&mut state);
        println!("  {icon} {msg}");
    }

    /// Prints a summary of the run including the total elapsed time.
    pub fn summary(&self, msg: &str, elapsed_secs: f64) {
        let colors = &self.theme.colors;
        self.line(
            &self.theme.badge(Glyph::Success),
            &format!("{} {}", msg.bold(), format!("in {elapsed_secs:.1}s").with(colors.secondary)),
        );
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        let mut state = self.lock();
        self.end_progress(&mut state);
        println!();
        println!(
            "{} {}",
            title.bold(),
            "─".repeat(40).with(self.theme.colors.header)
        );
    }

    fn downloading(&self, name: &str, current: u64, total: Option<u64>) {
        self.progress(name, &format_download_progress(current, total));
    }

    fn extracting(&self, name: &str, _current: u64, _total: Option<u64>) {
        self.progress(name, "extracting");
    }

    fn done(&self, name: &str, detail: &str, size: Option<u64>) {
        let colors = &self.theme.colors;
        let size = size.map(human_size).unwrap_or_default();
        self.line(
            &self.theme.badge(Glyph::Success),
            &format!(
                "{} {detail:<16} {}",
                format!("{name:<32}").with(colors.name),
                size.with(colors.secondary)
            ),
        );
    }

    fn failed(&self, name: &str, reason: &str) {
        let colors = &self.theme.colors;
        self.line(
            &self.theme.badge(Glyph::Failure),
            &format!(
                "{} {}",
                format!("{name:<32}").with(colors.name),
                reason.with(colors.error)
            ),
        );
    }

    fn info(&self, msg: &str) {
        self.line(&self.theme.badge(Glyph::Info), msg);
    }

    fn success(&self, msg: &str) {
        self.line(&self.theme.badge(Glyph::Success), msg);
    }

    fn warning(&self, msg: &str) {
        let color = self.theme.colors.warning;
        self.line(
            &self.theme.badge(Glyph::Warning),
            &msg.with(color).to_string(),
        );
    }
}

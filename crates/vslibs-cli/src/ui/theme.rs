//! UI Theme - colors, status glyphs and formatting helpers

use crossterm::style::{Color, Stylize};

/// Visual constants for terminal output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
}

impl Theme {
    /// The glyph's symbol in its status color; `Info` stays unstyled.
    pub fn badge(&self, glyph: Glyph) -> String {
        let color = match glyph {
            Glyph::Active => self.colors.active,
            Glyph::Success => self.colors.success,
            Glyph::Failure => self.colors.error,
            Glyph::Warning => self.colors.warning,
            Glyph::Info => return glyph.symbol().to_string(),
        };
        glyph.symbol().with(color).to_string()
    }
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Artifact names (primary content)
    pub name: Color,
    /// Sizes and secondary info
    pub secondary: Color,
    /// Section headers
    pub header: Color,
    /// Success states
    pub success: Color,
    /// Warning states
    pub warning: Color,
    /// Error states
    pub error: Color,
    /// Active/in-progress items
    pub active: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            name: Color::Cyan,
            secondary: Color::DarkGrey,
            header: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            active: Color::Blue,
        }
    }
}

/// Leading marker of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A step still running
    Active,
    /// Artifact produced or run finished
    Success,
    /// Artifact step failed
    Failure,
    /// Something the user should look at
    Warning,
    /// Plain information
    Info,
}

impl Glyph {
    /// Single-character symbol drawn for this status.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Active => "●",
            Self::Success => "✓",
            Self::Failure => "✗",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

/// Width of the download progress bar in characters
pub const PROGRESS_WIDTH: usize = 24;

/// Units above bytes, each 1024 times the previous.
const SIZE_UNITS: [&str; 3] = ["KB", "MB", "GB"];

/// Byte count with one decimal in the largest unit that keeps it above 1.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = SIZE_UNITS[0];
    for &next in &SIZE_UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// Render a progress bar using ▓ (filled) and ░ (empty).
pub fn format_progress_bar(current: u64, total: u64, width: usize) -> String {
    let filled = if total > 0 {
        (((current as f64 / total as f64) * width as f64).round() as usize).min(width)
    } else {
        0
    };
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

/// Progress text for a download; unknown totals show only the byte count.
pub fn format_download_progress(current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let pct = (current.saturating_mul(100) / total).min(100);
            let bar = format_progress_bar(current, total, PROGRESS_WIDTH);
            format!("{bar}  {pct:>3}%  {}", human_size(total))
        }
        _ => human_size(current),
    }
}

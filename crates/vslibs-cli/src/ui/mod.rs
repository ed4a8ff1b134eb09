//! Terminal output
//!
//! - [`theme`] - Colors, status glyphs and size/progress formatting
//! - [`output`] - `Reporter` implementation used by the commands

pub mod output;
pub mod theme;

pub use output::Output;
pub use theme::Theme;

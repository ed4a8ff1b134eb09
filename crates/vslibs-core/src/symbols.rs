//! Symbol-table parsing and module-definition (`.def`) rendering.
//!
//! `llvm-nm` prints one symbol per line. Only lines consisting of a hex
//! address followed by a plain ASCII identifier are exported; everything
//! else (section markers, decorated names, undefined symbols) is dropped.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

static EXPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]+\s+([a-zA-Z_][a-zA-Z0-9_]*)$").expect("export line pattern is valid")
});

/// Collect exported identifiers from `nm` output, in order of appearance.
///
/// Duplicates are kept.
pub fn parse_nm_output(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| EXPORT_LINE.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// A module-definition file: a `LIBRARY` line followed by `EXPORTS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    /// Name written on the `LIBRARY` line
    pub library: String,
    /// Exported symbol names
    pub exports: Vec<String>,
}

impl ModuleDefinition {
    /// Build a definition from raw `nm` output.
    pub fn from_nm_output(library: impl Into<String>, text: &str) -> Self {
        Self {
            library: library.into(),
            exports: parse_nm_output(text),
        }
    }

    /// Render the `.def` text understood by `dlltool -d`.
    pub fn render(&self) -> String {
        let mut out = format!("LIBRARY {}\nEXPORTS\n", self.library);
        for symbol in &self.exports {
            let _ = writeln!(out, "{symbol}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NM_SAMPLE: &str = "\
VapourSynth.dll:
00000000 getVapourSynthAPI
00000000 T __imp_getVapourSynthAPI
00000000 vsscript_init

         U _missing
0000abcd getVapourSynthAPI
0000FFFF vs_func2\r
zzzz notHex
00000000 café
";

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let exports = parse_nm_output(NM_SAMPLE);
        assert_eq!(
            exports,
            vec![
                "getVapourSynthAPI",
                "vsscript_init",
                "getVapourSynthAPI",
                "vs_func2",
            ]
        );
    }

    #[test]
    fn test_parse_is_anchored_and_ascii_only() {
        assert!(parse_nm_output("  00000000 leading_space").is_empty());
        assert!(parse_nm_output("00000000 trailing ").is_empty());
        assert!(parse_nm_output("00000000 1digitFirst").is_empty());
        assert!(parse_nm_output("00000000 naïve").is_empty());
        assert_eq!(parse_nm_output("1\t_tabbed"), vec!["_tabbed"]);
    }

    #[test]
    fn test_render_definition() {
        let def = ModuleDefinition::from_nm_output("VapourSynth", NM_SAMPLE);
        assert_eq!(
            def.render(),
            "LIBRARY VapourSynth\nEXPORTS\ngetVapourSynthAPI\nvsscript_init\ngetVapourSynthAPI\nvs_func2\n"
        );
    }

    #[test]
    fn test_render_without_exports() {
        let def = ModuleDefinition::from_nm_output("Empty", "");
        assert_eq!(def.render(), "LIBRARY Empty\nEXPORTS\n");
    }
}

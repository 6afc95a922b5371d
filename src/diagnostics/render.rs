//! Canonical text rendering of a diagnostic list

use std::collections::HashMap;
use std::fmt::Write;

use super::{Diagnostic, Diagnostics};

const SEPARATOR: &str = "----------";

/// Source texts by nominal file name, used to print the offending line
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: HashMap<String, String>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(file: impl Into<String>, text: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(file, text);
        map
    }

    pub fn insert(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.files.insert(file.into(), text.into());
    }

    pub fn get(&self, file: &str) -> Option<&str> {
        self.files.get(file).map(String::as_str)
    }
}

/// Render every diagnostic, numbered from 1, in list order
pub fn render(diagnostics: &Diagnostics, sources: &SourceMap) -> String {
    let mut out = String::new();
    if diagnostics.is_empty() {
        return out;
    }
    out.push_str(SEPARATOR);
    out.push('\n');
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        out.push_str(&render_one(index + 1, diagnostic, sources.get(&diagnostic.file)));
    }
    out
}

/// Render a single numbered entry including its trailing separator
pub fn render_one(number: usize, diagnostic: &Diagnostic, source: Option<&str>) -> String {
    let mut out = String::new();
    let line = diagnostic.span.start.line;
    let _ = writeln!(out, "{}. {} in {} (at line {})", number, diagnostic.severity, diagnostic.file, line);
    if let Some(text) = source.and_then(|s| s.lines().nth(line.saturating_sub(1))) {
        let (shown, carets) = caret_line(text, diagnostic);
        let _ = writeln!(out, "\t{}", shown);
        let _ = writeln!(out, "\t{}", carets);
    }
    let _ = writeln!(out, "{}", diagnostic.message);
    let _ = writeln!(out, "{}", SEPARATOR);
    out
}

/// Trimmed source line plus the caret marker under the diagnostic's columns
fn caret_line(text: &str, diagnostic: &Diagnostic) -> (String, String) {
    let chars: Vec<char> = text.trim_end_matches(['\r', '\n']).chars().collect();
    let leading = chars.iter().take_while(|c| **c == ' ' || **c == '\t').count();
    let mut trailing_end = chars.len();
    while trailing_end > leading && chars[trailing_end - 1].is_whitespace() {
        trailing_end -= 1;
    }
    let shown: String = chars[leading..trailing_end].iter().collect();

    let span = diagnostic.span;
    let start_col = span.start.column.saturating_sub(1);
    let end_col = if span.end.line == span.start.line && span.end.column > span.start.column {
        span.end.column.saturating_sub(1)
    } else if span.end.line > span.start.line {
        trailing_end
    } else {
        start_col + 1
    };
    let start = start_col.max(leading).saturating_sub(leading);
    let end = end_col.min(trailing_end.max(start_col + 1)).saturating_sub(leading).max(start + 1);

    // keep tabs so the markers line up under tab-indented code
    let mut carets: String = shown.chars().take(start).map(|c| if c == '\t' { '\t' } else { ' ' }).collect();
    let pad = start.saturating_sub(carets.chars().count());
    carets.extend(std::iter::repeat(' ').take(pad));
    carets.extend(std::iter::repeat('^').take(end - start));
    (shown, carets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diagnostics::{Category, DiagnosticLog};
    use crate::parser::{Location, Span};

    fn span(line: usize, c1: usize, c2: usize) -> Span {
        Span::new(Location::new(line, c1, 0), Location::new(line, c2, 0))
    }

    #[test]
    fn renders_entry_with_trimmed_line_and_carets() {
        let source = "public enum X {\n  BLEU, BLANC;\n  static { BLEU = null; }\n}\n";
        let mut log = DiagnosticLog::new("X.java");
        log.record(crate::diagnostics::Diagnostic::new(
            Category::FinalFieldAssignment,
            "The final field X.BLEU cannot be assigned",
            span(3, 12, 16),
        ));
        let list = log.finish(&Config::default());
        let text = render(&list, &SourceMap::single("X.java", source));
        assert_eq!(
            text,
            "----------\n\
             1. ERROR in X.java (at line 3)\n\
             \tstatic { BLEU = null; }\n\
             \t         ^^^^\n\
             The final field X.BLEU cannot be assigned\n\
             ----------\n"
        );
    }

    #[test]
    fn zero_width_span_gets_one_caret() {
        let mut log = DiagnosticLog::new("A.java");
        log.record(crate::diagnostics::Diagnostic::new(Category::SyntaxError, "m", span(1, 3, 3)));
        let list = log.finish(&Config::default());
        let text = render(&list, &SourceMap::single("A.java", "a b c"));
        assert!(text.contains("\ta b c\n\t  ^\n"));
    }

    #[test]
    fn empty_list_renders_nothing() {
        let list = DiagnosticLog::new("A.java").finish(&Config::default());
        assert_eq!(render(&list, &SourceMap::new()), "");
    }
}

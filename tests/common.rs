// Common test utilities
#![allow(dead_code)]

use jfront::diagnostics::{Category, Diagnostic};
use jfront::{compile_unit, CompileOutput, Config, LanguageLevel, SourceFile};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run the whole pipeline over one unit named `X.java`
pub fn compile_with(source: &str, config: &Config) -> CompileOutput {
    init_logging();
    compile_unit(&SourceFile::new("X.java", source), config)
}

pub fn compile(source: &str) -> CompileOutput {
    compile_with(source, &Config::default())
}

pub fn compile_at(source: &str, level: LanguageLevel) -> CompileOutput {
    compile_with(source, &Config::new(level))
}

pub fn messages(output: &CompileOutput) -> Vec<String> {
    output.diagnostics.iter().map(|d| d.message.clone()).collect()
}

pub fn errors(output: &CompileOutput) -> Vec<&Diagnostic> {
    output.diagnostics.errors().collect()
}

pub fn categories(output: &CompileOutput) -> Vec<Category> {
    output.diagnostics.iter().map(|d| d.category).collect()
}

pub fn rendered(source: &str) -> String {
    let output = compile(source);
    output.render(&SourceFile::new("X.java", source))
}

/// 1-based (line, column) of the first occurrence of `needle` after `skip` earlier ones
pub fn position_of(source: &str, needle: &str, skip: usize) -> (usize, usize) {
    let offset = source.match_indices(needle).nth(skip).map(|(i, _)| i).expect("needle present");
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
    (line, column)
}

pub fn at(d: &Diagnostic) -> (usize, usize) {
    (d.span.start.line, d.span.start.column)
}

pub fn assert_clean(output: &CompileOutput) {
    assert!(output.diagnostics.is_empty(), "unexpected diagnostics: {:#?}", output.diagnostics);
}
